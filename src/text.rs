//! Text primitives shared by every analytics component.
//!
//! Tokenization lowercases terms for matching. Keyword extraction keeps the
//! surface form of each candidate; callers compare case-insensitively at the
//! point of use. Text is never renormalized here, so every candidate is a
//! literal substring of its input. Imported content is NFC-normalized once,
//! on the way into the store.

use std::collections::HashSet;

use regex::Regex;
use stop_words::{get, LANGUAGE};

use crate::error::Result;

/// Candidates must be longer than this many characters.
const MIN_KEYWORD_CHARS: usize = 3;

/// Common verbs, adjectives and adverbs that slip past the stop-word list
/// and would otherwise be picked up as nouns.
const NON_NOUN_WORDS: &[&str] = &[
    "think", "thinking", "know", "want", "need", "like", "make", "made", "take", "took", "give",
    "gave", "tell", "told", "feel", "felt", "seem", "seems", "help", "helps", "keep", "kept",
    "start", "started", "stop", "great", "good", "better", "best", "fine", "nice", "sure",
    "really", "very", "much", "many", "more", "most", "also", "just", "maybe", "perhaps",
    "could", "would", "should", "might", "will", "shall", "must", "can't", "don't", "won't",
    "doesn't", "isn't", "aren't", "wasn't", "actually", "basically", "try", "trying", "tried",
    "use", "using", "used", "work", "works", "working", "going", "doing", "getting", "being",
    "having", "let's", "here's", "there's", "that's", "what's", "it's", "i'm", "you're",
    "we're", "they're", "i've", "you've", "we've", "new", "old", "big", "small", "high", "low",
    "different", "important", "possible", "available", "specific", "certain", "simple", "easy",
    "hard", "difficult", "wonderful", "amazing", "excellent", "fantastic", "perfect", "happy",
    "helpful", "terrible", "awful", "horrible", "poor", "bad", "worst",
];

/// Suffixes that mark adverbs, adjectives and past-tense verbs.
const NON_NOUN_SUFFIXES: &[&str] = &["ly", "ful", "ous", "ible", "able", "ed"];

/// Tokenizer and keyword extractor
pub struct TextProcessor {
    word_regex: Regex,
    stopwords: HashSet<String>,
    non_nouns: HashSet<&'static str>,
}

/// A word match with its byte span in the input text
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl TextProcessor {
    /// Create a new text processor with the English stop-word list
    pub fn new() -> Result<Self> {
        let word_regex = Regex::new(r"[\p{L}\p{N}][\p{L}\p{M}\p{N}]*(?:['’\-][\p{L}\p{M}\p{N}]+)*")?;

        let stopwords: HashSet<String> = get(LANGUAGE::English)
            .iter()
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            word_regex,
            stopwords,
            non_nouns: NON_NOUN_WORDS.iter().copied().collect(),
        })
    }

    /// Split text into lowercase terms. Punctuation is dropped; stop words are kept.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_regex
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Extract up to `limit` distinct keyword candidates.
    ///
    /// Multi-word subject phrases come first, then single noun-like tokens.
    /// Duplicates are removed by exact string equality, candidates of three
    /// characters or fewer are dropped, and the list is truncated in the
    /// order produced. No frequency ranking happens here.
    #[must_use]
    pub fn extract_keywords(&self, text: &str, limit: usize) -> Vec<String> {
        let words: Vec<Word<'_>> = self
            .word_regex
            .find_iter(text)
            .map(|m| Word {
                text: m.as_str(),
                start: m.start(),
                end: m.end(),
            })
            .collect();

        let phrases = self.subject_phrases(text, &words);
        let nouns = words
            .iter()
            .filter(|w| self.is_noun_like(w.text))
            .map(|w| w.text.to_string());

        let mut seen = HashSet::new();
        phrases
            .into_iter()
            .chain(nouns)
            .filter(|candidate| seen.insert(candidate.clone()))
            .filter(|candidate| candidate.chars().count() > MIN_KEYWORD_CHARS)
            .take(limit)
            .collect()
    }

    /// Runs of two or more capitalized words separated only by whitespace,
    /// with stop words trimmed from both ends ("the Golden Gate office" -> "Golden Gate").
    fn subject_phrases(&self, text: &str, words: &[Word<'_>]) -> Vec<String> {
        let mut phrases = Vec::new();
        let mut run: Vec<&Word<'_>> = Vec::new();

        for word in words {
            let adjacent = run
                .last()
                .is_some_and(|prev| text[prev.end..word.start].chars().all(char::is_whitespace));
            if !adjacent {
                self.flush_phrase(&mut run, &mut phrases);
            }
            if is_capitalized(word.text) {
                run.push(word);
            } else {
                self.flush_phrase(&mut run, &mut phrases);
            }
        }
        self.flush_phrase(&mut run, &mut phrases);

        phrases
    }

    fn flush_phrase(&self, run: &mut Vec<&Word<'_>>, phrases: &mut Vec<String>) {
        let is_stop = |w: &&Word<'_>| self.stopwords.contains(&w.text.to_lowercase());
        let first = run.iter().position(|w| !is_stop(w));
        let last = run.iter().rposition(|w| !is_stop(w));

        if let (Some(first), Some(last)) = (first, last) {
            if last > first {
                let phrase = run[first..=last]
                    .iter()
                    .map(|w| w.text)
                    .collect::<Vec<_>>()
                    .join(" ");
                phrases.push(phrase);
            }
        }
        run.clear();
    }

    fn is_noun_like(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        if self.stopwords.contains(&lower) || self.non_nouns.contains(lower.as_str()) {
            return false;
        }
        if !lower.chars().any(char::is_alphabetic) {
            return false;
        }
        !NON_NOUN_SUFFIXES
            .iter()
            .any(|suffix| lower.len() > suffix.len() + 3 && lower.ends_with(suffix))
    }
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> TextProcessor {
        TextProcessor::new().expect("Failed to create text processor")
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        let tokens = processor().tokenize("Hello, World! It's a Budget-Plan.");
        assert_eq!(tokens, vec!["hello", "world", "it's", "a", "budget-plan"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(processor().tokenize("   ...  ").is_empty());
    }

    #[test]
    fn test_phrases_come_before_nouns() {
        let keywords = processor().extract_keywords("We walked across Golden Gate Bridge before the marathon.", 10);
        assert_eq!(keywords.first().map(String::as_str), Some("Golden Gate Bridge"));
        assert!(keywords.contains(&"marathon".to_string()));
    }

    #[test]
    fn test_phrase_trims_stopwords() {
        let keywords = processor().extract_keywords("The Rust Compiler is strict", 10);
        assert!(keywords.contains(&"Rust Compiler".to_string()));
    }

    #[test]
    fn test_short_and_duplicate_candidates_removed() {
        let keywords = processor().extract_keywords("cat garden garden garden", 10);
        assert_eq!(keywords, vec!["garden"]);
    }

    #[test]
    fn test_limit_truncates_in_order() {
        let keywords = processor().extract_keywords("garden kitchen bicycle mountain", 2);
        assert_eq!(keywords, vec!["garden", "kitchen"]);
    }

    #[test]
    fn test_decomposed_text_is_kept_verbatim() {
        let text = "The cafe\u{301}s serve espresso";
        let keywords = processor().extract_keywords(text, 10);
        assert!(keywords.contains(&"cafe\u{301}s".to_string()));
        assert!(keywords.iter().all(|k| text.contains(k.as_str())));
        assert_eq!(processor().tokenize(text)[1], "cafe\u{301}s");
    }

    #[test]
    fn test_adverbs_are_not_nouns() {
        let keywords = processor().extract_keywords("quickly", 10);
        assert!(keywords.is_empty());
    }
}
