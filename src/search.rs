//! Relevance-ranked free-text search over the message corpus.
//!
//! Every message is scored by the first path that matches:
//!
//! 1. **Exact**: the content contains the whole query, case-insensitively.
//!    Relevance is 1.0 and highlights are built around the query.
//! 2. **Keyword overlap**: the fraction of query terms that overlap some
//!    message term, where overlap means either term contains the other.
//!    Highlights are built around the matched terms joined by spaces.
//!
//! Messages matching neither path are left out of the results.

use crate::models::{Message, SearchResult};
use crate::text::TextProcessor;

/// Default number of results returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Characters of context kept on each side of a highlight
pub const DEFAULT_CONTEXT_LENGTH: usize = 100;

/// Highlight extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Characters kept before and after each occurrence
    pub context_length: usize,
    /// Maximum number of excerpts
    pub max_highlights: usize,
    /// Leading characters used when nothing matches
    pub fallback_length: usize,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            context_length: DEFAULT_CONTEXT_LENGTH,
            max_highlights: 3,
            fallback_length: 200,
        }
    }
}

/// Score the corpus against `query` and return up to `limit` results,
/// best first. Ties keep corpus order. A blank query yields no results.
#[must_use]
pub fn search_corpus(
    processor: &TextProcessor,
    query: &str,
    corpus: Vec<Message>,
    limit: usize,
    options: &HighlightOptions,
) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let folded_query = fold(query);
    let query_terms = processor.tokenize(query);
    let mut results = Vec::new();

    for message in corpus {
        if find_from(&fold(&message.content), &folded_query, 0).is_some() {
            let highlights = highlights_with(&message.content, query, options);
            results.push(SearchResult {
                message,
                relevance_score: 1.0,
                highlights,
            });
            continue;
        }

        if query_terms.is_empty() {
            continue;
        }

        let message_terms = processor.tokenize(&message.content);
        let matching: Vec<&str> = query_terms
            .iter()
            .filter(|qt| {
                message_terms
                    .iter()
                    .any(|mt| mt.contains(qt.as_str()) || qt.contains(mt.as_str()))
            })
            .map(String::as_str)
            .collect();

        if matching.is_empty() {
            continue;
        }

        let relevance_score = matching.len() as f64 / query_terms.len() as f64;
        let highlights = highlights_with(&message.content, &matching.join(" "), options);
        results.push(SearchResult {
            message,
            relevance_score,
            highlights,
        });
    }

    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    results.truncate(limit);
    results
}

/// Excerpts around up to three case-insensitive occurrences of `query`.
///
/// Falls back to the first 200 characters followed by `"..."` when the query
/// does not occur. The result is never empty.
#[must_use]
pub fn extract_highlights(text: &str, query: &str, context_length: usize) -> Vec<String> {
    highlights_with(
        text,
        query,
        &HighlightOptions {
            context_length,
            ..HighlightOptions::default()
        },
    )
}

/// [`extract_highlights`] with explicit options
#[must_use]
pub fn highlights_with(text: &str, query: &str, options: &HighlightOptions) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let folded_text = fold(text);
    let folded_query = fold(query);
    let mut highlights = Vec::new();

    let mut next = find_from(&folded_text, &folded_query, 0);
    while let Some(index) = next {
        if highlights.len() >= options.max_highlights {
            break;
        }
        let start = index.saturating_sub(options.context_length);
        let end = index
            .saturating_add(folded_query.len())
            .saturating_add(options.context_length)
            .min(chars.len());

        let mut highlight: String = chars[start..end].iter().collect();
        if start > 0 {
            highlight.insert_str(0, "...");
        }
        if end < chars.len() {
            highlight.push_str("...");
        }
        highlights.push(highlight);

        next = find_from(&folded_text, &folded_query, index + 1);
    }

    if highlights.is_empty() {
        let mut excerpt: String = chars.iter().take(options.fallback_length).collect();
        excerpt.push_str("...");
        highlights.push(excerpt);
    }
    highlights
}

/// Lowercase char by char so indices line up with the original text.
fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

/// First index at or after `from` where `needle` occurs in `haystack`.
/// An empty needle matches at `from` itself.
fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}
