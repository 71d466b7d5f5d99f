//! Lexicon-based sentiment scoring.
//!
//! Each whitespace-separated token adds one if it contains any positive
//! lexicon entry and subtracts one if it contains any negative entry. The
//! running total is normalized by a tenth of the token count and clamped.

use serde::{Deserialize, Serialize};

use crate::models::{SentimentLabel, SentimentScore};

/// Scores above this are positive, below its negation negative.
const LABEL_THRESHOLD: f64 = 0.1;

/// Word lists driving the scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentLexicon {
    /// Substrings that mark a token as positive
    pub positive: Vec<String>,
    /// Substrings that mark a token as negative
    pub negative: Vec<String>,
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(ToString::to_string).collect();
        Self {
            positive: words(&[
                "good",
                "great",
                "excellent",
                "amazing",
                "wonderful",
                "fantastic",
                "love",
                "perfect",
                "best",
                "happy",
                "helpful",
            ]),
            negative: words(&[
                "bad",
                "terrible",
                "awful",
                "horrible",
                "worst",
                "hate",
                "poor",
                "disappointing",
                "frustrating",
                "difficult",
            ]),
        }
    }
}

/// Deterministic substring-lexicon scorer
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(&SentimentLexicon::default())
    }
}

impl SentimentScorer {
    /// Build a scorer from a lexicon. Entries are lowercased; empty entries are ignored.
    #[must_use]
    pub fn new(lexicon: &SentimentLexicon) -> Self {
        let prepare = |list: &[String]| {
            list.iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            positive: prepare(&lexicon.positive),
            negative: prepare(&lexicon.negative),
        }
    }

    /// Score `text` into [-1, 1] and bucket it
    #[must_use]
    pub fn analyze(&self, text: &str) -> SentimentScore {
        let lowered = text.to_lowercase();
        let mut token_count = 0usize;
        let mut tally = 0i64;

        for token in lowered.split_whitespace() {
            token_count += 1;
            if self.positive.iter().any(|w| token.contains(w.as_str())) {
                tally += 1;
            }
            if self.negative.iter().any(|w| token.contains(w.as_str())) {
                tally -= 1;
            }
        }

        let divisor = (token_count as f64 / 10.0).max(1.0);
        let score = (tally as f64 / divisor).clamp(-1.0, 1.0);

        SentimentScore {
            score,
            label: label_for(score),
        }
    }
}

/// Map a normalized score onto its label
#[must_use]
pub fn label_for(score: f64) -> SentimentLabel {
    if score > LABEL_THRESHOLD {
        SentimentLabel::Positive
    } else if score < -LABEL_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}
