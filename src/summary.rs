//! One-line conversation summaries built from keywords and sentiment.

use crate::models::{Message, SentimentScore};
use crate::sentiment::SentimentScorer;
use crate::text::TextProcessor;
use crate::topics::join_contents;

/// Returned for conversations with no messages.
pub const EMPTY_SUMMARY: &str = "No messages found.";

/// Keywords named in a summary
pub const DEFAULT_SUMMARY_KEYWORDS: usize = 5;

/// Render the summary sentence
#[must_use]
pub fn render_summary(message_count: usize, keywords: &[String], sentiment: &SentimentScore) -> String {
    format!(
        "This conversation contains {message_count} messages discussing {}. Overall sentiment: {}.",
        keywords.join(", "),
        sentiment.label
    )
}

/// Summarize a conversation's messages.
///
/// Returns the summary together with the sentiment computed over the joined
/// content, or [`EMPTY_SUMMARY`] and `None` for an empty conversation.
#[must_use]
pub fn summarize(
    processor: &TextProcessor,
    scorer: &SentimentScorer,
    messages: &[Message],
    keyword_limit: usize,
) -> (String, Option<SentimentScore>) {
    if messages.is_empty() {
        return (EMPTY_SUMMARY.to_string(), None);
    }

    let all_text = join_contents(messages);
    let keywords = processor.extract_keywords(&all_text, keyword_limit);
    let sentiment = scorer.analyze(&all_text);

    (render_summary(messages.len(), &keywords, &sentiment), Some(sentiment))
}
