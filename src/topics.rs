//! Per-conversation topic ranking.

use crate::models::{Message, TopicAnalysis};
use crate::text::TextProcessor;

/// Keywords extracted from the joined conversation text before ranking
pub const DEFAULT_KEYWORD_LIMIT: usize = 20;

/// Topics kept after ranking
pub const DEFAULT_MAX_TOPICS: usize = 10;

/// Rank keyword candidates by how many messages mention them.
///
/// A message mentions a keyword when its content contains the keyword as a
/// case-insensitive substring. Percentages are per-topic coverage and are not
/// normalized across topics. Equal counts keep extraction order.
#[must_use]
pub fn rank_topics(messages: &[Message], keywords: &[String], max_topics: usize) -> Vec<TopicAnalysis> {
    if messages.is_empty() {
        return Vec::new();
    }

    let lowered: Vec<String> = messages.iter().map(|m| m.content.to_lowercase()).collect();
    let total = messages.len() as f64;

    let mut topics: Vec<TopicAnalysis> = keywords
        .iter()
        .map(|keyword| {
            let needle = keyword.to_lowercase();
            let count = lowered.iter().filter(|content| content.contains(&needle)).count();
            TopicAnalysis {
                topic: keyword.clone(),
                count,
                percentage: count as f64 / total * 100.0,
            }
        })
        .collect();

    topics.sort_by(|a, b| b.count.cmp(&a.count));
    topics.truncate(max_topics);
    topics
}

/// Extract keywords from the conversation and rank them
#[must_use]
pub fn analyze_topics(
    processor: &TextProcessor,
    messages: &[Message],
    keyword_limit: usize,
    max_topics: usize,
) -> Vec<TopicAnalysis> {
    if messages.is_empty() {
        return Vec::new();
    }
    let all_text = join_contents(messages);
    let keywords = processor.extract_keywords(&all_text, keyword_limit);
    rank_topics(messages, &keywords, max_topics)
}

/// Message contents joined by single spaces
#[must_use]
pub fn join_contents(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
