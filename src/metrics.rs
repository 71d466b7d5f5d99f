use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Conversations run through the full analysis pipeline
pub const CONVERSATIONS_ANALYZED_TOTAL: &str = "ideas_miner_conversations_analyzed_total";
/// Analysis step duration
pub const ANALYSIS_DURATION_SECONDS: &str = "ideas_miner_analysis_duration_seconds";
/// Ideas appended to the store
pub const IDEAS_EXTRACTED_TOTAL: &str = "ideas_miner_ideas_extracted_total";
/// Searches executed
pub const SEARCHES_TOTAL: &str = "ideas_miner_searches_total";
/// Results returned per search
pub const SEARCH_RESULTS: &str = "ideas_miner_search_results";
/// Search duration
pub const SEARCH_DURATION_SECONDS: &str = "ideas_miner_search_duration_seconds";
/// Conversation sentiment scores
pub const SENTIMENT_SCORES: &str = "ideas_miner_sentiment_scores";
/// Imported messages
pub const MESSAGES_IMPORTED_TOTAL: &str = "ideas_miner_messages_imported_total";
/// Size of the corpus at the last stats call
pub const CORPUS_MESSAGES: &str = "ideas_miner_corpus_messages";
/// Failed operations
pub const ERRORS_TOTAL: &str = "ideas_miner_errors_total";

/// Records analytics metrics through the `metrics` facade.
/// Nothing is exported unless the binary installs a recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    /// Record one analysis step
    pub fn record_analysis(&self, operation: &'static str, duration: Duration) {
        histogram!(ANALYSIS_DURATION_SECONDS, "operation" => operation).record(duration.as_secs_f64());
    }

    /// Record a completed full conversation analysis
    pub fn record_conversation_analyzed(&self, sentiment: f64) {
        counter!(CONVERSATIONS_ANALYZED_TOTAL).increment(1);
        histogram!(SENTIMENT_SCORES).record(sentiment);
    }

    /// Record ideas appended by one extraction run
    pub fn record_ideas_extracted(&self, count: usize) {
        counter!(IDEAS_EXTRACTED_TOTAL).increment(count as u64);
    }

    /// Record a search
    pub fn record_search(&self, result_count: usize, duration: Duration) {
        counter!(SEARCHES_TOTAL).increment(1);
        histogram!(SEARCH_RESULTS).record(result_count as f64);
        histogram!(SEARCH_DURATION_SECONDS).record(duration.as_secs_f64());
    }

    /// Record an import batch
    pub fn record_import(&self, source: &'static str, messages: usize) {
        counter!(MESSAGES_IMPORTED_TOTAL, "source" => source).increment(messages as u64);
    }

    /// Update the corpus size gauge
    pub fn set_corpus_size(&self, messages: usize) {
        gauge!(CORPUS_MESSAGES).set(messages as f64);
    }

    /// Record a failed operation
    pub fn record_error(&self, operation: &'static str) {
        counter!(ERRORS_TOTAL, "operation" => operation).increment(1);
    }
}
