//! Ideas Miner - Analytics and Search over AI Chat History
//!
//! A Rust library that turns exported ChatGPT, Claude and Gemini
//! conversations into something you can mine: keywords, topics, sentiment,
//! extracted ideas and ranked search results.
//!
//! # Features
//!
//! - Import ChatGPT exports and generic JSON message lists
//! - Keyword extraction and topic ranking per conversation
//! - Lexicon-based sentiment scoring
//! - Pattern-based idea extraction
//! - Relevance search with highlighted excerpts
//! - SQLite or in-memory storage

/// Configuration management
pub mod config;
/// SQLite store and connection pooling
pub mod db;
/// Error types
pub mod error;
/// Idea extraction patterns
pub mod ideas;
/// Chat export importers
pub mod import;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Storage contract and in-memory store
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Relevance search and highlights
pub mod search;
/// Lexicon sentiment scoring
pub mod sentiment;
/// Analysis entry points
pub mod service;
/// Conversation summaries
pub mod summary;
/// Tokenization and keyword extraction
pub mod text;
/// Topic ranking
pub mod topics;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use config::AppConfig;
pub use db::SqliteStore;
pub use error::{MinerError, Result};
pub use ideas::IdeaExtractor;
pub use import::{import_chatgpt, import_generic, ImportSummary};
pub use models::{
    Conversation, ConversationAnalysis, CorpusStats, DateRange, Idea, Message, SearchResult,
    SentimentLabel, SentimentScore, Source, TopicAnalysis,
};
pub use repository::{ConversationStore, InMemoryStore};
pub use sentiment::{SentimentLexicon, SentimentScorer};
pub use service::AnalysisService;
pub use text::TextProcessor;
