//! Error types for the ideas-miner library.
//!
//! Analytics code never fails on its own inputs: empty conversations and empty
//! queries produce sentinel values instead. The variants here cover the
//! storage collaborator, configuration, input validation and import parsing.

use thiserror::Error;

/// Errors that can occur in the ideas-miner library.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Failure reported by a non-SQL store implementation
    #[error("Store error: {0}")]
    Store(String),

    /// Conversation not found
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// Empty or otherwise unusable search query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Malformed import payload
    #[error("Import error: {0}")]
    Import(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Idea pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Result with `MinerError`
pub type Result<T> = std::result::Result<T, MinerError>;
