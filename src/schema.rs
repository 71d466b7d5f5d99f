//! Database schema definitions
//!
//! Table and column names used by the SQLite store.

/// Conversations table schema
pub mod conversations {
    /// Table name
    pub const TABLE: &str = "conversations";
    /// Primary key column (UUID text)
    pub const ID: &str = "id";
    /// Export source column
    pub const SOURCE: &str = "source";
    /// Title column
    pub const TITLE: &str = "title";
    /// First message timestamp column
    pub const START_DATE: &str = "start_date";
    /// Last message timestamp column
    pub const END_DATE: &str = "end_date";
    /// Message count column
    pub const MESSAGE_COUNT: &str = "message_count";
    /// JSON-encoded topic list column
    pub const TOPICS: &str = "topics";
    /// Sentiment score column
    pub const SENTIMENT: &str = "sentiment";
    /// Summary column
    pub const SUMMARY: &str = "summary";
}

/// Messages table schema
pub mod messages {
    /// Table name
    pub const TABLE: &str = "messages";
    /// Primary key column
    pub const ID: &str = "id";
    /// Owning conversation column
    pub const CONVERSATION_ID: &str = "conversation_id";
    /// Export source column
    pub const SOURCE: &str = "source";
    /// Milliseconds since the Unix epoch
    pub const TIMESTAMP_MS: &str = "timestamp_ms";
    /// Author role column
    pub const ROLE: &str = "role";
    /// Message text column
    pub const CONTENT: &str = "content";
}

/// Ideas table schema
pub mod ideas {
    /// Table name
    pub const TABLE: &str = "ideas";
    /// Primary key column
    pub const ID: &str = "id";
    /// Owning conversation column
    pub const CONVERSATION_ID: &str = "conversation_id";
    /// Source message column
    pub const MESSAGE_ID: &str = "message_id";
    /// Captured clause column
    pub const CONTENT: &str = "content";
    /// Extraction timestamp column
    pub const EXTRACTED_AT: &str = "extracted_at";
    /// Category column
    pub const CATEGORY: &str = "category";
    /// JSON-encoded tag list column
    pub const TAGS: &str = "tags";
}
