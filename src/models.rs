//! Data models for imported chat history and derived analytics
//!
//! Persisted records (messages, conversations, ideas) mirror what the store
//! holds. Transient results (topics, sentiment, search hits) are produced by
//! the analytics modules and never written back verbatim.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MinerError;

/// Assistant product a conversation was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// OpenAI ChatGPT export
    Chatgpt,
    /// Anthropic Claude export
    Claude,
    /// Google Gemini export
    Gemini,
    /// Anything else
    Other,
}

impl Source {
    /// All sources, in display order
    pub const ALL: [Self; 4] = [Self::Chatgpt, Self::Claude, Self::Gemini, Self::Other];

    /// Stable lowercase name used in storage and on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chatgpt => "chatgpt",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Source {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatgpt" => Ok(Self::Chatgpt),
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            "other" => Ok(Self::Other),
            other => Err(MinerError::InvalidQuery(format!(
                "Unknown source: {other}. Must be one of: chatgpt, claude, gemini, other"
            ))),
        }
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the chat
    User,
    /// The assistant side of the chat
    Assistant,
}

impl Role {
    /// Stable lowercase name used in storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(MinerError::Store(format!("Unknown role: {other}"))),
        }
    }
}

/// A single imported chat message. Read-only input to the analytics core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identifier; corpus order follows it
    pub id: i64,
    /// Owning conversation
    pub conversation_id: String,
    /// Assistant product the message came from
    pub source: Source,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

/// Data for creating a new message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Owning conversation
    pub conversation_id: String,
    /// Assistant product the message came from
    pub source: Source,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

/// An imported conversation plus the fields written by analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation identifier (UUID for imported data)
    pub id: String,
    /// Assistant product the conversation came from
    pub source: Source,
    /// Display title
    pub title: String,
    /// Timestamp of the first message
    pub start_date: DateTime<Utc>,
    /// Timestamp of the last message
    pub end_date: DateTime<Utc>,
    /// Number of messages at import time
    pub message_count: usize,
    /// Top topic names, absent until first analysis
    pub topics: Option<Vec<String>>,
    /// Overall sentiment score, absent until first analysis
    pub sentiment: Option<f64>,
    /// One-line summary, absent until first analysis
    pub summary: Option<String>,
}

/// Partial update of the analysis-owned conversation fields.
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationUpdate {
    /// Replacement topic list
    pub topics: Option<Vec<String>>,
    /// Replacement sentiment score
    pub sentiment: Option<f64>,
    /// Replacement summary
    pub summary: Option<String>,
}

impl ConversationUpdate {
    /// Overwrite the fields this update carries
    pub fn apply_to(&self, conversation: &mut Conversation) {
        if let Some(topics) = &self.topics {
            conversation.topics = Some(topics.clone());
        }
        if let Some(sentiment) = self.sentiment {
            conversation.sentiment = Some(sentiment);
        }
        if let Some(summary) = &self.summary {
            conversation.summary = Some(summary.clone());
        }
    }
}

/// An extracted idea snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Store-assigned identifier
    pub id: i64,
    /// Conversation the idea came from
    pub conversation_id: String,
    /// Message the idea came from
    pub message_id: i64,
    /// The captured clause
    pub content: String,
    /// When the extraction ran
    pub extracted_at: DateTime<Utc>,
    /// Optional user-assigned category
    pub category: Option<String>,
    /// Optional user-assigned tags
    pub tags: Option<Vec<String>>,
}

/// Data for appending a new idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIdea {
    /// Conversation the idea came from
    pub conversation_id: String,
    /// Message the idea came from
    pub message_id: i64,
    /// The captured clause
    pub content: String,
    /// When the extraction ran
    pub extracted_at: DateTime<Utc>,
    /// Optional category
    pub category: Option<String>,
    /// Optional tags
    pub tags: Option<Vec<String>>,
}

/// Keyword coverage within one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    /// Keyword as extracted
    pub topic: String,
    /// Number of messages containing the keyword
    pub count: usize,
    /// `100 * count / message_count`
    pub percentage: f64,
}

/// Polarity bucket of a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Score below -0.1
    Negative,
    /// Score within [-0.1, 0.1]
    Neutral,
    /// Score above 0.1
    Positive,
}

impl SentimentLabel {
    /// Lowercase label as rendered in summaries
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexicon sentiment result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Normalized score in [-1, 1]
    pub score: f64,
    /// Bucket derived from `score`
    pub label: SentimentLabel,
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matching message
    pub message: Message,
    /// Match strength in (0, 1]
    pub relevance_score: f64,
    /// Between one and three preview excerpts
    pub highlights: Vec<String>,
}

/// Timestamp range for message lookups. Start is inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Lower bound (inclusive)
    pub start: DateTime<Utc>,
    /// Upper bound (exclusive)
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Whether `timestamp` falls inside the range
    #[must_use]
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.start && *timestamp < self.end
    }
}

/// Everything a full conversation analysis produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    /// Ranked topics
    pub topics: Vec<TopicAnalysis>,
    /// Rendered summary
    pub summary: String,
    /// Sentiment over the whole conversation
    pub sentiment: SentimentScore,
    /// Ideas appended by this run
    pub ideas: Vec<Idea>,
}

/// Corpus-wide totals for the dashboard view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of conversations
    pub total_conversations: usize,
    /// Number of messages
    pub total_messages: usize,
    /// Number of stored ideas
    pub total_ideas: usize,
    /// Conversation count per source
    pub sources: BTreeMap<Source, usize>,
    /// Earliest message timestamp
    pub earliest_message: Option<DateTime<Utc>>,
    /// Latest message timestamp
    pub latest_message: Option<DateTime<Utc>>,
}
