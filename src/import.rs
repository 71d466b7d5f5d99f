//! Import of exported chat histories into a [`ConversationStore`].
//!
//! ChatGPT exports are parsed structurally. Other assistants go through a
//! lenient importer that treats the JSON as a flat list of messages forming
//! one conversation. Message text from both is cleaned with
//! [`InputValidator::sanitize_text`] before it is stored, so everything in a
//! store is NFC.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{MinerError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{Conversation, NewMessage, Role, Source};
use crate::repository::ConversationStore;
use crate::validation::InputValidator;

/// Title given to ChatGPT conversations without one
pub const UNTITLED_CONVERSATION: &str = "Untitled Conversation";
/// Title given to conversations from the generic importer
pub const IMPORTED_CONVERSATION: &str = "Imported Conversation";

/// What an import added to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Conversations created
    pub conversations: usize,
    /// Messages created
    pub messages: usize,
}

#[derive(Debug, Deserialize)]
struct ChatGptConversation {
    title: Option<String>,
    #[serde(default)]
    mapping: BTreeMap<String, ChatGptNode>,
}

#[derive(Debug, Deserialize)]
struct ChatGptNode {
    message: Option<ChatGptMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatGptMessage {
    author: ChatGptAuthor,
    content: Option<ChatGptContent>,
    create_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatGptAuthor {
    role: String,
}

#[derive(Debug, Deserialize)]
struct ChatGptContent {
    #[serde(default)]
    parts: Vec<Value>,
}

/// Read `path` and import it with the importer matching `source`
#[instrument(skip(store))]
pub async fn import_file<S: ConversationStore + ?Sized>(
    store: &S,
    path: &Path,
    source: Source,
) -> Result<ImportSummary> {
    let raw = tokio::fs::read_to_string(path).await?;
    let json: Value = serde_json::from_str(&raw)?;

    match source {
        Source::Chatgpt => import_chatgpt(store, &json).await,
        other => import_generic(store, &json, other).await,
    }
}

/// Import a ChatGPT `conversations.json` export (an array or a single
/// conversation object).
///
/// Mapping nodes with content parts become messages ordered by
/// `create_time`. Conversations without any such node are skipped.
pub async fn import_chatgpt<S: ConversationStore + ?Sized>(
    store: &S,
    json: &Value,
) -> Result<ImportSummary> {
    let mut conversations = Vec::new();
    let mut messages = Vec::new();

    for raw in as_items(json) {
        let export: ChatGptConversation = serde_json::from_value(raw.clone())
            .map_err(|e| MinerError::Import(format!("Malformed ChatGPT conversation: {e}")))?;

        let mut nodes: Vec<&ChatGptMessage> = export
            .mapping
            .values()
            .filter_map(|node| node.message.as_ref())
            .filter(|message| message.content.as_ref().is_some_and(|c| !c.parts.is_empty()))
            .collect();
        if nodes.is_empty() {
            debug!(title = ?export.title, "Skipping conversation without messages");
            continue;
        }
        nodes.sort_by(|a, b| {
            a.create_time
                .unwrap_or(0.0)
                .total_cmp(&b.create_time.unwrap_or(0.0))
        });

        let conversation_id = Uuid::new_v4().to_string();
        let conversation_messages: Vec<NewMessage> = nodes
            .into_iter()
            .map(|message| NewMessage {
                conversation_id: conversation_id.clone(),
                source: Source::Chatgpt,
                timestamp: from_epoch_seconds(message.create_time.unwrap_or(0.0)),
                role: if message.author.role == "user" {
                    Role::User
                } else {
                    Role::Assistant
                },
                content: message
                    .content
                    .as_ref()
                    .map(|c| InputValidator::sanitize_text(&join_parts(&c.parts)))
                    .unwrap_or_default(),
            })
            .collect();

        conversations.push(new_conversation(
            conversation_id,
            Source::Chatgpt,
            export.title.unwrap_or_else(|| UNTITLED_CONVERSATION.to_string()),
            &conversation_messages,
        ));
        messages.extend(conversation_messages);
    }

    persist(store, Source::Chatgpt, conversations, messages).await
}

/// Import a flat list of message objects as a single conversation.
///
/// Content comes from `content`, then `text`, then the object's JSON.
/// Unknown roles alternate user and assistant by position. Missing or
/// unparseable timestamps become the import time.
pub async fn import_generic<S: ConversationStore + ?Sized>(
    store: &S,
    json: &Value,
    source: Source,
) -> Result<ImportSummary> {
    let conversation_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let messages: Vec<NewMessage> = as_items(json)
        .iter()
        .enumerate()
        .map(|(index, raw)| NewMessage {
            conversation_id: conversation_id.clone(),
            source,
            timestamp: raw.get("timestamp").and_then(parse_timestamp).unwrap_or(now),
            role: match raw.get("role").and_then(Value::as_str) {
                Some("user") => Role::User,
                Some("assistant") => Role::Assistant,
                _ if index % 2 == 0 => Role::User,
                _ => Role::Assistant,
            },
            content: InputValidator::sanitize_text(
                &["content", "text"]
                    .iter()
                    .find_map(|key| {
                        raw.get(*key)
                            .and_then(Value::as_str)
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| raw.to_string()),
            ),
        })
        .collect();

    if messages.is_empty() {
        return Ok(ImportSummary::default());
    }

    let conversation = new_conversation(
        conversation_id,
        source,
        IMPORTED_CONVERSATION.to_string(),
        &messages,
    );
    persist(store, source, vec![conversation], messages).await
}

async fn persist<S: ConversationStore + ?Sized>(
    store: &S,
    source: Source,
    conversations: Vec<Conversation>,
    messages: Vec<NewMessage>,
) -> Result<ImportSummary> {
    let summary = ImportSummary {
        conversations: conversations.len(),
        messages: messages.len(),
    };

    for conversation in conversations {
        store.insert_conversation(conversation).await?;
    }
    if !messages.is_empty() {
        store.insert_messages(messages).await?;
    }

    MetricsCollector.record_import(source.as_str(), summary.messages);
    info!(
        source = source.as_str(),
        conversations = summary.conversations,
        messages = summary.messages,
        "Import completed"
    );
    Ok(summary)
}

fn new_conversation(
    id: String,
    source: Source,
    title: String,
    messages: &[NewMessage],
) -> Conversation {
    let start_date = messages.first().map_or(DateTime::UNIX_EPOCH, |m| m.timestamp);
    let end_date = messages.last().map_or(start_date, |m| m.timestamp);
    Conversation {
        id,
        source,
        title,
        start_date,
        end_date,
        message_count: messages.len(),
        topics: None,
        sentiment: None,
        summary: None,
    }
}

fn as_items(json: &Value) -> Vec<&Value> {
    match json {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn join_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .map(|part| match part {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(clippy::cast_possible_truncation)]
fn from_epoch_seconds(seconds: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64).unwrap_or(DateTime::UNIX_EPOCH)
}

/// RFC 3339 strings or epoch milliseconds
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
