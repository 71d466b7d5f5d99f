//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use ideas_miner::models::{Conversation, Message, NewMessage, Role, Source};
use ideas_miner::ConversationStore;

/// 2024-03-01 09:00 UTC
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// Insert a conversation whose messages are one minute apart, alternating
/// user and assistant
pub async fn seed_conversation<S: ConversationStore>(
    store: &S,
    id: &str,
    source: Source,
    contents: &[&str],
) -> Vec<Message> {
    let start = base_time();
    let end = start + Duration::minutes(contents.len().saturating_sub(1) as i64);
    store
        .insert_conversation(Conversation {
            id: id.to_string(),
            source,
            title: format!("Conversation {id}"),
            start_date: start,
            end_date: end,
            message_count: contents.len(),
            topics: None,
            sentiment: None,
            summary: None,
        })
        .await
        .expect("Failed to insert conversation");

    let messages = contents
        .iter()
        .enumerate()
        .map(|(i, content)| NewMessage {
            conversation_id: id.to_string(),
            source,
            timestamp: start + Duration::minutes(i as i64),
            role: if i % 2 == 0 { Role::User } else { Role::Assistant },
            content: (*content).to_string(),
        })
        .collect();
    store
        .insert_messages(messages)
        .await
        .expect("Failed to insert messages")
}

/// A detached message for pure-function tests
pub fn message(id: i64, content: &str) -> Message {
    Message {
        id,
        conversation_id: "c1".to_string(),
        source: Source::Chatgpt,
        timestamp: base_time() + Duration::minutes(id),
        role: Role::User,
        content: content.to_string(),
    }
}
