//! Storage contract consumed by the analytics core.
//!
//! The analytics algorithms only ever see the records returned here, so an
//! indexed backend can replace a full scan without touching them.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{MinerError, Result};
use crate::models::{
    Conversation, ConversationUpdate, DateRange, Idea, Message, NewIdea, NewMessage, Source,
};

/// Record store holding conversations, messages and ideas
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert a conversation; fails if the id is taken
    async fn insert_conversation(&self, conversation: Conversation) -> Result<()>;

    /// Insert messages, returning them with their assigned ids
    async fn insert_messages(&self, messages: Vec<NewMessage>) -> Result<Vec<Message>>;

    /// Look up a conversation by id
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    /// All conversations in insertion order
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    /// Overwrite the analysis fields carried by `update`
    async fn update_conversation(&self, id: &str, update: ConversationUpdate) -> Result<()>;

    /// Messages of one conversation in id order
    async fn get_messages_by_conversation(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// The whole corpus in id order
    async fn get_all_messages(&self) -> Result<Vec<Message>>;

    /// Messages with `range.start <= timestamp < range.end`, by timestamp then id
    async fn query_messages_by_timestamp_range(&self, range: DateRange) -> Result<Vec<Message>>;

    /// Messages with the given source in id order
    async fn query_messages_by_source(&self, source: Source) -> Result<Vec<Message>>;

    /// Append ideas as one all-or-nothing batch
    async fn append_ideas(&self, ideas: Vec<NewIdea>) -> Result<Vec<Idea>>;

    /// Ideas extracted from one conversation in id order
    async fn get_ideas_by_conversation(&self, conversation_id: &str) -> Result<Vec<Idea>>;

    /// Every stored idea in id order
    async fn get_all_ideas(&self) -> Result<Vec<Idea>>;

    /// Remove all conversations, messages and ideas
    async fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct Tables {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    ideas: Vec<Idea>,
    next_message_id: i64,
    next_idea_id: i64,
}

/// Process-local store, used by tests and one-off runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn insert_conversation(&self, conversation: Conversation) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(MinerError::Store(format!(
                "Conversation already exists: {}",
                conversation.id
            )));
        }
        tables.conversations.push(conversation);
        Ok(())
    }

    async fn insert_messages(&self, messages: Vec<NewMessage>) -> Result<Vec<Message>> {
        let mut tables = self.tables.write().await;
        let mut inserted = Vec::with_capacity(messages.len());
        for new_message in messages {
            tables.next_message_id += 1;
            let message = Message {
                id: tables.next_message_id,
                conversation_id: new_message.conversation_id,
                source: new_message.source,
                timestamp: new_message.timestamp,
                role: new_message.role,
                content: new_message.content,
            };
            tables.messages.push(message.clone());
            inserted.push(message);
        }
        Ok(inserted)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let tables = self.tables.read().await;
        Ok(tables.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        Ok(self.tables.read().await.conversations.clone())
    }

    async fn update_conversation(&self, id: &str, update: ConversationUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        let conversation = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| MinerError::ConversationNotFound(id.to_string()))?;
        update.apply_to(conversation);
        Ok(())
    }

    async fn get_messages_by_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn get_all_messages(&self) -> Result<Vec<Message>> {
        Ok(self.tables.read().await.messages.clone())
    }

    async fn query_messages_by_timestamp_range(&self, range: DateRange) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| range.contains(&m.timestamp))
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn query_messages_by_source(&self, source: Source) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.source == source)
            .cloned()
            .collect())
    }

    async fn append_ideas(&self, ideas: Vec<NewIdea>) -> Result<Vec<Idea>> {
        let mut tables = self.tables.write().await;
        let mut appended = Vec::with_capacity(ideas.len());
        for new_idea in ideas {
            tables.next_idea_id += 1;
            let idea = Idea {
                id: tables.next_idea_id,
                conversation_id: new_idea.conversation_id,
                message_id: new_idea.message_id,
                content: new_idea.content,
                extracted_at: new_idea.extracted_at,
                category: new_idea.category,
                tags: new_idea.tags,
            };
            tables.ideas.push(idea.clone());
            appended.push(idea);
        }
        Ok(appended)
    }

    async fn get_ideas_by_conversation(&self, conversation_id: &str) -> Result<Vec<Idea>> {
        let tables = self.tables.read().await;
        Ok(tables
            .ideas
            .iter()
            .filter(|i| i.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn get_all_ideas(&self) -> Result<Vec<Idea>> {
        Ok(self.tables.read().await.ideas.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }
}
