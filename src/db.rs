//! SQLite-backed implementation of [`ConversationStore`].
//!
//! Connections come from an r2d2 pool. Message timestamps are stored as epoch
//! milliseconds so range lookups hit an integer index; list-valued fields are
//! stored as JSON text.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{MinerError, Result};
use crate::models::{
    Conversation, ConversationUpdate, DateRange, Idea, Message, NewIdea, NewMessage, Source,
};
use crate::repository::ConversationStore;
use crate::schema::{conversations, ideas, messages};

/// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
/// Type alias for a pooled connection
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Record store persisted in a SQLite file
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations
    pub fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(max_connections).build(manager)?;
        Self::from_pool(pool)
    }

    /// A private in-memory database. The pool holds a single connection so
    /// every caller sees the same data.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        Self::from_pool(pool)
    }

    fn from_pool(pool: DbPool) -> Result<Self> {
        let conn = pool.get()?;
        Self::run_migrations(&conn)?;
        Ok(Self { pool })
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!(
            "../migrations/2026-10-01-000000_create_tables/up.sql"
        ))?;
        conn.execute_batch(include_str!(
            "../migrations/2026-10-08-000000_add_message_indexes/up.sql"
        ))?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    fn query_messages(&self, filter: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Message>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {}, {}, {}, {}, {}, {} FROM {} {}",
            messages::ID,
            messages::CONVERSATION_ID,
            messages::SOURCE,
            messages::TIMESTAMP_MS,
            messages::ROLE,
            messages::CONTENT,
            messages::TABLE,
            filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, map_message)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_ideas(&self, filter: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Idea>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {}, {}, {}, {}, {}, {}, {} FROM {} {}",
            ideas::ID,
            ideas::CONVERSATION_ID,
            ideas::MESSAGE_ID,
            ideas::CONTENT,
            ideas::EXTRACTED_AT,
            ideas::CATEGORY,
            ideas::TAGS,
            ideas::TABLE,
            filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, map_idea)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_conversations(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Conversation>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {}, {}, {}, {}, {}, {}, {}, {}, {} FROM {} {}",
            conversations::ID,
            conversations::SOURCE,
            conversations::TITLE,
            conversations::START_DATE,
            conversations::END_DATE,
            conversations::MESSAGE_COUNT,
            conversations::TOPICS,
            conversations::SENTIMENT,
            conversations::SUMMARY,
            conversations::TABLE,
            filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, map_conversation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    async fn insert_conversation(&self, conversation: Conversation) -> Result<()> {
        let conn = self.get_connection()?;
        let topics = conversation
            .topics
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                conversations::TABLE,
                conversations::ID,
                conversations::SOURCE,
                conversations::TITLE,
                conversations::START_DATE,
                conversations::END_DATE,
                conversations::MESSAGE_COUNT,
                conversations::TOPICS,
                conversations::SENTIMENT,
                conversations::SUMMARY
            ),
            params![
                conversation.id,
                conversation.source.as_str(),
                conversation.title,
                conversation.start_date,
                conversation.end_date,
                i64::try_from(conversation.message_count).unwrap_or(i64::MAX),
                topics,
                conversation.sentiment,
                conversation.summary
            ],
        )?;
        Ok(())
    }

    async fn insert_messages(&self, new_messages: Vec<NewMessage>) -> Result<Vec<Message>> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(new_messages.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                messages::TABLE,
                messages::CONVERSATION_ID,
                messages::SOURCE,
                messages::TIMESTAMP_MS,
                messages::ROLE,
                messages::CONTENT
            ))?;
            for new_message in new_messages {
                // Stored as epoch milliseconds; return what a read-back yields
                let timestamp = new_message.timestamp.trunc_subsecs(3);
                let id = stmt.insert(params![
                    new_message.conversation_id,
                    new_message.source.as_str(),
                    timestamp.timestamp_millis(),
                    new_message.role.as_str(),
                    new_message.content
                ])?;
                inserted.push(Message {
                    id,
                    conversation_id: new_message.conversation_id,
                    source: new_message.source,
                    timestamp,
                    role: new_message.role,
                    content: new_message.content,
                });
            }
        }
        tx.commit()?;
        debug!(count = inserted.len(), "Inserted messages");
        Ok(inserted)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conn = self.get_connection()?;
        let conversation = conn
            .query_row(
                &format!(
                    "SELECT {}, {}, {}, {}, {}, {}, {}, {}, {} FROM {} WHERE {} = ?",
                    conversations::ID,
                    conversations::SOURCE,
                    conversations::TITLE,
                    conversations::START_DATE,
                    conversations::END_DATE,
                    conversations::MESSAGE_COUNT,
                    conversations::TOPICS,
                    conversations::SENTIMENT,
                    conversations::SUMMARY,
                    conversations::TABLE,
                    conversations::ID
                ),
                params![id],
                map_conversation,
            )
            .optional()?;
        Ok(conversation)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.query_conversations("ORDER BY rowid ASC", &[])
    }

    async fn update_conversation(&self, id: &str, update: ConversationUpdate) -> Result<()> {
        let conn = self.get_connection()?;

        let mut update_fields = Vec::new();
        let mut update_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(topics) = &update.topics {
            update_fields.push(format!("{} = ?", conversations::TOPICS));
            update_params.push(Box::new(serde_json::to_string(topics)?));
        }
        if let Some(sentiment) = update.sentiment {
            update_fields.push(format!("{} = ?", conversations::SENTIMENT));
            update_params.push(Box::new(sentiment));
        }
        if let Some(summary) = update.summary {
            update_fields.push(format!("{} = ?", conversations::SUMMARY));
            update_params.push(Box::new(summary));
        }

        let affected = if update_fields.is_empty() {
            conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {} = ?",
                    conversations::TABLE,
                    conversations::ID
                ),
                params![id],
                |row| row.get::<_, i64>(0),
            )?
        } else {
            update_params.push(Box::new(id.to_string()));
            let query = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                conversations::TABLE,
                update_fields.join(", "),
                conversations::ID
            );
            let changed = conn.execute(&query, rusqlite::params_from_iter(update_params.iter()))?;
            i64::try_from(changed).unwrap_or(i64::MAX)
        };

        if affected == 0 {
            return Err(MinerError::ConversationNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get_messages_by_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.query_messages(
            &format!(
                "WHERE {} = ? ORDER BY {} ASC",
                messages::CONVERSATION_ID,
                messages::ID
            ),
            &[&conversation_id],
        )
    }

    async fn get_all_messages(&self) -> Result<Vec<Message>> {
        self.query_messages(&format!("ORDER BY {} ASC", messages::ID), &[])
    }

    async fn query_messages_by_timestamp_range(&self, range: DateRange) -> Result<Vec<Message>> {
        let start = range.start.timestamp_millis();
        let end = range.end.timestamp_millis();
        self.query_messages(
            &format!(
                "WHERE {ts} >= ? AND {ts} < ? ORDER BY {ts} ASC, {id} ASC",
                ts = messages::TIMESTAMP_MS,
                id = messages::ID
            ),
            &[&start, &end],
        )
    }

    async fn query_messages_by_source(&self, source: Source) -> Result<Vec<Message>> {
        self.query_messages(
            &format!("WHERE {} = ? ORDER BY {} ASC", messages::SOURCE, messages::ID),
            &[&source.as_str()],
        )
    }

    async fn append_ideas(&self, new_ideas: Vec<NewIdea>) -> Result<Vec<Idea>> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let mut appended = Vec::with_capacity(new_ideas.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?)",
                ideas::TABLE,
                ideas::CONVERSATION_ID,
                ideas::MESSAGE_ID,
                ideas::CONTENT,
                ideas::EXTRACTED_AT,
                ideas::CATEGORY,
                ideas::TAGS
            ))?;
            for new_idea in new_ideas {
                let tags = new_idea.tags.as_ref().map(serde_json::to_string).transpose()?;
                let id = stmt.insert(params![
                    new_idea.conversation_id,
                    new_idea.message_id,
                    new_idea.content,
                    new_idea.extracted_at,
                    new_idea.category,
                    tags
                ])?;
                appended.push(Idea {
                    id,
                    conversation_id: new_idea.conversation_id,
                    message_id: new_idea.message_id,
                    content: new_idea.content,
                    extracted_at: new_idea.extracted_at,
                    category: new_idea.category,
                    tags: new_idea.tags,
                });
            }
        }
        // Dropping an uncommitted transaction rolls it back, so a failed
        // insert above leaves no partial batch behind.
        tx.commit()?;
        Ok(appended)
    }

    async fn get_ideas_by_conversation(&self, conversation_id: &str) -> Result<Vec<Idea>> {
        self.query_ideas(
            &format!("WHERE {} = ? ORDER BY {} ASC", ideas::CONVERSATION_ID, ideas::ID),
            &[&conversation_id],
        )
    }

    async fn get_all_ideas(&self) -> Result<Vec<Idea>> {
        self.query_ideas(&format!("ORDER BY {} ASC", ideas::ID), &[])
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(&format!(
            "DELETE FROM {}; DELETE FROM {}; DELETE FROM {};",
            ideas::TABLE,
            messages::TABLE,
            conversations::TABLE
        ))?;
        Ok(())
    }
}

/// Map a database row to a Message
fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(messages::ID)?,
        conversation_id: row.get(messages::CONVERSATION_ID)?,
        source: parse_column(row, messages::SOURCE)?,
        timestamp: millis_column(row, messages::TIMESTAMP_MS)?,
        role: parse_column(row, messages::ROLE)?,
        content: row.get(messages::CONTENT)?,
    })
}

/// Map a database row to an Idea
fn map_idea(row: &Row<'_>) -> rusqlite::Result<Idea> {
    Ok(Idea {
        id: row.get(ideas::ID)?,
        conversation_id: row.get(ideas::CONVERSATION_ID)?,
        message_id: row.get(ideas::MESSAGE_ID)?,
        content: row.get(ideas::CONTENT)?,
        extracted_at: row.get(ideas::EXTRACTED_AT)?,
        category: row.get(ideas::CATEGORY)?,
        tags: json_column(row, ideas::TAGS)?,
    })
}

/// Map a database row to a Conversation
fn map_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let count_idx = row.as_ref().column_index(conversations::MESSAGE_COUNT)?;
    let count: i64 = row.get(count_idx)?;
    let message_count =
        usize::try_from(count).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(count_idx, count))?;

    Ok(Conversation {
        id: row.get(conversations::ID)?,
        source: parse_column(row, conversations::SOURCE)?,
        title: row.get(conversations::TITLE)?,
        start_date: row.get(conversations::START_DATE)?,
        end_date: row.get(conversations::END_DATE)?,
        message_count,
        topics: json_column(row, conversations::TOPICS)?,
        sentiment: row.get(conversations::SENTIMENT)?,
        summary: row.get(conversations::SUMMARY)?,
    })
}

fn parse_column<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = MinerError>,
{
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn millis_column(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let idx = row.as_ref().column_index(column)?;
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn json_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<Vec<String>>> {
    let idx = row.as_ref().column_index(column)?;
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
