// repositories/message_repository.rs

use async_trait::async_trait;
use deadpool_postgres::Pool;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::models::message::{Message, MessageKind, NewMessage, Role};

/// Storage failures shared by the message log and the audio object store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to get client from pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Database error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only message collection
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists `message`, assigning its id
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// All messages by timestamp ascending, equal timestamps in arrival order
    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError>;
}

pub struct PgMessageStore {
    pool: Pool,
}

impl PgMessageStore {
    pub fn new(pool: Pool) -> Self {
        PgMessageStore { pool }
    }
}

fn message_from_row(row: &Row) -> Result<Message, StoreError> {
    let role: String = row.get(4);
    let role = role.parse::<Role>().map_err(StoreError::InvalidRecord)?;
    let audio_url: Option<String> = row.get(3);

    Ok(Message {
        id: row.get(0),
        text: row.get(1),
        translated_text: row.get(2),
        role,
        timestamp: row.get(5),
        kind: MessageKind::from(audio_url),
    })
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let client = self.pool.get().await?;

        let query = "
            INSERT INTO conversations (text, translated_text, audio_url, role, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, timestamp
        ";
        let audio_url = message.kind.audio_url();
        let row = client
            .query_one(
                query,
                &[
                    &message.text,
                    &message.translated_text,
                    &audio_url,
                    &message.role.as_str(),
                    &message.timestamp,
                ],
            )
            .await?;

        // the column rounds to microseconds; hand back what snapshots will read
        let mut stored = Message::from_new(row.get(0), message);
        stored.timestamp = row.get(1);
        Ok(stored)
    }

    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError> {
        let client = self.pool.get().await?;

        let query = "
            SELECT id, text, translated_text, audio_url, role, timestamp
            FROM conversations
            ORDER BY timestamp, seq
        ";
        let rows = client.query(query, &[]).await?;

        rows.iter().map(message_from_row).collect()
    }
}

/// Process-local store used when no database is configured
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let stored = Message::from_new(Uuid::new_v4(), message);
        self.messages.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_ordered(&self) -> Result<Vec<Message>, StoreError> {
        let mut messages = self.messages.read().await.clone();
        // stable: equal timestamps keep arrival order
        messages.sort_by_key(|message| message.timestamp);
        Ok(messages)
    }
}
