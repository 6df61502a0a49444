//! PostgreSQL implementation of JournalStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{JournalEntryId, MessageId, Timestamp, UserId};
use crate::domain::wellness::JournalEntry;
use crate::ports::{JournalStore, StoreError};

/// PostgreSQL implementation of JournalStore.
#[derive(Clone)]
pub struct PostgresJournalStore {
    pool: PgPool,
}

impl PostgresJournalStore {
    /// Creates a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JournalStore for PostgresJournalStore {
    async fn create(&self, entry: &JournalEntry) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO journal_entries (
                id, user_id, title, content, word_count, ai_insights,
                source_message_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, source_message_id)
                WHERE source_message_id IS NOT NULL
                DO NOTHING
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(entry.user_id().as_str())
        .bind(entry.title())
        .bind(entry.content())
        .bind(entry.word_count() as i32)
        .bind(entry.ai_insights().cloned())
        .bind(entry.source_message_id().map(|id| *id.as_uuid()))
        .bind(entry.created_at().as_datetime())
        .bind(entry.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert journal entry: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, content, word_count, ai_insights,
                   source_message_id, created_at, updated_at
            FROM journal_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch journal entries: {}", e)))?;

        rows.iter()
            .map(|row| {
                let id: uuid::Uuid = row.get("id");
                let user_id: String = row.get("user_id");
                let title: Option<String> = row.get("title");
                let content: String = row.get("content");
                let word_count: i32 = row.get("word_count");
                let ai_insights: Option<serde_json::Value> = row.get("ai_insights");
                let source_message_id: Option<uuid::Uuid> = row.get("source_message_id");
                let created_at: DateTime<Utc> = row.get("created_at");
                let updated_at: DateTime<Utc> = row.get("updated_at");

                let user_id = UserId::new(user_id)
                    .map_err(|e| StoreError::database(format!("corrupt user_id: {}", e)))?;

                Ok(JournalEntry::from_parts(
                    JournalEntryId::from_uuid(id),
                    user_id,
                    title,
                    content,
                    word_count as u32,
                    ai_insights,
                    source_message_id.map(MessageId::from_uuid),
                    Timestamp::from_datetime(created_at),
                    Timestamp::from_datetime(updated_at),
                ))
            })
            .collect()
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM journal_entries WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("failed to count journal entries: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }
}
