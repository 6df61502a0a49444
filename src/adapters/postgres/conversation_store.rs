//! PostgreSQL implementation of ConversationStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::conversation::{Conversation, Message, Role};
use crate::domain::foundation::{ConversationId, MessageId, Timestamp, UserId};
use crate::domain::journey::Stage;
use crate::ports::{ConversationStore, StoreError};

/// PostgreSQL implementation of ConversationStore.
#[derive(Clone)]
pub struct PostgresConversationStore {
    pool: PgPool,
}

impl PostgresConversationStore {
    /// Creates a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_conversation(row: &sqlx::postgres::PgRow) -> Result<Conversation, StoreError> {
    let id: uuid::Uuid = row.get("id");
    let user_id: String = row.get("user_id");
    let title: String = row.get("title");
    let stage: String = row.get("stage");
    let stage_entered_at: DateTime<Utc> = row.get("stage_entered_at");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    let user_id = UserId::new(user_id)
        .map_err(|e| StoreError::database(format!("corrupt user_id: {}", e)))?;
    let stage =
        Stage::parse(&stage).map_err(|e| StoreError::database(format!("corrupt stage: {}", e)))?;

    Ok(Conversation::from_parts(
        ConversationId::from_uuid(id),
        user_id,
        title,
        stage,
        Timestamp::from_datetime(stage_entered_at),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, user_id, title, stage, stage_entered_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(conversation.id().as_uuid())
        .bind(conversation.user_id().as_str())
        .bind(conversation.title())
        .bind(conversation.stage().as_str())
        .bind(conversation.stage_entered_at().as_datetime())
        .bind(conversation.created_at().as_datetime())
        .bind(conversation.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert conversation: {}", e)))?;
        Ok(())
    }

    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, stage, stage_entered_at, created_at, updated_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch conversation: {}", e)))?;

        row.map(|row| row_to_conversation(&row)).transpose()
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, stage, stage_entered_at, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch conversation: {}", e)))?;

        row.map(|row| row_to_conversation(&row)).transpose()
    }

    async fn update_title(
        &self,
        user_id: &UserId,
        id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations SET title = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_str())
        .bind(title)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to update title: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn commit_stage(
        &self,
        user_id: &UserId,
        id: ConversationId,
        stage: Stage,
        entered_at: Timestamp,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET stage = $3, stage_entered_at = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_str())
        .bind(stage.as_str())
        .bind(entered_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to commit stage: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn append_message(
        &self,
        conversation_id: ConversationId,
        message: &Message,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(conversation_id.as_uuid())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert message: {}", e)))?;

        sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
            .bind(conversation_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("failed to touch conversation: {}", e)))?;

        Ok(())
    }

    async fn recent_messages(
        &self,
        conversation_id: ConversationId,
        limit: u32,
    ) -> Result<Vec<Message>, StoreError> {
        // Inner query selects the window from the end; outer restores
        // chronological order.
        let rows = sqlx::query(
            r#"
            SELECT id, role, content, created_at FROM (
                SELECT id, role, content, created_at
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch messages: {}", e)))?;

        rows.iter()
            .map(|row| {
                let id: uuid::Uuid = row.get("id");
                let role: String = row.get("role");
                let content: String = row.get("content");
                let created_at: DateTime<Utc> = row.get("created_at");
                let role = Role::parse(&role)
                    .map_err(|e| StoreError::database(format!("corrupt role: {}", e)))?;
                Ok(Message::from_parts(
                    MessageId::from_uuid(id),
                    role,
                    content,
                    Timestamp::from_datetime(created_at),
                ))
            })
            .collect()
    }
}
