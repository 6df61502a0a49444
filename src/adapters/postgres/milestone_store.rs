//! PostgreSQL implementation of MilestoneStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashSet;

use crate::domain::foundation::{MilestoneId, Percentage, Timestamp, UserId};
use crate::domain::wellness::{Milestone, MilestoneType};
use crate::ports::{MilestoneStore, StoreError};

/// PostgreSQL implementation of MilestoneStore.
#[derive(Clone)]
pub struct PostgresMilestoneStore {
    pool: PgPool,
}

impl PostgresMilestoneStore {
    /// Creates a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneStore for PostgresMilestoneStore {
    async fn create_if_absent(&self, milestone: &Milestone) -> Result<bool, StoreError> {
        // Concurrent turns race here; the (user_id, type) constraint decides
        // the winner and DO NOTHING absorbs the loser.
        let result = sqlx::query(
            r#"
            INSERT INTO milestones (
                id, user_id, type, name, description, progress, unlocked,
                unlocked_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT ON CONSTRAINT uq_milestones_user_type DO NOTHING
            "#,
        )
        .bind(milestone.id().as_uuid())
        .bind(milestone.user_id().as_str())
        .bind(milestone.milestone_type().key())
        .bind(milestone.name())
        .bind(milestone.description())
        .bind(milestone.progress().value() as i16)
        .bind(milestone.is_unlocked())
        .bind(milestone.unlocked_at().map(|t| *t.as_datetime()))
        .bind(milestone.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert milestone: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Milestone>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, type, name, description, progress, unlocked,
                   unlocked_at, created_at
            FROM milestones
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch milestones: {}", e)))?;

        rows.iter()
            .map(|row| {
                let id: uuid::Uuid = row.get("id");
                let user_id: String = row.get("user_id");
                let type_key: String = row.get("type");
                let name: String = row.get("name");
                let description: String = row.get("description");
                let progress: i16 = row.get("progress");
                let unlocked: bool = row.get("unlocked");
                let unlocked_at: Option<DateTime<Utc>> = row.get("unlocked_at");
                let created_at: DateTime<Utc> = row.get("created_at");

                let user_id = UserId::new(user_id)
                    .map_err(|e| StoreError::database(format!("corrupt user_id: {}", e)))?;
                let milestone_type = MilestoneType::parse(&type_key).ok_or_else(|| {
                    StoreError::database(format!("corrupt milestone type: {}", type_key))
                })?;
                let progress = Percentage::try_new(progress as u8)
                    .map_err(|e| StoreError::database(format!("corrupt progress: {}", e)))?;

                Ok(Milestone::from_parts(
                    MilestoneId::from_uuid(id),
                    user_id,
                    milestone_type,
                    name,
                    description,
                    progress,
                    unlocked,
                    unlocked_at.map(Timestamp::from_datetime),
                    Timestamp::from_datetime(created_at),
                ))
            })
            .collect()
    }

    async fn existing_types(
        &self,
        user_id: &UserId,
    ) -> Result<HashSet<MilestoneType>, StoreError> {
        let rows = sqlx::query("SELECT type FROM milestones WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("failed to fetch milestone types: {}", e)))?;

        Ok(rows
            .iter()
            .filter_map(|row| MilestoneType::parse(&row.get::<String, _>("type")))
            .collect())
    }
}
