//! PostgreSQL implementation of CheckInStore.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{CheckInId, MessageId, ScaleScore, Timestamp, UserId};
use crate::domain::wellness::CheckIn;
use crate::ports::{CheckInStore, StoreError};

/// PostgreSQL implementation of CheckInStore.
#[derive(Clone)]
pub struct PostgresCheckInStore {
    pool: PgPool,
}

impl PostgresCheckInStore {
    /// Creates a new store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInStore for PostgresCheckInStore {
    async fn create(&self, check_in: &CheckIn) -> Result<bool, StoreError> {
        // The partial unique index on (user_id, source_message_id) settles
        // duplicate extraction attempts; DO NOTHING makes retries no-ops.
        let result = sqlx::query(
            r#"
            INSERT INTO check_ins (
                id, user_id, mood, sleep_quality, energy_level, intentions,
                source_message_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, source_message_id)
                WHERE source_message_id IS NOT NULL
                DO NOTHING
            "#,
        )
        .bind(check_in.id().as_uuid())
        .bind(check_in.user_id().as_str())
        .bind(check_in.mood())
        .bind(check_in.sleep_quality().value())
        .bind(check_in.energy_level().value())
        .bind(check_in.intentions())
        .bind(check_in.source_message_id().map(|id| *id.as_uuid()))
        .bind(check_in.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to insert check-in: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<CheckIn>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, mood, sleep_quality, energy_level, intentions,
                   source_message_id, created_at
            FROM check_ins
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch check-ins: {}", e)))?;

        rows.iter()
            .map(|row| {
                let id: uuid::Uuid = row.get("id");
                let user_id: String = row.get("user_id");
                let mood: String = row.get("mood");
                let sleep_quality: i16 = row.get("sleep_quality");
                let energy_level: i16 = row.get("energy_level");
                let intentions: String = row.get("intentions");
                let source_message_id: Option<uuid::Uuid> = row.get("source_message_id");
                let created_at: DateTime<Utc> = row.get("created_at");

                let user_id = UserId::new(user_id)
                    .map_err(|e| StoreError::database(format!("corrupt user_id: {}", e)))?;
                let sleep = ScaleScore::try_from_i16(sleep_quality)
                    .map_err(|e| StoreError::database(format!("corrupt sleep_quality: {}", e)))?;
                let energy = ScaleScore::try_from_i16(energy_level)
                    .map_err(|e| StoreError::database(format!("corrupt energy_level: {}", e)))?;

                Ok(CheckIn::from_parts(
                    CheckInId::from_uuid(id),
                    user_id,
                    mood,
                    sleep,
                    energy,
                    intentions,
                    source_message_id.map(MessageId::from_uuid),
                    Timestamp::from_datetime(created_at),
                ))
            })
            .collect()
    }

    async fn activity_dates(&self, user_id: &UserId) -> Result<Vec<NaiveDate>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT (created_at AT TIME ZONE 'UTC')::date AS day
            FROM check_ins
            WHERE user_id = $1
            ORDER BY day DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("failed to fetch activity dates: {}", e)))?;

        Ok(rows.iter().map(|row| row.get::<NaiveDate, _>("day")).collect())
    }
}
