//! Milestone store port.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::foundation::UserId;
use crate::domain::wellness::{Milestone, MilestoneType};

use super::StoreError;

/// Store port for milestones.
#[async_trait]
pub trait MilestoneStore: Send + Sync {
    /// Persists a milestone unless the user already holds one of its type.
    ///
    /// Idempotency under concurrent invocation rests on the store's
    /// `(user, type)` uniqueness constraint, not on a pre-read. Returns
    /// `true` when a row was actually inserted.
    async fn create_if_absent(&self, milestone: &Milestone) -> Result<bool, StoreError>;

    /// Returns the user's most recent milestones, newest first.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Milestone>, StoreError>;

    /// Returns the set of milestone types the user already holds.
    async fn existing_types(&self, user_id: &UserId)
        -> Result<HashSet<MilestoneType>, StoreError>;
}
