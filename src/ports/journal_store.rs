//! Journal entry store port.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::wellness::JournalEntry;

use super::StoreError;

/// Store port for journal entries.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Persists a journal entry.
    ///
    /// When the record carries a `source_message_id`, the store enforces
    /// uniqueness on `(user, source_message_id)`: a duplicate insert is a
    /// no-op and returns `false`.
    async fn create(&self, entry: &JournalEntry) -> Result<bool, StoreError>;

    /// Returns the user's most recent entries, newest first.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<JournalEntry>, StoreError>;

    /// Returns the total number of entries the user has written.
    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, StoreError>;
}
