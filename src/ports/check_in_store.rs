//! Check-in store port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::UserId;
use crate::domain::wellness::CheckIn;

use super::StoreError;

/// Store port for wellness check-ins.
#[async_trait]
pub trait CheckInStore: Send + Sync {
    /// Persists a check-in.
    ///
    /// When the record carries a `source_message_id`, the store enforces
    /// uniqueness on `(user, source_message_id)`: a duplicate insert is a
    /// no-op and returns `false`.
    async fn create(&self, check_in: &CheckIn) -> Result<bool, StoreError>;

    /// Returns the user's most recent check-ins, newest first.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<CheckIn>, StoreError>;

    /// Returns the distinct calendar days the user checked in, newest first.
    async fn activity_dates(&self, user_id: &UserId) -> Result<Vec<NaiveDate>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_in_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn CheckInStore) {}
    }
}
