//! Conversation store port.
//!
//! Persists conversations and their append-only messages. Every query is
//! scoped to the owning user; a lookup without that scope does not exist in
//! this contract.

use async_trait::async_trait;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::domain::journey::Stage;

use super::StoreError;

/// Store port for conversations and messages.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persists a new conversation.
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Finds the user's most recently active conversation.
    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Finds a conversation by id, scoped to its owner.
    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Updates the conversation title.
    async fn update_title(
        &self,
        user_id: &UserId,
        id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError>;

    /// Commits a stage transition.
    ///
    /// The single write path for the stage column. `entered_at` records when
    /// the new stage began, resetting the minimum-exchange clock.
    async fn commit_stage(
        &self,
        user_id: &UserId,
        id: ConversationId,
        stage: Stage,
        entered_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Appends a message to a conversation.
    async fn append_message(
        &self,
        conversation_id: ConversationId,
        message: &Message,
    ) -> Result<(), StoreError>;

    /// Returns the most recent messages, oldest first, bounded by `limit`.
    async fn recent_messages(
        &self,
        conversation_id: ConversationId,
        limit: u32,
    ) -> Result<Vec<Message>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ConversationStore) {}
    }
}
