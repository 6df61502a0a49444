//! Context builder.
//!
//! Assembles the per-decision [`ConversationContext`] snapshot from four
//! independent reads. Context feeds prompt shaping and suggestions - low
//! risk features - so a failing sub-query degrades to an empty result and a
//! warning instead of blocking message delivery.

use std::sync::Arc;

use crate::domain::conversation::Conversation;
use crate::domain::journey::ConversationContext;
use crate::ports::{CheckInStore, ConversationStore, JournalStore, MilestoneStore};

/// Messages included in the snapshot window.
pub const RECENT_MESSAGE_LIMIT: u32 = 10;

/// Check-ins included in the snapshot window.
pub const RECENT_CHECK_IN_LIMIT: u32 = 3;

/// Milestones included in the snapshot window.
pub const RECENT_MILESTONE_LIMIT: u32 = 5;

/// Builds immutable context snapshots. Pure read; no side effects.
#[derive(Clone)]
pub struct ContextBuilder {
    conversations: Arc<dyn ConversationStore>,
    check_ins: Arc<dyn CheckInStore>,
    journals: Arc<dyn JournalStore>,
    milestones: Arc<dyn MilestoneStore>,
}

impl ContextBuilder {
    /// Creates a new context builder over the given stores.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        check_ins: Arc<dyn CheckInStore>,
        journals: Arc<dyn JournalStore>,
        milestones: Arc<dyn MilestoneStore>,
    ) -> Self {
        Self {
            conversations,
            check_ins,
            journals,
            milestones,
        }
    }

    /// Builds a fresh snapshot for the given conversation.
    pub async fn build(&self, conversation: &Conversation) -> ConversationContext {
        let user_id = conversation.user_id();
        let conversation_id = conversation.id();

        let (messages, check_ins, milestones, journal_count) = tokio::join!(
            self.conversations
                .recent_messages(conversation_id, RECENT_MESSAGE_LIMIT),
            self.check_ins.recent_for_user(user_id, RECENT_CHECK_IN_LIMIT),
            self.milestones
                .recent_for_user(user_id, RECENT_MILESTONE_LIMIT),
            self.journals.count_for_user(user_id),
        );

        let recent_messages = messages.unwrap_or_else(|e| {
            tracing::warn!(user = %user_id, error = %e, "context: message query degraded");
            Vec::new()
        });
        let recent_check_ins = check_ins.unwrap_or_else(|e| {
            tracing::warn!(user = %user_id, error = %e, "context: check-in query degraded");
            Vec::new()
        });
        let recent_milestones = milestones.unwrap_or_else(|e| {
            tracing::warn!(user = %user_id, error = %e, "context: milestone query degraded");
            Vec::new()
        });
        let journal_entry_count = journal_count.unwrap_or_else(|e| {
            tracing::warn!(user = %user_id, error = %e, "context: journal count degraded");
            0
        });

        let entered = conversation.stage_entered_at();
        let user_turns_in_stage = recent_messages
            .iter()
            .filter(|m| m.is_from_user() && !m.created_at.is_before(&entered))
            .count();

        ConversationContext {
            stage: conversation.stage(),
            user_turns_in_stage,
            recent_messages,
            recent_check_ins,
            recent_milestones,
            journal_entry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCheckInStore, InMemoryConversationStore, InMemoryJournalStore,
        InMemoryMilestoneStore,
    };
    use crate::domain::conversation::Message;
    use crate::domain::foundation::{ScaleScore, UserId};
    use crate::domain::journey::Stage;
    use crate::domain::wellness::CheckIn;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn builder() -> (
        ContextBuilder,
        Arc<InMemoryConversationStore>,
        Arc<InMemoryCheckInStore>,
    ) {
        let conversations = Arc::new(InMemoryConversationStore::new());
        let check_ins = Arc::new(InMemoryCheckInStore::new());
        let journals = Arc::new(InMemoryJournalStore::new());
        let milestones = Arc::new(InMemoryMilestoneStore::new());
        let builder = ContextBuilder::new(
            conversations.clone(),
            check_ins.clone(),
            journals,
            milestones,
        );
        (builder, conversations, check_ins)
    }

    #[tokio::test]
    async fn builds_empty_context_for_fresh_conversation() {
        let (builder, conversations, _) = builder();
        let conversation = Conversation::start(user());
        conversations.create(&conversation).await.unwrap();

        let context = builder.build(&conversation).await;

        assert_eq!(context.stage, Stage::Greeting);
        assert_eq!(context.user_turns_in_stage, 0);
        assert!(context.recent_messages.is_empty());
        assert_eq!(context.journal_entry_count, 0);
    }

    #[tokio::test]
    async fn counts_user_turns_since_stage_entry() {
        let (builder, conversations, _) = builder();
        let conversation = Conversation::start(user());
        conversations.create(&conversation).await.unwrap();

        conversations
            .append_message(conversation.id(), &Message::user("hi").unwrap())
            .await
            .unwrap();
        conversations
            .append_message(conversation.id(), &Message::assistant("Welcome.").unwrap())
            .await
            .unwrap();
        conversations
            .append_message(conversation.id(), &Message::user("ready").unwrap())
            .await
            .unwrap();

        let context = builder.build(&conversation).await;
        assert_eq!(context.user_turns_in_stage, 2);
        assert_eq!(context.recent_messages.len(), 3);
    }

    #[tokio::test]
    async fn includes_recent_check_ins() {
        let (builder, conversations, check_ins) = builder();
        let conversation = Conversation::start(user());
        conversations.create(&conversation).await.unwrap();

        let check_in = CheckIn::create(
            user(),
            "calm",
            ScaleScore::Good,
            ScaleScore::Okay,
            None,
            None,
        )
        .unwrap();
        check_ins.create(&check_in).await.unwrap();

        let context = builder.build(&conversation).await;
        assert_eq!(context.recent_check_ins.len(), 1);
        assert_eq!(context.latest_check_in().unwrap().mood(), "calm");
    }
}
