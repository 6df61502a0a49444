//! Conversation aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::domain::journey::Stage;

/// Maximum length of an auto-derived conversation title.
pub const TITLE_MAX_CHARS: usize = 48;

/// A user's ongoing companion conversation.
///
/// Created lazily on the first turn and never hard-deleted. The stage field
/// is mutated only through [`Conversation::advance_stage`]; message activity
/// refreshes the title and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    user_id: UserId,
    title: String,
    stage: Stage,
    stage_entered_at: Timestamp,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Starts a new conversation for a user at the initial stage.
    pub fn start(user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            user_id,
            title: "New conversation".to_string(),
            stage: Stage::Greeting,
            stage_entered_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a conversation from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: ConversationId,
        user_id: UserId,
        title: String,
        stage: Stage,
        stage_entered_at: Timestamp,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            stage,
            stage_entered_at,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// When the current stage was entered. User turns since this point count
    /// toward the stage's minimum-exchange rule.
    pub fn stage_entered_at(&self) -> Timestamp {
        self.stage_entered_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns true if no user message has renamed this conversation yet.
    pub fn has_default_title(&self) -> bool {
        self.title == "New conversation"
    }

    /// Derives the title from the first user message.
    pub fn title_from_message(&mut self, content: &str) {
        let trimmed = content.trim();
        let title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        self.title = if trimmed.chars().count() > TITLE_MAX_CHARS {
            format!("{}…", title)
        } else {
            title
        };
        self.updated_at = Timestamp::now();
    }

    /// Moves this conversation to the successor of its current stage.
    ///
    /// The only mutation path for the stage field. Callers must hold the
    /// turn's final transition decision before invoking; there is no undo.
    pub fn advance_stage(&mut self) -> Stage {
        self.stage = self.stage.next();
        let now = Timestamp::now();
        self.stage_entered_at = now;
        self.updated_at = now;
        self.stage
    }

    /// Marks message activity on this conversation.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn start_begins_at_greeting() {
        let conversation = Conversation::start(user());
        assert_eq!(conversation.stage(), Stage::Greeting);
        assert!(conversation.has_default_title());
    }

    #[test]
    fn advance_stage_follows_the_cycle() {
        let mut conversation = Conversation::start(user());
        assert_eq!(conversation.advance_stage(), Stage::CheckIn);
        assert_eq!(conversation.advance_stage(), Stage::JournalPrompt);
        assert_eq!(conversation.stage(), Stage::JournalPrompt);
    }

    #[test]
    fn advance_stage_resets_stage_entry_time() {
        let mut conversation = Conversation::start(user());
        let before = conversation.stage_entered_at();
        std::thread::sleep(std::time::Duration::from_millis(10));
        conversation.advance_stage();
        assert!(conversation.stage_entered_at().is_after(&before));
    }

    #[test]
    fn title_from_message_truncates_long_content() {
        let mut conversation = Conversation::start(user());
        conversation.title_from_message(&"a".repeat(100));
        assert_eq!(conversation.title().chars().count(), TITLE_MAX_CHARS + 1);
        assert!(conversation.title().ends_with('…'));
    }

    #[test]
    fn title_from_message_keeps_short_content_intact() {
        let mut conversation = Conversation::start(user());
        conversation.title_from_message("  morning check-in  ");
        assert_eq!(conversation.title(), "morning check-in");
        assert!(!conversation.has_default_title());
    }
}
