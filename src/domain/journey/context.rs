//! Conversation context snapshot.
//!
//! An immutable, per-decision view of one user's recent activity. Built
//! fresh at each decision point and treated as a value by every consumer;
//! nothing here touches storage.

use crate::domain::conversation::Message;
use crate::domain::wellness::{CheckIn, Milestone};

use super::Stage;

/// Snapshot of everything the per-turn decisions need to know.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    /// Stage the conversation was in when the snapshot was taken.
    pub stage: Stage,
    /// User turns since the current stage was entered.
    pub user_turns_in_stage: usize,
    /// Most recent messages, oldest first (bounded window).
    pub recent_messages: Vec<Message>,
    /// Most recent check-ins, newest first (bounded window).
    pub recent_check_ins: Vec<CheckIn>,
    /// Most recent milestones, newest first (bounded window).
    pub recent_milestones: Vec<Milestone>,
    /// Total journal entries the user has written.
    pub journal_entry_count: u64,
}

impl ConversationContext {
    /// An empty snapshot for a conversation with no history yet.
    pub fn empty(stage: Stage) -> Self {
        Self {
            stage,
            user_turns_in_stage: 0,
            recent_messages: Vec::new(),
            recent_check_ins: Vec::new(),
            recent_milestones: Vec::new(),
            journal_entry_count: 0,
        }
    }

    /// The most recent check-in, if any.
    pub fn latest_check_in(&self) -> Option<&CheckIn> {
        self.recent_check_ins.first()
    }

    /// Messages sent by the user, oldest first.
    pub fn user_messages(&self) -> impl Iterator<Item = &Message> {
        self.recent_messages.iter().filter(|m| m.is_from_user())
    }

    /// Returns true if the user has any unlocked milestone in view.
    pub fn has_milestones(&self) -> bool {
        !self.recent_milestones.is_empty()
    }

    /// Renders the recent exchange as a plain transcript for prompts.
    pub fn transcript(&self) -> String {
        self.recent_messages
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
