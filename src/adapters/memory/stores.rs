//! Mutex-guarded in-memory implementations of the store ports.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, Timestamp, UserId};
use crate::domain::journey::Stage;
use crate::domain::wellness::{CheckIn, JournalEntry, Milestone, MilestoneType};
use crate::ports::{
    CheckInStore, ConversationStore, JournalStore, MilestoneStore, StoreError,
};

// ─── Conversations ─────────────────────────────────────────────────────────

/// In-memory conversation and message store.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<Vec<(ConversationId, Message)>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.conversations.lock().unwrap().push(conversation.clone());
        Ok(())
    }

    async fn find_latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.lock().unwrap();
        Ok(conversations
            .iter()
            .filter(|c| c.user_id() == user_id)
            .max_by_key(|c| c.updated_at())
            .cloned())
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.lock().unwrap();
        Ok(conversations
            .iter()
            .find(|c| c.id() == id && c.user_id() == user_id)
            .cloned())
    }

    async fn update_title(
        &self,
        user_id: &UserId,
        id: ConversationId,
        title: &str,
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.lock().unwrap();
        let found = conversations
            .iter_mut()
            .find(|c| c.id() == id && c.user_id() == user_id)
            .ok_or(StoreError::NotFound)?;
        *found = Conversation::from_parts(
            found.id(),
            found.user_id().clone(),
            title.to_string(),
            found.stage(),
            found.stage_entered_at(),
            found.created_at(),
            Timestamp::now(),
        );
        Ok(())
    }

    async fn commit_stage(
        &self,
        user_id: &UserId,
        id: ConversationId,
        stage: Stage,
        entered_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.lock().unwrap();
        let found = conversations
            .iter_mut()
            .find(|c| c.id() == id && c.user_id() == user_id)
            .ok_or(StoreError::NotFound)?;
        *found = Conversation::from_parts(
            found.id(),
            found.user_id().clone(),
            found.title().to_string(),
            stage,
            entered_at,
            found.created_at(),
            Timestamp::now(),
        );
        Ok(())
    }

    async fn append_message(
        &self,
        conversation_id: ConversationId,
        message: &Message,
    ) -> Result<(), StoreError> {
        self.messages
            .lock()
            .unwrap()
            .push((conversation_id, message.clone()));
        Ok(())
    }

    async fn recent_messages(
        &self,
        conversation_id: ConversationId,
        limit: u32,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().unwrap();
        let mut recent: Vec<Message> = messages
            .iter()
            .filter(|(id, _)| *id == conversation_id)
            .map(|(_, m)| m.clone())
            .collect();
        recent.sort_by_key(|m| m.created_at);
        let skip = recent.len().saturating_sub(limit as usize);
        Ok(recent.into_iter().skip(skip).collect())
    }
}

// ─── Check-ins ─────────────────────────────────────────────────────────────

/// In-memory check-in store.
#[derive(Default)]
pub struct InMemoryCheckInStore {
    check_ins: Mutex<Vec<CheckIn>>,
}

impl InMemoryCheckInStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: inserts a check-in with an overridden creation time.
    pub async fn create_at(&self, check_in: &CheckIn, created_at: Timestamp) {
        let backdated = CheckIn::from_parts(
            check_in.id(),
            check_in.user_id().clone(),
            check_in.mood().to_string(),
            check_in.sleep_quality(),
            check_in.energy_level(),
            check_in.intentions().to_string(),
            check_in.source_message_id(),
            created_at,
        );
        self.check_ins.lock().unwrap().push(backdated);
    }
}

#[async_trait]
impl CheckInStore for InMemoryCheckInStore {
    async fn create(&self, check_in: &CheckIn) -> Result<bool, StoreError> {
        let mut check_ins = self.check_ins.lock().unwrap();
        if let Some(source) = check_in.source_message_id() {
            let duplicate = check_ins
                .iter()
                .any(|c| c.user_id() == check_in.user_id() && c.source_message_id() == Some(source));
            if duplicate {
                return Ok(false);
            }
        }
        check_ins.push(check_in.clone());
        Ok(true)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<CheckIn>, StoreError> {
        let check_ins = self.check_ins.lock().unwrap();
        let mut recent: Vec<CheckIn> = check_ins
            .iter()
            .filter(|c| c.user_id() == user_id)
            .cloned()
            .collect();
        recent.sort_by_key(|c| std::cmp::Reverse(c.created_at()));
        recent.truncate(limit as usize);
        Ok(recent)
    }

    async fn activity_dates(&self, user_id: &UserId) -> Result<Vec<NaiveDate>, StoreError> {
        let check_ins = self.check_ins.lock().unwrap();
        let mut dates: Vec<NaiveDate> = check_ins
            .iter()
            .filter(|c| c.user_id() == user_id)
            .map(|c| c.created_at().calendar_date())
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }
}

// ─── Journal entries ───────────────────────────────────────────────────────

/// In-memory journal store.
#[derive(Default)]
pub struct InMemoryJournalStore {
    entries: Mutex<Vec<JournalEntry>>,
}

impl InMemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for InMemoryJournalStore {
    async fn create(&self, entry: &JournalEntry) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(source) = entry.source_message_id() {
            let duplicate = entries
                .iter()
                .any(|e| e.user_id() == entry.user_id() && e.source_message_id() == Some(source));
            if duplicate {
                return Ok(false);
            }
        }
        entries.push(entry.clone());
        Ok(true)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let entries = self.entries.lock().unwrap();
        let mut recent: Vec<JournalEntry> = entries
            .iter()
            .filter(|e| e.user_id() == user_id)
            .cloned()
            .collect();
        recent.sort_by_key(|e| std::cmp::Reverse(e.created_at()));
        recent.truncate(limit as usize);
        Ok(recent)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().filter(|e| e.user_id() == user_id).count() as u64)
    }
}

// ─── Milestones ────────────────────────────────────────────────────────────

/// In-memory milestone store.
#[derive(Default)]
pub struct InMemoryMilestoneStore {
    milestones: Mutex<Vec<Milestone>>,
}

impl InMemoryMilestoneStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MilestoneStore for InMemoryMilestoneStore {
    async fn create_if_absent(&self, milestone: &Milestone) -> Result<bool, StoreError> {
        // One lock held across check and insert stands in for the database
        // uniqueness constraint.
        let mut milestones = self.milestones.lock().unwrap();
        let held = milestones.iter().any(|m| {
            m.user_id() == milestone.user_id() && m.milestone_type() == milestone.milestone_type()
        });
        if held {
            return Ok(false);
        }
        milestones.push(milestone.clone());
        Ok(true)
    }

    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Milestone>, StoreError> {
        let milestones = self.milestones.lock().unwrap();
        let mut recent: Vec<Milestone> = milestones
            .iter()
            .filter(|m| m.user_id() == user_id)
            .cloned()
            .collect();
        recent.sort_by_key(|m| std::cmp::Reverse(m.created_at()));
        recent.truncate(limit as usize);
        Ok(recent)
    }

    async fn existing_types(
        &self,
        user_id: &UserId,
    ) -> Result<HashSet<MilestoneType>, StoreError> {
        let milestones = self.milestones.lock().unwrap();
        Ok(milestones
            .iter()
            .filter(|m| m.user_id() == user_id)
            .map(|m| m.milestone_type())
            .collect())
    }
}
