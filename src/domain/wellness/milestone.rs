//! Milestone records and the auto-grant threshold table.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MilestoneId, Percentage, Timestamp, UserId};

/// Stable milestone type keys.
///
/// The key is the idempotency anchor: a user holds at most one milestone per
/// type, enforced by a uniqueness constraint in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneType {
    FirstCheckIn,
    CheckInStreak7,
    CheckInStreak30,
    FirstJournal,
    JournalEntries5,
    JournalEntries25,
}

impl MilestoneType {
    /// All auto-granted milestone types.
    pub const ALL: [MilestoneType; 6] = [
        MilestoneType::FirstCheckIn,
        MilestoneType::CheckInStreak7,
        MilestoneType::CheckInStreak30,
        MilestoneType::FirstJournal,
        MilestoneType::JournalEntries5,
        MilestoneType::JournalEntries25,
    ];

    /// Returns the stable string key used in persistence.
    pub fn key(&self) -> &'static str {
        match self {
            MilestoneType::FirstCheckIn => "first_check_in",
            MilestoneType::CheckInStreak7 => "check_in_streak_7",
            MilestoneType::CheckInStreak30 => "check_in_streak_30",
            MilestoneType::FirstJournal => "first_journal",
            MilestoneType::JournalEntries5 => "journal_entries_5",
            MilestoneType::JournalEntries25 => "journal_entries_25",
        }
    }

    /// Parses a milestone type from its persistence key.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == s)
    }

    /// Display name shown to the user.
    pub fn display_name(&self) -> &'static str {
        match self {
            MilestoneType::FirstCheckIn => "First Check-in",
            MilestoneType::CheckInStreak7 => "One Week Strong",
            MilestoneType::CheckInStreak30 => "Thirty Days Steady",
            MilestoneType::FirstJournal => "First Journal Entry",
            MilestoneType::JournalEntries5 => "Five Reflections",
            MilestoneType::JournalEntries25 => "Twenty-five Reflections",
        }
    }

    /// Description shown to the user.
    pub fn description(&self) -> &'static str {
        match self {
            MilestoneType::FirstCheckIn => "Completed your first daily check-in",
            MilestoneType::CheckInStreak7 => "Checked in seven days in a row",
            MilestoneType::CheckInStreak30 => "Checked in thirty days in a row",
            MilestoneType::FirstJournal => "Wrote your first journal entry",
            MilestoneType::JournalEntries5 => "Wrote five journal entries",
            MilestoneType::JournalEntries25 => "Wrote twenty-five journal entries",
        }
    }

    /// Whether the threshold is crossed for the given derived metrics.
    pub fn is_met(&self, check_in_streak: u32, journal_count: u64) -> bool {
        match self {
            MilestoneType::FirstCheckIn => check_in_streak >= 1,
            MilestoneType::CheckInStreak7 => check_in_streak >= 7,
            MilestoneType::CheckInStreak30 => check_in_streak >= 30,
            MilestoneType::FirstJournal => journal_count >= 1,
            MilestoneType::JournalEntries5 => journal_count >= 5,
            MilestoneType::JournalEntries25 => journal_count >= 25,
        }
    }
}

/// A gamification record for one crossed threshold.
///
/// Invariant: `unlocked` implies `progress == 100` and `unlocked_at` is set.
/// Progress may reach 100 before the unlock step runs, briefly; the converse
/// is never violated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    id: MilestoneId,
    user_id: UserId,
    milestone_type: MilestoneType,
    name: String,
    description: String,
    progress: Percentage,
    unlocked: bool,
    unlocked_at: Option<Timestamp>,
    created_at: Timestamp,
}

impl Milestone {
    /// Creates a milestone already unlocked at full progress.
    ///
    /// Auto-granted milestones are only created once their threshold is
    /// crossed, so they are born complete.
    pub fn unlocked_now(user_id: UserId, milestone_type: MilestoneType) -> Self {
        let now = Timestamp::now();
        Self {
            id: MilestoneId::new(),
            user_id,
            milestone_type,
            name: milestone_type.display_name().to_string(),
            description: milestone_type.description().to_string(),
            progress: Percentage::HUNDRED,
            unlocked: true,
            unlocked_at: Some(now),
            created_at: now,
        }
    }

    /// Creates a locked milestone at partial progress.
    pub fn in_progress(user_id: UserId, milestone_type: MilestoneType, progress: Percentage) -> Self {
        Self {
            id: MilestoneId::new(),
            user_id,
            milestone_type,
            name: milestone_type.display_name().to_string(),
            description: milestone_type.description().to_string(),
            progress,
            unlocked: false,
            unlocked_at: None,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstructs a milestone from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: MilestoneId,
        user_id: UserId,
        milestone_type: MilestoneType,
        name: String,
        description: String,
        progress: Percentage,
        unlocked: bool,
        unlocked_at: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            milestone_type,
            name,
            description,
            progress,
            unlocked,
            unlocked_at,
            created_at,
        }
    }

    /// Unlocks this milestone, establishing the full invariant.
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        self.progress = Percentage::HUNDRED;
        self.unlocked = true;
        self.unlocked_at = Some(Timestamp::now());
    }

    pub fn id(&self) -> MilestoneId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn milestone_type(&self) -> MilestoneType {
        self.milestone_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn progress(&self) -> Percentage {
        self.progress
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn unlocked_at(&self) -> Option<Timestamp> {
        self.unlocked_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
