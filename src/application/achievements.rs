//! Achievement engine.
//!
//! Re-derives streaks and entry counts from stored history and grants
//! milestones whose thresholds were crossed. Idempotent under concurrent
//! invocation: the milestone store's `(user, type)` uniqueness constraint is
//! the guard, not the pre-read.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::wellness::{current_streak, Milestone, MilestoneType};
use crate::ports::{CheckInStore, JournalStore, MilestoneStore, StoreError};

/// Derives and grants auto-unlocked milestones.
#[derive(Clone)]
pub struct AchievementEngine {
    check_ins: Arc<dyn CheckInStore>,
    journals: Arc<dyn JournalStore>,
    milestones: Arc<dyn MilestoneStore>,
}

impl AchievementEngine {
    /// Creates an engine over the given stores.
    pub fn new(
        check_ins: Arc<dyn CheckInStore>,
        journals: Arc<dyn JournalStore>,
        milestones: Arc<dyn MilestoneStore>,
    ) -> Self {
        Self {
            check_ins,
            journals,
            milestones,
        }
    }

    /// Checks all thresholds for the user and creates any missing crossed
    /// milestones, already unlocked at full progress.
    ///
    /// Returns the milestones newly created by this invocation.
    pub async fn check_and_create(&self, user_id: &UserId) -> Result<Vec<Milestone>, StoreError> {
        let dates = self.check_ins.activity_dates(user_id).await?;
        let streak = current_streak(&dates);
        let journal_count = self.journals.count_for_user(user_id).await?;

        // The pre-read only trims the candidate list; the store's constraint
        // settles races between concurrent turns.
        let existing = self.milestones.existing_types(user_id).await?;

        let mut created = Vec::new();
        for milestone_type in MilestoneType::ALL {
            if existing.contains(&milestone_type) {
                continue;
            }
            if !milestone_type.is_met(streak, journal_count) {
                continue;
            }
            let milestone = Milestone::unlocked_now(user_id.clone(), milestone_type);
            if self.milestones.create_if_absent(&milestone).await? {
                tracing::info!(
                    user = %user_id,
                    milestone = milestone_type.key(),
                    "milestone unlocked"
                );
                created.push(milestone);
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCheckInStore, InMemoryJournalStore, InMemoryMilestoneStore,
    };
    use crate::domain::foundation::{ScaleScore, Timestamp, UserId};
    use crate::domain::wellness::{CheckIn, JournalEntry};

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn engine() -> (
        AchievementEngine,
        Arc<InMemoryCheckInStore>,
        Arc<InMemoryJournalStore>,
        Arc<InMemoryMilestoneStore>,
    ) {
        let check_ins = Arc::new(InMemoryCheckInStore::new());
        let journals = Arc::new(InMemoryJournalStore::new());
        let milestones = Arc::new(InMemoryMilestoneStore::new());
        let engine =
            AchievementEngine::new(check_ins.clone(), journals.clone(), milestones.clone());
        (engine, check_ins, journals, milestones)
    }

    async fn seed_check_in_days(store: &InMemoryCheckInStore, days_back: &[i64]) {
        for back in days_back {
            let check_in = CheckIn::create(
                user(),
                "steady",
                ScaleScore::Good,
                ScaleScore::Good,
                None,
                None,
            )
            .unwrap();
            store
                .create_at(&check_in, Timestamp::now().minus_days(*back))
                .await;
        }
    }

    #[tokio::test]
    async fn no_activity_grants_nothing() {
        let (engine, _, _, _) = engine();
        let created = engine.check_and_create(&user()).await.unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn first_check_in_unlocks_on_streak_of_one() {
        let (engine, check_ins, _, _) = engine();
        seed_check_in_days(&check_ins, &[0]).await;

        let created = engine.check_and_create(&user()).await.unwrap();
        let types: Vec<_> = created.iter().map(|m| m.milestone_type()).collect();
        assert_eq!(types, vec![MilestoneType::FirstCheckIn]);

        let milestone = &created[0];
        assert!(milestone.is_unlocked());
        assert!(milestone.progress().is_complete());
        assert!(milestone.unlocked_at().is_some());
    }

    #[tokio::test]
    async fn seven_consecutive_days_unlock_the_week_streak() {
        let (engine, check_ins, _, _) = engine();
        seed_check_in_days(&check_ins, &[0, 1, 2, 3, 4, 5, 6]).await;

        let created = engine.check_and_create(&user()).await.unwrap();
        let types: Vec<_> = created.iter().map(|m| m.milestone_type()).collect();
        assert!(types.contains(&MilestoneType::FirstCheckIn));
        assert!(types.contains(&MilestoneType::CheckInStreak7));
        assert!(!types.contains(&MilestoneType::CheckInStreak30));
    }

    #[tokio::test]
    async fn gapped_days_do_not_unlock_the_week_streak() {
        let (engine, check_ins, _, _) = engine();
        seed_check_in_days(&check_ins, &[0, 1, 2, 4, 5, 6, 7]).await;

        let created = engine.check_and_create(&user()).await.unwrap();
        let types: Vec<_> = created.iter().map(|m| m.milestone_type()).collect();
        assert!(!types.contains(&MilestoneType::CheckInStreak7));
    }

    #[tokio::test]
    async fn journal_milestones_track_entry_count() {
        let (engine, _, journals, _) = engine();
        for i in 0..5 {
            let entry = JournalEntry::create_direct(
                user(),
                None,
                format!("a reflection that is long enough, number {}", i),
            )
            .unwrap();
            journals.create(&entry).await.unwrap();
        }

        let created = engine.check_and_create(&user()).await.unwrap();
        let types: Vec<_> = created.iter().map(|m| m.milestone_type()).collect();
        assert!(types.contains(&MilestoneType::FirstJournal));
        assert!(types.contains(&MilestoneType::JournalEntries5));
        assert!(!types.contains(&MilestoneType::JournalEntries25));
    }

    #[tokio::test]
    async fn rapid_double_invocation_creates_each_type_once() {
        let (engine, check_ins, _, milestones) = engine();
        seed_check_in_days(&check_ins, &[0, 1, 2, 3, 4, 5, 6]).await;

        let u = user();
        let (first, second) = tokio::join!(
            engine.check_and_create(&u),
            engine.check_and_create(&u),
        );
        let total = first.unwrap().len() + second.unwrap().len();
        assert_eq!(total, 2); // first_check_in + check_in_streak_7, once each

        let held = milestones.existing_types(&user()).await.unwrap();
        assert_eq!(held.len(), 2);
    }

    #[tokio::test]
    async fn second_invocation_is_a_no_op() {
        let (engine, check_ins, _, _) = engine();
        seed_check_in_days(&check_ins, &[0]).await;

        let first = engine.check_and_create(&user()).await.unwrap();
        assert_eq!(first.len(), 1);
        let second = engine.check_and_create(&user()).await.unwrap();
        assert!(second.is_empty());
    }
}
