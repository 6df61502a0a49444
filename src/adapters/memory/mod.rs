//! In-memory store adapters.
//!
//! Back the store ports with mutex-guarded vectors so the engine can be
//! exercised without a database. Uniqueness rules mirror the Postgres
//! constraints: one extracted record per source message, one milestone per
//! `(user, type)`.

mod stores;

pub use stores::{
    InMemoryCheckInStore, InMemoryConversationStore, InMemoryJournalStore, InMemoryMilestoneStore,
};
