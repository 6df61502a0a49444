//! Wellness module - durable records derived from the dialogue.

mod check_in;
mod journal;
mod milestone;
mod streak;

pub use check_in::{CheckIn, DEFAULT_INTENTIONS};
pub use journal::{
    JournalEntry, JOURNAL_TITLE_MAX_CHARS, MIN_DIRECT_CONTENT_CHARS, MIN_EXTRACTED_CONTENT_CHARS,
    MIN_EXTRACTED_WORDS,
};
pub use milestone::{Milestone, MilestoneType};
pub use streak::current_streak;
