//! Application layer - per-turn orchestration over the domain and ports.

mod achievements;
mod context_builder;
mod extraction;
mod transition_detector;
mod turn;

pub use achievements::AchievementEngine;
pub use context_builder::{
    ContextBuilder, RECENT_CHECK_IN_LIMIT, RECENT_MESSAGE_LIMIT, RECENT_MILESTONE_LIMIT,
};
pub use extraction::{CheckInExtractor, ExtractionError, JournalExtractor, CONFIDENCE_THRESHOLD};
pub use transition_detector::TransitionDetector;
pub use turn::{CompanionState, TurnError, TurnEvent, TurnProcessor, TurnRequest};
