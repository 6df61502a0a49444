//! Wire types for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::domain::journey::{Stage, SuggestedReply};
use crate::domain::wellness::{CheckIn, JournalEntry, Milestone};

/// Body of `POST /api/companion/turn`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnBody {
    /// Omitted on the first turn.
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
}

/// Response of `GET /api/companion/state`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub conversation_id: Option<String>,
    pub stage: Stage,
    pub suggestions: Vec<SuggestedReply>,
}

/// Body of `POST /api/check-ins`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInBody {
    pub mood: String,
    pub sleep_quality: i16,
    pub energy_level: i16,
    #[serde(default)]
    pub intentions: Option<String>,
}

/// A check-in as returned over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInView {
    pub id: String,
    pub mood: String,
    pub sleep_quality: i16,
    pub energy_level: i16,
    pub intentions: String,
    pub created_at: String,
}

impl CheckInView {
    pub fn from_domain(check_in: &CheckIn) -> Self {
        Self {
            id: check_in.id().to_string(),
            mood: check_in.mood().to_string(),
            sleep_quality: check_in.sleep_quality().value(),
            energy_level: check_in.energy_level().value(),
            intentions: check_in.intentions().to_string(),
            created_at: check_in.created_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Body of `POST /api/journal-entries`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalBody {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
}

/// A journal entry as returned over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryView {
    pub id: String,
    pub title: Option<String>,
    pub content: String,
    pub word_count: u32,
    pub created_at: String,
}

impl JournalEntryView {
    pub fn from_domain(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            title: entry.title().map(str::to_string),
            content: entry.content().to_string(),
            word_count: entry.word_count(),
            created_at: entry.created_at().as_datetime().to_rfc3339(),
        }
    }
}

/// A milestone as returned over the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    pub id: String,
    #[serde(rename = "type")]
    pub milestone_type: String,
    pub name: String,
    pub description: String,
    pub progress: u8,
    pub unlocked: bool,
    pub unlocked_at: Option<String>,
}

impl MilestoneView {
    pub fn from_domain(milestone: &Milestone) -> Self {
        Self {
            id: milestone.id().to_string(),
            milestone_type: milestone.milestone_type().key().to_string(),
            name: milestone.name().to_string(),
            description: milestone.description().to_string(),
            progress: milestone.progress().value(),
            unlocked: milestone.is_unlocked(),
            unlocked_at: milestone
                .unlocked_at()
                .map(|t| t.as_datetime().to_rfc3339()),
        }
    }
}

/// Query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ListParams {
    /// Effective limit, defaulted and capped.
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(20).min(100)
    }
}

/// Error body returned by all endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
