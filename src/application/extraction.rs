//! Extraction pipeline.
//!
//! Two independent extractors share one pattern: hand the recent user
//! messages to the structured-extraction service, strictly decode the
//! response, and persist at most one record per stage visit - only when the
//! sufficiency flag, the confidence gate, and the required fields all agree.
//! The confidence gate is AND'ed with sufficiency, never OR'ed.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::conversation::Message;
use crate::domain::foundation::{MessageId, UserId, ValidationError};
use crate::domain::wellness::{CheckIn, JournalEntry};
use crate::ports::{AiError, AiProvider, ExtractionRequest};

/// Minimum confidence score for a record to be persisted.
pub const CONFIDENCE_THRESHOLD: u8 = 70;

/// Errors from an extraction attempt.
///
/// All variants are recoverable at the turn level: the caller logs and
/// carries on without a record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The extraction service call failed.
    #[error("extraction service failed: {0}")]
    Service(#[from] AiError),

    /// The service answered with an unknown shape.
    #[error("malformed extraction response: {0}")]
    Malformed(String),

    /// Extracted values failed domain validation.
    #[error("extracted values invalid: {0}")]
    Validation(#[from] ValidationError),
}

/// The 1-5 mapping rubric handed to the extraction service. The pipeline
/// does no NLP mapping of its own.
const SCALE_RUBRIC: &str = "Map descriptive language onto a 1-5 scale: \
very poor -> 1, poor -> 2, okay -> 3, good -> 4, great -> 5. \
Use intermediate values only when the user is explicit.";

fn render_user_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.is_from_user())
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Check-in extractor ────────────────────────────────────────────────────

/// Strict decode target for check-in extraction.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckInExtraction {
    has_sufficient_data: bool,
    confidence: u8,
    mood: Option<String>,
    sleep_quality: Option<i16>,
    energy_level: Option<i16>,
    intentions: Option<String>,
}

static CHECK_IN_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["has_sufficient_data", "confidence"],
        "properties": {
            "has_sufficient_data": { "type": "boolean" },
            "confidence": { "type": "integer", "minimum": 0, "maximum": 100 },
            "mood": { "type": ["string", "null"] },
            "sleep_quality": { "type": ["integer", "null"], "minimum": 1, "maximum": 5 },
            "energy_level": { "type": ["integer", "null"], "minimum": 1, "maximum": 5 },
            "intentions": { "type": ["string", "null"] }
        }
    })
});

/// Extracts wellness check-ins from the recent exchange.
#[derive(Clone)]
pub struct CheckInExtractor {
    provider: Arc<dyn AiProvider>,
}

impl CheckInExtractor {
    /// Creates an extractor over the given provider.
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Attempts to extract a check-in from the recent user messages.
    ///
    /// Returns `Ok(None)` when the gate does not pass; `source_message_id`
    /// keys the store's duplicate guard under at-least-once processing.
    pub async fn try_extract(
        &self,
        user_id: &UserId,
        recent_messages: &[Message],
        source_message_id: MessageId,
    ) -> Result<Option<CheckIn>, ExtractionError> {
        let prompt = format!(
            "Extract today's wellness check-in from these user messages.\n\
             {}\n\nMessages:\n{}\n\nReport has_sufficient_data=true only when \
             mood, sleep, and energy are all present. Set confidence 0-100 \
             for how certain you are of the extracted values.",
            SCALE_RUBRIC,
            render_user_messages(recent_messages)
        );

        let value = self
            .provider
            .extract_structured(ExtractionRequest::new(prompt, CHECK_IN_SCHEMA.clone()))
            .await?;

        let extraction: CheckInExtraction =
            serde_json::from_value(value).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        if !extraction.has_sufficient_data || extraction.confidence < CONFIDENCE_THRESHOLD {
            tracing::debug!(
                user = %user_id,
                sufficient = extraction.has_sufficient_data,
                confidence = extraction.confidence,
                "check-in extraction below gate"
            );
            return Ok(None);
        }

        let (mood, sleep, energy) = match (
            extraction.mood,
            extraction.sleep_quality,
            extraction.energy_level,
        ) {
            (Some(mood), Some(sleep), Some(energy)) => (mood, sleep, energy),
            _ => {
                tracing::debug!(user = %user_id, "check-in extraction missing required fields");
                return Ok(None);
            }
        };

        let check_in = CheckIn::create_from_raw(
            user_id.clone(),
            mood,
            sleep,
            energy,
            extraction.intentions,
            Some(source_message_id),
        )?;
        Ok(Some(check_in))
    }
}

// ─── Journal extractor ─────────────────────────────────────────────────────

/// Strict decode target for journal extraction.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JournalExtraction {
    has_sufficient_data: bool,
    confidence: u8,
    declined: bool,
    title: Option<String>,
    content: Option<String>,
    insights: Option<serde_json::Value>,
}

static JOURNAL_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["has_sufficient_data", "confidence", "declined"],
        "properties": {
            "has_sufficient_data": { "type": "boolean" },
            "confidence": { "type": "integer", "minimum": 0, "maximum": 100 },
            "declined": { "type": "boolean" },
            "title": { "type": ["string", "null"], "maxLength": 120 },
            "content": { "type": ["string", "null"] },
            "insights": { "type": ["object", "null"] }
        }
    })
});

/// Extracts reflective journal entries from the recent exchange.
#[derive(Clone)]
pub struct JournalExtractor {
    provider: Arc<dyn AiProvider>,
}

impl JournalExtractor {
    /// Creates an extractor over the given provider.
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Attempts to extract a journal entry from the recent user messages.
    ///
    /// An explicit decline ("not now", "skip") yields no record. Content
    /// must clear the extraction-sourced minimums (50 characters, 10 words).
    pub async fn try_extract(
        &self,
        user_id: &UserId,
        recent_messages: &[Message],
        source_message_id: MessageId,
    ) -> Result<Option<JournalEntry>, ExtractionError> {
        let prompt = format!(
            "The user was invited to write a reflective journal entry. From \
             their messages below, extract the entry if they wrote one.\n\n\
             Messages:\n{}\n\nSet declined=true when the user put journaling \
             off (\"not now\", \"skip\", \"maybe later\"). Report \
             has_sufficient_data=true only for genuinely reflective, \
             introspective content. Generate a short title for the entry. Set \
             confidence 0-100.",
            render_user_messages(recent_messages)
        );

        let value = self
            .provider
            .extract_structured(ExtractionRequest::new(prompt, JOURNAL_SCHEMA.clone()))
            .await?;

        let extraction: JournalExtraction =
            serde_json::from_value(value).map_err(|e| ExtractionError::Malformed(e.to_string()))?;

        if extraction.declined {
            tracing::debug!(user = %user_id, "journal invitation declined");
            return Ok(None);
        }
        if !extraction.has_sufficient_data || extraction.confidence < CONFIDENCE_THRESHOLD {
            tracing::debug!(
                user = %user_id,
                sufficient = extraction.has_sufficient_data,
                confidence = extraction.confidence,
                "journal extraction below gate"
            );
            return Ok(None);
        }

        let content = match extraction.content {
            Some(content) => content,
            None => {
                tracing::debug!(user = %user_id, "journal extraction missing content");
                return Ok(None);
            }
        };

        let entry = JournalEntry::create_from_extraction(
            user_id.clone(),
            extraction.title,
            content,
            extraction.insights,
            source_message_id,
        )?;
        Ok(Some(entry))
    }
}
