//! Wellness check-in record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CheckInId, MessageId, ScaleScore, Timestamp, UserId, ValidationError};

/// Placeholder stored when the user states no explicit intention.
pub const DEFAULT_INTENTIONS: &str = "No specific intentions noted";

/// A daily wellness check-in.
///
/// Sleep and energy are validated into the 1-5 scale before construction;
/// there is no silent clamping path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    id: CheckInId,
    user_id: UserId,
    mood: String,
    sleep_quality: ScaleScore,
    energy_level: ScaleScore,
    intentions: String,
    /// User message this record was extracted from, when extraction-sourced.
    /// At-least-once turn processing dedupes on this key.
    source_message_id: Option<MessageId>,
    created_at: Timestamp,
}

impl CheckIn {
    /// Creates a validated check-in.
    pub fn create(
        user_id: UserId,
        mood: impl Into<String>,
        sleep_quality: ScaleScore,
        energy_level: ScaleScore,
        intentions: Option<String>,
        source_message_id: Option<MessageId>,
    ) -> Result<Self, ValidationError> {
        let mood = mood.into();
        if mood.trim().is_empty() {
            return Err(ValidationError::empty_field("mood"));
        }
        let intentions = match intentions {
            Some(text) if !text.trim().is_empty() => text,
            _ => DEFAULT_INTENTIONS.to_string(),
        };
        Ok(Self {
            id: CheckInId::new(),
            user_id,
            mood,
            sleep_quality,
            energy_level,
            intentions,
            source_message_id,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a check-in from raw numeric scores, validating the range.
    pub fn create_from_raw(
        user_id: UserId,
        mood: impl Into<String>,
        sleep_quality: i16,
        energy_level: i16,
        intentions: Option<String>,
        source_message_id: Option<MessageId>,
    ) -> Result<Self, ValidationError> {
        let sleep = ScaleScore::try_from_i16(sleep_quality)?;
        let energy = ScaleScore::try_from_i16(energy_level)?;
        Self::create(user_id, mood, sleep, energy, intentions, source_message_id)
    }

    /// Reconstructs a check-in from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: CheckInId,
        user_id: UserId,
        mood: String,
        sleep_quality: ScaleScore,
        energy_level: ScaleScore,
        intentions: String,
        source_message_id: Option<MessageId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            mood,
            sleep_quality,
            energy_level,
            intentions,
            source_message_id,
            created_at,
        }
    }

    pub fn id(&self) -> CheckInId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn sleep_quality(&self) -> ScaleScore {
        self.sleep_quality
    }

    pub fn energy_level(&self) -> ScaleScore {
        self.energy_level
    }

    pub fn intentions(&self) -> &str {
        &self.intentions
    }

    pub fn source_message_id(&self) -> Option<MessageId> {
        self.source_message_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn creates_valid_check_in() {
        let check_in = CheckIn::create(
            user(),
            "calm",
            ScaleScore::Great,
            ScaleScore::Poor,
            Some("stay focused".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(check_in.mood(), "calm");
        assert_eq!(check_in.sleep_quality().value(), 5);
        assert_eq!(check_in.energy_level().value(), 2);
        assert_eq!(check_in.intentions(), "stay focused");
    }

    #[test]
    fn missing_intentions_defaults_to_placeholder() {
        let check_in = CheckIn::create(
            user(),
            "okay",
            ScaleScore::Okay,
            ScaleScore::Okay,
            None,
            None,
        )
        .unwrap();
        assert_eq!(check_in.intentions(), DEFAULT_INTENTIONS);
    }

    #[test]
    fn blank_intentions_default_to_placeholder() {
        let check_in = CheckIn::create(
            user(),
            "okay",
            ScaleScore::Okay,
            ScaleScore::Okay,
            Some("   ".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(check_in.intentions(), DEFAULT_INTENTIONS);
    }

    #[test]
    fn rejects_empty_mood() {
        let result = CheckIn::create(
            user(),
            "  ",
            ScaleScore::Okay,
            ScaleScore::Okay,
            None,
            None,
        );
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn create_from_raw_accepts_full_range() {
        for value in 1..=5 {
            let result =
                CheckIn::create_from_raw(user(), "fine", value, value, None, None);
            assert!(result.is_ok(), "score {} should be valid", value);
        }
    }

    #[test]
    fn create_from_raw_rejects_out_of_range_scores() {
        for value in [0, 6, -1, 100] {
            let result = CheckIn::create_from_raw(user(), "fine", value, 3, None, None);
            assert!(
                matches!(result, Err(ValidationError::OutOfRange { .. })),
                "score {} should be rejected",
                value
            );
        }
    }

    #[test]
    fn carries_extraction_source_when_present() {
        let source = MessageId::new();
        let check_in = CheckIn::create(
            user(),
            "calm",
            ScaleScore::Good,
            ScaleScore::Good,
            None,
            Some(source),
        )
        .unwrap();
        assert_eq!(check_in.source_message_id(), Some(source));
    }
}
