//! Transition decision types.
//!
//! A decision is a tagged outcome rather than a bare boolean so callers can
//! distinguish "criteria not met" from "service unreachable" when reading
//! logs or metrics.

use serde::Serialize;
use std::fmt;

/// Why a transition decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionReason {
    /// The stage's minimum exchange count has not been reached; no service
    /// call was made.
    BelowMinimumExchanges { observed: usize, required: usize },

    /// Enough completion criteria were satisfied.
    CriteriaMet { satisfied: usize, required: usize },

    /// The criteria assessment ran but not enough were satisfied.
    CriteriaNotMet { satisfied: usize, required: usize },

    /// The assessment service failed; the decision fails safe to "hold".
    ServiceUnavailable { cause: String },
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionReason::BelowMinimumExchanges { observed, required } => {
                write!(f, "below minimum exchanges ({} of {})", observed, required)
            }
            TransitionReason::CriteriaMet { satisfied, required } => {
                write!(f, "criteria met ({} of {} required)", satisfied, required)
            }
            TransitionReason::CriteriaNotMet { satisfied, required } => {
                write!(f, "criteria not met ({} of {} required)", satisfied, required)
            }
            TransitionReason::ServiceUnavailable { cause } => {
                write!(f, "assessment unavailable: {}", cause)
            }
        }
    }
}

/// Outcome of a transition check for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionDecision {
    /// Whether the conversation should advance to the next stage.
    pub advance: bool,
    /// The rationale behind the decision.
    pub reason: TransitionReason,
}

impl TransitionDecision {
    /// Decision to advance to the next stage.
    pub fn advance(reason: TransitionReason) -> Self {
        Self {
            advance: true,
            reason,
        }
    }

    /// Decision to stay in the current stage.
    pub fn hold(reason: TransitionReason) -> Self {
        Self {
            advance: false,
            reason,
        }
    }

    /// Returns true if the decision was forced by a service failure rather
    /// than by the criteria themselves.
    pub fn is_degraded(&self) -> bool {
        matches!(self.reason, TransitionReason::ServiceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_below_minimum_is_not_degraded() {
        let decision = TransitionDecision::hold(TransitionReason::BelowMinimumExchanges {
            observed: 0,
            required: 2,
        });
        assert!(!decision.advance);
        assert!(!decision.is_degraded());
    }

    #[test]
    fn service_failure_is_degraded() {
        let decision = TransitionDecision::hold(TransitionReason::ServiceUnavailable {
            cause: "timeout".to_string(),
        });
        assert!(decision.is_degraded());
    }

    #[test]
    fn reasons_display_their_rationale() {
        let reason = TransitionReason::CriteriaMet {
            satisfied: 3,
            required: 2,
        };
        assert_eq!(reason.to_string(), "criteria met (3 of 2 required)");

        let reason = TransitionReason::BelowMinimumExchanges {
            observed: 1,
            required: 2,
        };
        assert_eq!(reason.to_string(), "below minimum exchanges (1 of 2)");
    }

    #[test]
    fn reason_serializes_with_kind_tag() {
        let reason = TransitionReason::ServiceUnavailable {
            cause: "down".to_string(),
        };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["kind"], "service_unavailable");
        assert_eq!(json["cause"], "down");
    }
}
