//! Transition detector.
//!
//! Decides, after each exchange, whether the conversation has completed its
//! current stage. Below the stage's minimum exchange count the decision
//! short-circuits without a service call. Otherwise one structured
//! extraction assesses the stage's completion criteria against the recent
//! transcript. A failed or malformed assessment always fails safe to "hold":
//! under-transitioning degrades UX gracefully, over-transitioning corrupts
//! state.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::conversation::Message;
use crate::domain::journey::{Stage, TransitionDecision, TransitionReason};
use crate::ports::{AiProvider, ExtractionRequest};

/// Detects stage completion via AI-assessed criteria.
#[derive(Clone)]
pub struct TransitionDetector {
    provider: Arc<dyn AiProvider>,
}

/// Strict decode target for the criteria assessment.
///
/// Unknown-shape responses are rejected rather than coerced; a rejected
/// response is a service failure and the decision holds.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CriteriaAssessment {
    criteria: Vec<CriterionVerdict>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CriterionVerdict {
    #[allow(dead_code)]
    description: String,
    satisfied: bool,
}

impl TransitionDetector {
    /// Creates a detector over the given provider.
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self { provider }
    }

    /// Decides whether the conversation should leave `stage`.
    pub async fn should_transition(
        &self,
        stage: Stage,
        recent_messages: &[Message],
        user_turns_in_stage: usize,
    ) -> TransitionDecision {
        let required_turns = stage.min_user_turns();
        if user_turns_in_stage < required_turns {
            return TransitionDecision::hold(TransitionReason::BelowMinimumExchanges {
                observed: user_turns_in_stage,
                required: required_turns,
            });
        }

        let request = ExtractionRequest::new(
            assessment_prompt(stage, recent_messages),
            assessment_schema(stage),
        );

        let value = match self.provider.extract_structured(request).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(stage = stage.as_str(), error = %e, "criteria assessment failed");
                return TransitionDecision::hold(TransitionReason::ServiceUnavailable {
                    cause: e.to_string(),
                });
            }
        };

        let assessment: CriteriaAssessment = match serde_json::from_value(value) {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::warn!(stage = stage.as_str(), error = %e, "criteria assessment malformed");
                return TransitionDecision::hold(TransitionReason::ServiceUnavailable {
                    cause: format!("malformed assessment: {}", e),
                });
            }
        };

        let satisfied = assessment.criteria.iter().filter(|c| c.satisfied).count();
        let required = stage.required_criteria();
        if satisfied >= required {
            TransitionDecision::advance(TransitionReason::CriteriaMet {
                satisfied,
                required,
            })
        } else {
            TransitionDecision::hold(TransitionReason::CriteriaNotMet {
                satisfied,
                required,
            })
        }
    }
}

fn assessment_prompt(stage: Stage, recent_messages: &[Message]) -> String {
    let transcript = recent_messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let criteria = stage
        .completion_criteria()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are assessing whether a companion conversation has completed its \
         '{}' stage.\n\nCompletion criteria:\n{}\n\nRecent \
         transcript:\n{}\n\nFor each criterion, report whether the transcript \
         satisfies it. Judge only what the user actually said.",
        stage.label(),
        criteria,
        transcript
    )
}

fn assessment_schema(stage: Stage) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["criteria"],
        "properties": {
            "criteria": {
                "type": "array",
                "minItems": stage.completion_criteria().len(),
                "maxItems": stage.completion_criteria().len(),
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["description", "satisfied"],
                    "properties": {
                        "description": { "type": "string" },
                        "satisfied": { "type": "boolean" }
                    }
                }
            }
        }
    })
}
