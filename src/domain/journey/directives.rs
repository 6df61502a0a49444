//! Prompt shaping for the reply-generation call.
//!
//! Each stage contributes guidance text plus contextual facts drawn from the
//! context snapshot. The result is merged into the generation request's
//! system prompt; nothing here mutates persisted state.

use super::{ConversationContext, Stage};

/// Base persona shared by every stage.
const PERSONA: &str = "You are a warm, steady recovery companion. Keep replies \
short, concrete, and free of clinical jargon. Never diagnose. Ask one \
question at a time.";

/// Stage-specific guidance plus contextual facts for the generation request.
#[derive(Debug, Clone)]
pub struct PromptDirectives {
    /// What the companion should be doing in this stage.
    pub guidance: &'static str,
    /// Facts about the user pulled from the context snapshot.
    pub contextual_facts: Vec<String>,
}

impl PromptDirectives {
    /// Renders the full system prompt for the generation call.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("{}\n\nCurrent focus: {}", PERSONA, self.guidance);
        if !self.contextual_facts.is_empty() {
            prompt.push_str("\n\nWhat you know about the user:");
            for fact in &self.contextual_facts {
                prompt.push_str("\n- ");
                prompt.push_str(fact);
            }
        }
        prompt
    }
}

/// Builds the directives for a stage from the current context snapshot.
pub fn directives_for(stage: Stage, context: &ConversationContext) -> PromptDirectives {
    PromptDirectives {
        guidance: guidance_for(stage),
        contextual_facts: facts_for(stage, context),
    }
}

fn guidance_for(stage: Stage) -> &'static str {
    match stage {
        Stage::Greeting => {
            "Welcome the user by name if known, set a gentle tone, and ask \
             how they are arriving today. Keep it brief."
        }
        Stage::CheckIn => {
            "Walk through today's check-in: mood, how they slept, energy \
             level, and one intention for the day. Gather what's missing \
             without interrogating."
        }
        Stage::JournalPrompt => {
            "Invite a short reflective journal entry about something on \
             their mind. Offer a concrete prompt if they seem stuck. \
             Accept a decline gracefully."
        }
        Stage::Affirmation => {
            "Offer one specific, earned affirmation rooted in what the user \
             actually shared today. Avoid generic praise."
        }
        Stage::Reflection => {
            "Look back over the recent days together: what helped, what got \
             in the way, and how they feel about the trend."
        }
        Stage::MilestoneReview => {
            "Review progress and celebrate any unlocked milestones. If \
             there are none yet, point at the nearest one ahead."
        }
    }
}

fn facts_for(stage: Stage, context: &ConversationContext) -> Vec<String> {
    let mut facts = Vec::new();

    if context.journal_entry_count > 0 {
        facts.push(format!(
            "They have written {} journal entr{}.",
            context.journal_entry_count,
            if context.journal_entry_count == 1 { "y" } else { "ies" }
        ));
    }

    if let Some(check_in) = context.latest_check_in() {
        facts.push(format!(
            "Last check-in: mood \"{}\", sleep {}, energy {}.",
            check_in.mood(),
            check_in.sleep_quality(),
            check_in.energy_level()
        ));
        if stage == Stage::Affirmation || stage == Stage::Reflection {
            facts.push(format!("Their stated intention was: {}.", check_in.intentions()));
        }
    }

    if stage == Stage::MilestoneReview {
        if context.recent_milestones.is_empty() {
            facts.push("No milestones unlocked yet.".to_string());
        } else {
            let names: Vec<_> = context
                .recent_milestones
                .iter()
                .map(|m| m.name().to_string())
                .collect();
            facts.push(format!("Unlocked milestones: {}.", names.join(", ")));
        }
    }

    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ScaleScore, UserId};
    use crate::domain::wellness::{CheckIn, Milestone, MilestoneType};

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn context_with_history() -> ConversationContext {
        let mut context = ConversationContext::empty(Stage::CheckIn);
        context.journal_entry_count = 3;
        context.recent_check_ins = vec![CheckIn::create(
            user(),
            "calm",
            ScaleScore::Great,
            ScaleScore::Poor,
            Some("stay focused".to_string()),
            None,
        )
        .unwrap()];
        context
    }

    #[test]
    fn system_prompt_contains_persona_and_guidance() {
        let context = ConversationContext::empty(Stage::Greeting);
        let directives = directives_for(Stage::Greeting, &context);
        let prompt = directives.system_prompt();
        assert!(prompt.contains("recovery companion"));
        assert!(prompt.contains("Welcome the user"));
    }

    #[test]
    fn empty_context_produces_no_facts() {
        let context = ConversationContext::empty(Stage::Greeting);
        let directives = directives_for(Stage::Greeting, &context);
        assert!(directives.contextual_facts.is_empty());
        assert!(!directives.system_prompt().contains("What you know"));
    }

    #[test]
    fn journal_count_and_last_check_in_become_facts() {
        let directives = directives_for(Stage::CheckIn, &context_with_history());
        let facts = directives.contextual_facts.join(" ");
        assert!(facts.contains("3 journal entries"));
        assert!(facts.contains("mood \"calm\""));
        assert!(facts.contains("sleep 5/5"));
    }

    #[test]
    fn affirmation_stage_surfaces_the_stated_intention() {
        let directives = directives_for(Stage::Affirmation, &context_with_history());
        let facts = directives.contextual_facts.join(" ");
        assert!(facts.contains("stay focused"));
    }

    #[test]
    fn milestone_review_reports_absence_of_milestones() {
        let context = ConversationContext::empty(Stage::MilestoneReview);
        let directives = directives_for(Stage::MilestoneReview, &context);
        let facts = directives.contextual_facts.join(" ");
        assert!(facts.contains("No milestones unlocked yet"));
    }

    #[test]
    fn milestone_review_lists_unlocked_names() {
        let mut context = ConversationContext::empty(Stage::MilestoneReview);
        context.recent_milestones =
            vec![Milestone::unlocked_now(user(), MilestoneType::CheckInStreak7)];
        let directives = directives_for(Stage::MilestoneReview, &context);
        let facts = directives.contextual_facts.join(" ");
        assert!(facts.contains("One Week Strong"));
    }
}
