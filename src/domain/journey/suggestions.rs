//! Suggested-reply generation.
//!
//! A pure function of (stage, context): the quick-reply affordances the UI
//! shows must track what the dialogue is currently asking. No I/O.

use serde::Serialize;

use super::{ConversationContext, Stage};

/// How a suggested reply is meant to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// A one-tap answer.
    Quick,
    /// An opener the user is expected to extend.
    Detailed,
}

/// One candidate reply, in priority order within the returned list.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestedReply {
    pub text: String,
    pub kind: ReplyKind,
}

impl SuggestedReply {
    fn quick(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: ReplyKind::Quick,
        }
    }

    fn detailed(text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind: ReplyKind::Detailed,
        }
    }
}

/// Returns 3-4 stage-appropriate candidate replies in priority order.
pub fn replies_for(stage: Stage, context: &ConversationContext) -> Vec<SuggestedReply> {
    match stage {
        Stage::Greeting => vec![
            SuggestedReply::quick("Hi, I'm ready to check in"),
            SuggestedReply::quick("Doing okay today"),
            SuggestedReply::detailed("Today has been a bit rough because…"),
        ],
        Stage::CheckIn => vec![
            SuggestedReply::quick("I slept well and feel rested"),
            SuggestedReply::quick("Feeling low on energy today"),
            SuggestedReply::detailed("My mood right now is…"),
            SuggestedReply::detailed("Today I want to focus on…"),
        ],
        Stage::JournalPrompt => vec![
            SuggestedReply::detailed("Something on my mind lately is…"),
            SuggestedReply::detailed("One thing I'm proud of this week is…"),
            SuggestedReply::quick("Not now, maybe later"),
        ],
        Stage::Affirmation => vec![
            SuggestedReply::quick("Thank you, that helps"),
            SuggestedReply::quick("I needed to hear that"),
            SuggestedReply::detailed("That reminds me of…"),
        ],
        Stage::Reflection => vec![
            SuggestedReply::detailed("What helped me most this week was…"),
            SuggestedReply::detailed("What got in my way was…"),
            SuggestedReply::quick("This week felt steady"),
        ],
        Stage::MilestoneReview => milestone_review_replies(context),
    }
}

/// `MilestoneReview` branches on whether any milestones are in view:
/// "Show me my progress" is only offered when there is progress to show.
fn milestone_review_replies(context: &ConversationContext) -> Vec<SuggestedReply> {
    if context.has_milestones() {
        vec![
            SuggestedReply::quick("Show me my progress"),
            SuggestedReply::quick("That feels good to see"),
            SuggestedReply::detailed("The streak that matters most to me is…"),
        ]
    } else {
        vec![
            SuggestedReply::quick("What milestones can I work toward?"),
            SuggestedReply::quick("Let's keep going"),
            SuggestedReply::detailed("A goal I'd like to set is…"),
        ]
    }
}
