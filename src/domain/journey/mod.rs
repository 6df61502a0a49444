//! Journey module - the staged structure of the companion dialogue.
//!
//! A conversation moves through a fixed six-stage cycle. This module holds
//! the stage graph, the per-stage completion criteria, the ephemeral context
//! snapshot that feeds every per-turn decision, prompt shaping, and the
//! suggested-reply generator.

mod context;
mod decision;
mod directives;
mod stage;
mod suggestions;

pub use context::ConversationContext;
pub use decision::{TransitionDecision, TransitionReason};
pub use directives::{directives_for, PromptDirectives};
pub use stage::Stage;
pub use suggestions::{replies_for, ReplyKind, SuggestedReply};
