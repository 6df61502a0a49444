//! Conversation module - the per-user companion dialogue.
//!
//! A user has one ongoing conversation that moves through the journey
//! stages. Messages are append-only and ordered by creation time.

mod conversation;
mod message;

pub use conversation::{Conversation, TITLE_MAX_CHARS};
pub use message::{Message, Role, MAX_MESSAGE_CHARS};
