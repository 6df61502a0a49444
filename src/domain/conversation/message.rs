//! Message value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

/// Maximum allowed message content length in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person talking to the companion.
    User,
    /// The companion's generated reply.
    Assistant,
}

impl Role {
    /// Returns the stable string key used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parses a role from its persistence key.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// A single message in a conversation. Append-only; ordering by `created_at`
/// is the sole sequencing guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique ID of this message.
    pub id: MessageId,
    /// Role of the sender.
    pub role: Role,
    /// Text content.
    pub content: String,
    /// When the message was created.
    pub created_at: Timestamp,
}

impl Message {
    /// Creates a new user message, validating the content.
    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message, validating the content.
    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        if content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ValidationError::too_long("content", MAX_MESSAGE_CHARS));
        }
        Ok(Self {
            id: MessageId::new(),
            role,
            content,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstructs a message from persisted fields without re-validation.
    pub fn from_parts(id: MessageId, role: Role, content: String, created_at: Timestamp) -> Self {
        Self {
            id,
            role,
            content,
            created_at,
        }
    }

    /// Returns true if this message was sent by the user.
    pub fn is_from_user(&self) -> bool {
        self.role == Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_carries_role_and_content() {
        let msg = Message::user("feeling okay today").unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "feeling okay today");
        assert!(msg.is_from_user());
    }

    #[test]
    fn assistant_message_is_not_from_user() {
        let msg = Message::assistant("Good to hear from you.").unwrap();
        assert!(!msg.is_from_user());
    }

    #[test]
    fn rejects_empty_content() {
        assert!(Message::user("").is_err());
        assert!(Message::user("   \n").is_err());
    }

    #[test]
    fn rejects_oversized_content() {
        let huge = "a".repeat(MAX_MESSAGE_CHARS + 1);
        let result = Message::user(huge);
        assert!(matches!(result, Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn role_round_trips_through_persistence_key() {
        assert_eq!(Role::parse(Role::User.as_str()).unwrap(), Role::User);
        assert_eq!(Role::parse(Role::Assistant.as_str()).unwrap(), Role::Assistant);
        assert!(Role::parse("system").is_err());
    }

    #[test]
    fn role_serializes_to_snake_case() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
