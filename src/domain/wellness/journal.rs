//! Journal entry record.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{JournalEntryId, MessageId, Timestamp, UserId, ValidationError};

/// Minimum content length for a directly created entry.
pub const MIN_DIRECT_CONTENT_CHARS: usize = 10;

/// Minimum content length for an extraction-sourced entry.
pub const MIN_EXTRACTED_CONTENT_CHARS: usize = 50;

/// Minimum word count for an extraction-sourced entry.
pub const MIN_EXTRACTED_WORDS: usize = 10;

/// Maximum title length; longer titles are truncated with an ellipsis.
pub const JOURNAL_TITLE_MAX_CHARS: usize = 60;

/// A reflective journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    id: JournalEntryId,
    user_id: UserId,
    title: Option<String>,
    content: String,
    word_count: u32,
    ai_insights: Option<serde_json::Value>,
    source_message_id: Option<MessageId>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl JournalEntry {
    /// Creates an entry from direct user input (10-character minimum).
    pub fn create_direct(
        user_id: UserId,
        title: Option<String>,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        Self::validate_content(&content, MIN_DIRECT_CONTENT_CHARS, None)?;
        Ok(Self::build(user_id, title, content, None, None))
    }

    /// Creates an entry from conversation extraction.
    ///
    /// Extraction-sourced content must clear a higher bar (50 characters and
    /// 10 words) since the source text is noisy dialogue rather than a
    /// deliberate entry.
    pub fn create_from_extraction(
        user_id: UserId,
        title: Option<String>,
        content: impl Into<String>,
        ai_insights: Option<serde_json::Value>,
        source_message_id: MessageId,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        Self::validate_content(
            &content,
            MIN_EXTRACTED_CONTENT_CHARS,
            Some(MIN_EXTRACTED_WORDS),
        )?;
        Ok(Self::build(
            user_id,
            title,
            content,
            ai_insights,
            Some(source_message_id),
        ))
    }

    fn validate_content(
        content: &str,
        min_chars: usize,
        min_words: Option<usize>,
    ) -> Result<(), ValidationError> {
        let chars = content.trim().chars().count();
        if chars < min_chars {
            return Err(ValidationError::too_short(
                "content", min_chars, chars, "characters",
            ));
        }
        if let Some(min_words) = min_words {
            let words = count_words(content);
            if words < min_words {
                return Err(ValidationError::too_short(
                    "content", min_words, words, "words",
                ));
            }
        }
        Ok(())
    }

    fn build(
        user_id: UserId,
        title: Option<String>,
        content: String,
        ai_insights: Option<serde_json::Value>,
        source_message_id: Option<MessageId>,
    ) -> Self {
        let now = Timestamp::now();
        let word_count = count_words(&content) as u32;
        Self {
            id: JournalEntryId::new(),
            user_id,
            title: title.map(|t| truncate_title(&t)),
            content,
            word_count,
            ai_insights,
            source_message_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs an entry from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: JournalEntryId,
        user_id: UserId,
        title: Option<String>,
        content: String,
        word_count: u32,
        ai_insights: Option<serde_json::Value>,
        source_message_id: Option<MessageId>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            content,
            word_count,
            ai_insights,
            source_message_id,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> JournalEntryId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    pub fn ai_insights(&self) -> Option<&serde_json::Value> {
        self.ai_insights.as_ref()
    }

    pub fn source_message_id(&self) -> Option<MessageId> {
        self.source_message_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

/// Whitespace-delimited word count.
fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Caps a title at [`JOURNAL_TITLE_MAX_CHARS`], appending an ellipsis when
/// the source text is longer.
fn truncate_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.chars().count() <= JOURNAL_TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(JOURNAL_TITLE_MAX_CHARS - 1).collect();
    format!("{}…", cut)
}
