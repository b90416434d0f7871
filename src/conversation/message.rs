//! Chat transcript entries. Display-only; never sent back to the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown in the assistant's place when a submission fails.
pub const GENERIC_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Shown for an accepted voice draft with an empty transcript.
pub const EMPTY_TRANSCRIPT_TEXT: &str = "[voice input]";

/// One line of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub is_user: bool,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            sent_at: Utc::now(),
        }
    }

    /// The assistant-voiced notice appended when a submission fails.
    pub fn assistant_error() -> Self {
        Self::assistant(GENERIC_ERROR_TEXT)
    }
}
