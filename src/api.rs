use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The message returned in a [`DeleteAck`] after a successful deletion.
pub const DELETE_ACK_MESSAGE: &str = "Note deleted successfully";

/// A note as exchanged with the notes API and held in the displayed collection.
///
/// Notes created while the backend is unreachable carry a client-generated id and
/// have `is_local` set until they are reconciled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// The note identifier. Backends reporting `_id` are accepted as well.
    #[serde(alias = "_id")]
    pub id: String,
    /// The note title, never empty after trimming.
    pub title: String,
    /// The note body, never empty after trimming.
    pub content: String,
    /// When the note was created, by the backend or by the client for local notes.
    pub created_at: DateTime<Utc>,
    /// When the note was last modified, if the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether the note only exists on this client so far.
    #[serde(default)]
    pub is_local: bool,
}

impl Note {
    /// Returns the title and content of this note as a draft.
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// The title/content pair submitted when creating or updating a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteDraft {
    /// The note title.
    pub title: String,
    /// The note body.
    pub content: String,
}

impl NoteDraft {
    /// Creates a new draft from a title and content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Returns a trimmed copy of this draft, or an error if either field is blank.
    pub fn validate(&self) -> Result<NoteDraft, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(NoteDraft::new(title, content))
    }
}

/// A draft that failed the non-empty contract. Never reaches the network.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The title is empty after trimming.
    #[error("Please fill in both title and content: title is empty")]
    EmptyTitle,
    /// The content is empty after trimming.
    #[error("Please fill in both title and content: content is empty")]
    EmptyContent,
}

/// Acknowledgement of a successful deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAck {
    /// Always `true` for an acknowledged deletion.
    pub success: bool,
    /// A human-readable confirmation.
    pub message: String,
}

impl Default for DeleteAck {
    fn default() -> Self {
        Self {
            success: true,
            message: DELETE_ACK_MESSAGE.to_string(),
        }
    }
}
