//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted by the note store.
//! - Validate user-provided drafts before they reach the collection.
//!
//! # Invariants
//! - `id` is stable for the note lifetime and never reused.
//! - A note built from a validated draft has non-empty title and description.
//! - Text is stored exactly as entered; whitespace counts as content.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Synthetic identity. Blobs written before ids existed get a fresh one.
    #[serde(default = "Uuid::new_v4")]
    pub id: NoteId,
    pub title: String,
    /// Accepts the legacy `desc` field name on decode.
    #[serde(alias = "desc")]
    pub description: String,
}

impl Note {
    /// Creates a note from a validated draft with a generated stable ID.
    pub fn from_draft(draft: NoteDraft) -> Result<Self, NoteValidationError> {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Creates a note with a caller-provided ID.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(id: NoteId, draft: NoteDraft) -> Result<Self, NoteValidationError> {
        draft.validate()?;
        Ok(Self {
            id,
            title: draft.title,
            description: draft.description,
        })
    }

    /// Replaces title and description in place, keeping the stable ID.
    pub fn apply(&mut self, draft: NoteDraft) -> Result<(), NoteValidationError> {
        draft.validate()?;
        self.title = draft.title;
        self.description = draft.description;
        Ok(())
    }

    /// Returns the editable fields as a draft for entry prefill.
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft::new(self.title.clone(), self.description.clone())
    }

    /// Checks persisted fields the same way drafts are checked.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, &self.description)
    }
}

/// User input for create/edit flows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Validates that both fields are non-empty.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is empty (checked first).
    /// - `EmptyDescription` when the description is empty.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_fields(&self.title, &self.description)
    }
}

/// Validation failure for note drafts and persisted notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    EmptyDescription,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptyDescription => write!(f, "note description must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

fn validate_fields(title: &str, description: &str) -> Result<(), NoteValidationError> {
    if title.is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if description.is_empty() {
        return Err(NoteValidationError::EmptyDescription);
    }
    Ok(())
}
