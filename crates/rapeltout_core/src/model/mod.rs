//! Domain model for the notes screen.
//!
//! # Responsibility
//! - Define the note record and the draft shape used by create/edit flows.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` assigned at creation.
//! - Title and description are never absent; drafts reject empty values.

pub mod note;
