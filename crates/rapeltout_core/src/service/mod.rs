//! Screen-level use-case orchestration.
//!
//! # Responsibility
//! - Wire user intents to note collection mutations and persistence.
//! - Keep host UI/FFI layers decoupled from storage details.

pub mod note_screen;
pub mod presenter;
