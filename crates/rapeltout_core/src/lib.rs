//! Core domain logic for the Rapeltout notes app.
//! This crate is the single source of truth for note collection invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use repo::blob_store::{BlobStore, MemoryBlobStore, RepoError, RepoResult, SqliteBlobStore};
pub use repo::note_store::{NoteStore, DEFAULT_NOTES_KEY};
pub use search::filter::{filter_ids, filter_notes, NoteQuery};
pub use service::note_screen::{
    DeleteConfirmation, EntryRequest, EntryResponse, EntrySource, IntentOutcome, MutationReceipt,
    NoteScreen, Notice, ScreenConfig, ScreenError, ScreenResult, ScreenState,
};
pub use service::presenter::{ListRenderer, RecordingRenderer, RowChange, RowIntent};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
