//! Note collection persistence over a blob store.
//!
//! # Responsibility
//! - Encode the full ordered note collection into one JSON blob.
//! - Decode current and legacy blob shapes back into notes.
//!
//! # Invariants
//! - `load` never fails: absent, unreadable or corrupt data yields an empty
//!   collection plus a `warn` event.
//! - `save` followed by `load` reproduces the same ordered notes, ids included.
//! - Decoded collections never contain duplicate ids or empty fields.

use crate::model::note::Note;
use crate::repo::blob_store::{BlobStore, RepoError, RepoResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use uuid::Uuid;

/// Default storage key for the note collection.
pub const DEFAULT_NOTES_KEY: &str = "notes";
/// Collection envelope version written by this build.
pub const COLLECTION_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct CollectionEnvelope<'a> {
    version: u32,
    notes: &'a [Note],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection {
    Versioned { version: u32, notes: Vec<Note> },
    /// Bare array of `{title, desc}` written before the envelope existed.
    Legacy(Vec<Note>),
}

/// Loads and saves the whole note collection under a single key.
pub struct NoteStore<S: BlobStore> {
    blobs: S,
    key: String,
}

impl<S: BlobStore> NoteStore<S> {
    /// Creates a store using [`DEFAULT_NOTES_KEY`].
    pub fn new(blobs: S) -> Self {
        Self::with_key(blobs, DEFAULT_NOTES_KEY)
    }

    pub fn with_key(blobs: S, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn blob_store(&self) -> &S {
        &self.blobs
    }

    pub fn blob_store_mut(&mut self) -> &mut S {
        &mut self.blobs
    }

    /// Reads the persisted collection, falling back to empty on any failure.
    pub fn load(&self) -> Vec<Note> {
        let started_at = Instant::now();
        let blob = match self.blobs.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("event=notes_load module=repo status=ok count=0 source=absent");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded error_code=blob_read_failed error={}",
                    err
                );
                return Vec::new();
            }
        };

        match decode_notes(&blob) {
            Ok(notes) => {
                info!(
                    "event=notes_load module=repo status=ok count={} blob_bytes={} duration_ms={}",
                    notes.len(),
                    blob.len(),
                    started_at.elapsed().as_millis()
                );
                notes
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded error_code=blob_decode_failed blob_bytes={} error={}",
                    blob.len(),
                    err
                );
                Vec::new()
            }
        }
    }

    /// Overwrites the persisted collection with `notes`.
    ///
    /// Callers always pass the full authoritative list.
    pub fn save(&mut self, notes: &[Note]) -> RepoResult<()> {
        let started_at = Instant::now();
        let blob = encode_notes(notes)?;
        self.blobs.set(&self.key, &blob)?;
        info!(
            "event=notes_save module=repo status=ok count={} blob_bytes={} duration_ms={}",
            notes.len(),
            blob.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes the persisted collection entirely.
    pub fn clear(&mut self) -> RepoResult<()> {
        self.blobs.remove(&self.key)
    }
}

/// Encodes notes into the current envelope format.
pub fn encode_notes(notes: &[Note]) -> RepoResult<String> {
    let envelope = CollectionEnvelope {
        version: COLLECTION_FORMAT_VERSION,
        notes,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decodes a collection blob in envelope or legacy array form.
///
/// # Errors
/// - `Codec` when the blob is not valid JSON of a known shape.
/// - `Codec` when the envelope version is newer than this build supports.
pub fn decode_notes(blob: &str) -> RepoResult<Vec<Note>> {
    let notes = match serde_json::from_str::<StoredCollection>(blob)? {
        StoredCollection::Versioned { version, notes } => {
            if version > COLLECTION_FORMAT_VERSION {
                return Err(RepoError::Codec(format!(
                    "collection version {version} is newer than supported {COLLECTION_FORMAT_VERSION}"
                )));
            }
            notes
        }
        StoredCollection::Legacy(notes) => notes,
    };
    Ok(sanitize_notes(notes))
}

fn sanitize_notes(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::with_capacity(notes.len());
    let mut kept = Vec::with_capacity(notes.len());
    for (index, mut note) in notes.into_iter().enumerate() {
        if let Err(err) = note.validate() {
            warn!(
                "event=notes_load module=repo status=skipped index={} error={}",
                index, err
            );
            continue;
        }
        if !seen.insert(note.id) {
            note.id = Uuid::new_v4();
            seen.insert(note.id);
            warn!(
                "event=notes_load module=repo status=reassigned_id index={}",
                index
            );
        }
        kept.push(note);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::{decode_notes, encode_notes, NoteStore, COLLECTION_FORMAT_VERSION};
    use crate::model::note::{Note, NoteDraft};
    use crate::repo::blob_store::{BlobStore, MemoryBlobStore, RepoError};

    fn note(title: &str, description: &str) -> Note {
        Note::from_draft(NoteDraft::new(title, description)).unwrap()
    }

    #[test]
    fn encode_writes_versioned_envelope() {
        let blob = encode_notes(&[note("Gym", "5pm")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value["version"], COLLECTION_FORMAT_VERSION);
        assert_eq!(value["notes"][0]["title"], "Gym");
        assert_eq!(value["notes"][0]["description"], "5pm");
    }

    #[test]
    fn decode_accepts_legacy_array_with_desc_field() {
        let notes =
            decode_notes(r#"[{"title":"Groceries","desc":"Milk"},{"title":"Gym","desc":"5pm"}]"#)
                .unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "Groceries");
        assert_eq!(notes[0].description, "Milk");
        assert_ne!(notes[0].id, notes[1].id);
    }

    #[test]
    fn decode_rejects_future_version() {
        let err = decode_notes(r#"{"version":99,"notes":[]}"#).unwrap_err();
        assert!(matches!(err, RepoError::Codec(message) if message.contains("newer")));
    }

    #[test]
    fn decode_skips_empty_notes_and_reassigns_duplicate_ids() {
        let id = uuid::Uuid::new_v4();
        let blob = format!(
            r#"{{"version":1,"notes":[
                {{"id":"{id}","title":"a","description":"b"}},
                {{"id":"{id}","title":"c","description":"d"}},
                {{"title":"","description":"e"}}
            ]}}"#
        );
        let notes = decode_notes(&blob).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, id);
        assert_ne!(notes[1].id, id);
        assert_eq!(notes[1].title, "c");
    }

    #[test]
    fn load_is_empty_for_absent_and_corrupt_blobs() {
        let mut store = NoteStore::new(MemoryBlobStore::new());
        assert!(store.load().is_empty());

        store
            .blob_store_mut()
            .set("notes", "{not json")
            .unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_order_and_ids() {
        let notes = vec![note("Gym", "5pm"), note("Groceries", "Milk")];
        let mut store = NoteStore::with_key(MemoryBlobStore::new(), "custom");
        store.save(&notes).unwrap();

        assert_eq!(store.load(), notes);
        assert_eq!(store.key(), "custom");
        assert!(store.blob_store().get("notes").unwrap().is_none());
    }

    #[test]
    fn whitespace_only_fields_survive_save_and_load() {
        let notes = vec![note("  ", "x"), note("Gym", "\t")];
        let mut store = NoteStore::new(MemoryBlobStore::new());
        store.save(&notes).unwrap();

        assert_eq!(store.load(), notes);
    }
}
