//! Persistence layer: key-value blob storage and the note collection codec.
//!
//! # Responsibility
//! - Define the narrow blob store contract the host storage must satisfy.
//! - Serialize the whole note collection under one key.
//!
//! # Invariants
//! - The note collection is always written wholesale, never as a delta.
//! - Loading never surfaces an error to the caller.

pub mod blob_store;
pub mod note_store;
