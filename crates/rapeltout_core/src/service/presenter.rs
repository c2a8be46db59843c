//! Row rendering contract between the screen controller and the host list.
//!
//! # Responsibility
//! - Describe the row-level notifications a host list view consumes.
//! - Describe the row-level intents a host list view dispatches back.
//!
//! # Invariants
//! - All positions are filtered-list (visible row) positions.
//! - Notifications are emitted after the controller state already changed.

use crate::model::note::{Note, NoteId};

/// Render surface implemented by the host list view.
pub trait ListRenderer {
    /// Replace every visible row.
    fn reset(&mut self, rows: &[&Note]);
    /// A row appeared at `position`.
    fn inserted(&mut self, position: usize, note: &Note);
    /// The row at `position` has new content.
    fn changed(&mut self, position: usize, note: &Note);
    /// The row at `position` disappeared.
    fn removed(&mut self, position: usize);
}

impl<T: ListRenderer + ?Sized> ListRenderer for &mut T {
    fn reset(&mut self, rows: &[&Note]) {
        (**self).reset(rows);
    }

    fn inserted(&mut self, position: usize, note: &Note) {
        (**self).inserted(position, note);
    }

    fn changed(&mut self, position: usize, note: &Note) {
        (**self).changed(position, note);
    }

    fn removed(&mut self, position: usize) {
        (**self).removed(position);
    }
}

/// Row-level user intent dispatched by the host list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIntent {
    /// Row tapped: open the note entry sub-flow for editing.
    Open(usize),
    /// Row delete button tapped: delete without confirmation.
    Delete(usize),
}

/// Recorded render notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowChange {
    Reset { note_ids: Vec<NoteId> },
    Inserted { position: usize, note_id: NoteId },
    Changed { position: usize, note_id: NoteId },
    Removed { position: usize },
}

/// Renderer that buffers notifications for later draining.
///
/// Used by the FFI layer to ship changes to the host in one response.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    changes: Vec<RowChange>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[RowChange] {
        &self.changes
    }

    /// Takes every buffered change, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<RowChange> {
        std::mem::take(&mut self.changes)
    }
}

impl ListRenderer for RecordingRenderer {
    fn reset(&mut self, rows: &[&Note]) {
        self.changes.push(RowChange::Reset {
            note_ids: rows.iter().map(|note| note.id).collect(),
        });
    }

    fn inserted(&mut self, position: usize, note: &Note) {
        self.changes.push(RowChange::Inserted {
            position,
            note_id: note.id,
        });
    }

    fn changed(&mut self, position: usize, note: &Note) {
        self.changes.push(RowChange::Changed {
            position,
            note_id: note.id,
        });
    }

    fn removed(&mut self, position: usize) {
        self.changes.push(RowChange::Removed { position });
    }
}
