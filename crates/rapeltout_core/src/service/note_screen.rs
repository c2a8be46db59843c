//! Notes screen controller.
//!
//! # Responsibility
//! - Own the authoritative note list and the active search query.
//! - Turn create/edit/delete/search intents into list mutations, row
//!   notifications and wholesale persistence.
//!
//! # Invariants
//! - The visible list is a projection of note ids recomputed from the
//!   authoritative list and query; it is never mutated independently.
//! - Every successful mutation persists the full authoritative list.
//! - Rejected actions leave state untouched and emit one `warn` event.
//! - Persistence failures never roll back in-memory state.
//!
//! # See also
//! - `crate::service::presenter` for the render contract.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::repo::blob_store::BlobStore;
use crate::repo::note_store::{NoteStore, DEFAULT_NOTES_KEY};
use crate::search::filter::{filter_ids, NoteQuery};
use crate::service::presenter::{ListRenderer, RowIntent};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DELETE_TITLE_PREFIX: &str = "Suppression de la note";
const DELETE_PROMPT: &str = "Êtes-vous certain de vouloir supprimer la note ?";
const MAX_PROMPT_TITLE_CHARS: usize = 80;

pub type ScreenResult<T> = Result<T, ScreenError>;

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Blob store key holding the note collection.
    pub storage_key: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_NOTES_KEY.to_string(),
        }
    }
}

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Loading,
    Ready,
}

/// Rejected screen action. State is unchanged whenever this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// Action attempted before `start()` loaded the collection.
    NotReady,
    /// Sub-flow result is missing its title or description.
    IncompleteEntry,
    /// Sub-flow result failed draft validation.
    InvalidEntry(NoteValidationError),
    /// Visible-row position is outside the current filtered list.
    PositionOutOfRange { position: usize, len: usize },
    /// Captured edit position no longer points at the selected note.
    StaleSelection { position: usize, note_id: NoteId },
    /// Note referenced by a confirmation no longer exists.
    NoteNotFound(NoteId),
}

impl Display for ScreenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "notes screen is still loading"),
            Self::IncompleteEntry => write!(f, "note entry result is missing title or description"),
            Self::InvalidEntry(err) => write!(f, "{err}"),
            Self::PositionOutOfRange { position, len } => {
                write!(f, "row position {position} is out of range for {len} visible notes")
            }
            Self::StaleSelection { position, note_id } => write!(
                f,
                "selection at position {position} no longer refers to note {note_id}"
            ),
            Self::NoteNotFound(note_id) => write!(f, "note not found: {note_id}"),
        }
    }
}

impl Error for ScreenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEntry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for ScreenError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidEntry(value)
    }
}

/// Authoritative position and identity captured when a row is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySource {
    pub position: usize,
    pub note_id: NoteId,
}

/// Request handed to the note entry sub-flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRequest {
    /// Present only for edits.
    pub prefill: Option<NoteDraft>,
    /// Present only for edits; must be echoed back unchanged.
    pub source: Option<EntrySource>,
}

/// Result returned by the note entry sub-flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryResponse {
    Confirmed {
        title: Option<String>,
        description: Option<String>,
        source: Option<EntrySource>,
    },
    Cancelled,
}

impl EntryResponse {
    /// Confirmed create result.
    pub fn created(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Confirmed {
            title: Some(title.into()),
            description: Some(description.into()),
            source: None,
        }
    }

    /// Confirmed edit result echoing the request source.
    pub fn edited(
        source: EntrySource,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::Confirmed {
            title: Some(title.into()),
            description: Some(description.into()),
            source: Some(source),
        }
    }
}

/// Pending delete awaiting explicit user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub note_id: NoteId,
    /// Dialog title, e.g. `Suppression de la note Gym`.
    pub title: String,
    pub prompt: String,
    note_title: String,
}

/// User-visible notification emitted after a confirmed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

/// Outcome of one successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationReceipt {
    pub note_id: NoteId,
    /// `false` when the write to storage failed and was logged.
    pub persisted: bool,
}

/// Outcome of a dispatched row intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    OpenEntry(EntryRequest),
    Deleted(MutationReceipt),
}

/// Notes screen controller over a blob store and a host renderer.
pub struct NoteScreen<S: BlobStore, R: ListRenderer> {
    store: NoteStore<S>,
    renderer: R,
    state: ScreenState,
    notes: Vec<Note>,
    query: NoteQuery,
    visible: Vec<NoteId>,
}

impl<S: BlobStore, R: ListRenderer> NoteScreen<S, R> {
    /// Creates a controller in `Loading` state with the default config.
    pub fn new(blobs: S, renderer: R) -> Self {
        Self::with_config(blobs, renderer, &ScreenConfig::default())
    }

    pub fn with_config(blobs: S, renderer: R, config: &ScreenConfig) -> Self {
        Self {
            store: NoteStore::with_key(blobs, config.storage_key.as_str()),
            renderer,
            state: ScreenState::Loading,
            notes: Vec::new(),
            query: NoteQuery::default(),
            visible: Vec::new(),
        }
    }

    /// Loads the persisted collection and enters `Ready`.
    ///
    /// Repeated calls after the first are no-ops.
    pub fn start(&mut self) {
        if self.state == ScreenState::Ready {
            return;
        }
        self.notes = self.store.load();
        self.state = ScreenState::Ready;
        self.refresh_visible();
        self.render_reset();
        info!(
            "event=screen_ready module=screen status=ok key={} count={}",
            self.store.key(),
            self.notes.len()
        );
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Authoritative list, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Currently visible notes in display order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        visible_rows(&self.notes, &self.visible)
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    /// Starts the create sub-flow.
    pub fn begin_create(&self) -> ScreenResult<EntryRequest> {
        self.ensure_ready("create")?;
        Ok(EntryRequest {
            prefill: None,
            source: None,
        })
    }

    /// Starts the edit sub-flow for the visible row at `position`.
    pub fn open_row(&self, position: usize) -> ScreenResult<EntryRequest> {
        self.ensure_ready("open")?;
        let note_id = self.visible_id("open", position)?;
        let Some(index) = self.index_of(note_id) else {
            return Err(self.reject("open", ScreenError::NoteNotFound(note_id)));
        };
        Ok(EntryRequest {
            prefill: Some(self.notes[index].to_draft()),
            source: Some(EntrySource {
                position: index,
                note_id,
            }),
        })
    }

    /// Applies a sub-flow result.
    ///
    /// Returns `Ok(None)` for a cancelled sub-flow.
    pub fn complete_entry(
        &mut self,
        response: EntryResponse,
    ) -> ScreenResult<Option<MutationReceipt>> {
        let EntryResponse::Confirmed {
            title,
            description,
            source,
        } = response
        else {
            debug!("event=entry_cancelled module=screen status=ok");
            return Ok(None);
        };

        let action = if source.is_some() { "edit" } else { "create" };
        self.ensure_ready(action)?;
        let (Some(title), Some(description)) = (title, description) else {
            return Err(self.reject(action, ScreenError::IncompleteEntry));
        };
        let draft = NoteDraft::new(title, description);

        let receipt = match source {
            None => self.create(draft)?,
            Some(source) => self.edit(source, draft)?,
        };
        Ok(Some(receipt))
    }

    /// Deletes the visible row at `position` without confirmation.
    pub fn delete_row(&mut self, position: usize) -> ScreenResult<MutationReceipt> {
        self.ensure_ready("delete")?;
        let note_id = self.visible_id("delete", position)?;
        self.remove_note("delete", note_id)
    }

    /// Prepares a confirmation dialog for deleting the visible row.
    pub fn request_delete(&self, position: usize) -> ScreenResult<DeleteConfirmation> {
        self.ensure_ready("request_delete")?;
        let note_id = self.visible_id("request_delete", position)?;
        let Some(index) = self.index_of(note_id) else {
            return Err(self.reject("request_delete", ScreenError::NoteNotFound(note_id)));
        };
        let note_title = prompt_title(&self.notes[index].title);
        Ok(DeleteConfirmation {
            note_id,
            title: format!("{DELETE_TITLE_PREFIX} {note_title}"),
            prompt: DELETE_PROMPT.to_string(),
            note_title,
        })
    }

    /// Deletes the note named by an accepted confirmation.
    ///
    /// Dropping the confirmation instead is the cancel path.
    pub fn confirm_delete(
        &mut self,
        confirmation: DeleteConfirmation,
    ) -> ScreenResult<(MutationReceipt, Notice)> {
        self.ensure_ready("confirm_delete")?;
        let receipt = self.remove_note("confirm_delete", confirmation.note_id)?;
        let notice = Notice {
            message: format!("La note {} a bien été supprimée.", confirmation.note_title),
        };
        Ok((receipt, notice))
    }

    /// Replaces the active query and re-renders every row.
    pub fn set_query(&mut self, text: impl Into<String>) -> ScreenResult<()> {
        self.ensure_ready("search")?;
        self.query = NoteQuery::new(text);
        self.refresh_visible();
        self.render_reset();
        debug!(
            "event=search module=screen status=ok query_chars={} visible={}",
            self.query.as_str().chars().count(),
            self.visible.len()
        );
        Ok(())
    }

    /// Dispatches a row intent from the host list.
    pub fn handle_intent(&mut self, intent: RowIntent) -> ScreenResult<IntentOutcome> {
        match intent {
            RowIntent::Open(position) => self.open_row(position).map(IntentOutcome::OpenEntry),
            RowIntent::Delete(position) => self.delete_row(position).map(IntentOutcome::Deleted),
        }
    }

    fn create(&mut self, draft: NoteDraft) -> ScreenResult<MutationReceipt> {
        let note = Note::from_draft(draft).map_err(|err| self.reject("create", err.into()))?;
        let note_id = note.id;
        self.notes.insert(0, note);
        self.refresh_visible();
        if let Some(position) = self.visible_position(note_id) {
            self.renderer.inserted(position, &self.notes[0]);
        }
        let persisted = self.persist("create");
        debug!("event=note_create module=screen status=ok count={}", self.notes.len());
        Ok(MutationReceipt { note_id, persisted })
    }

    fn edit(&mut self, source: EntrySource, draft: NoteDraft) -> ScreenResult<MutationReceipt> {
        let still_valid = self
            .notes
            .get(source.position)
            .is_some_and(|note| note.id == source.note_id);
        if !still_valid {
            return Err(self.reject(
                "edit",
                ScreenError::StaleSelection {
                    position: source.position,
                    note_id: source.note_id,
                },
            ));
        }
        if let Err(err) = draft.validate() {
            return Err(self.reject("edit", err.into()));
        }

        let before = self.visible_position(source.note_id);
        self.notes[source.position].apply(draft)?;
        self.refresh_visible();
        let after = self.visible_position(source.note_id);
        let note = &self.notes[source.position];
        match (before, after) {
            (Some(old), Some(new)) if old == new => self.renderer.changed(new, note),
            (Some(old), Some(new)) => {
                self.renderer.removed(old);
                self.renderer.inserted(new, note);
            }
            (Some(old), None) => self.renderer.removed(old),
            (None, Some(new)) => self.renderer.inserted(new, note),
            (None, None) => {}
        }

        let persisted = self.persist("edit");
        debug!(
            "event=note_edit module=screen status=ok position={}",
            source.position
        );
        Ok(MutationReceipt {
            note_id: source.note_id,
            persisted,
        })
    }

    fn remove_note(
        &mut self,
        action: &'static str,
        note_id: NoteId,
    ) -> ScreenResult<MutationReceipt> {
        let Some(index) = self.index_of(note_id) else {
            return Err(self.reject(action, ScreenError::NoteNotFound(note_id)));
        };
        let position = self.visible_position(note_id);
        self.notes.remove(index);
        self.refresh_visible();
        if let Some(position) = position {
            self.renderer.removed(position);
        }
        let persisted = self.persist(action);
        debug!(
            "event=note_delete module=screen status=ok action={} count={}",
            action,
            self.notes.len()
        );
        Ok(MutationReceipt { note_id, persisted })
    }

    fn persist(&mut self, action: &'static str) -> bool {
        match self.store.save(&self.notes) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=notes_persist module=screen status=error action={} error_code=save_failed error={}",
                    action, err
                );
                false
            }
        }
    }

    fn refresh_visible(&mut self) {
        self.visible = filter_ids(&self.notes, &self.query);
    }

    fn render_reset(&mut self) {
        let rows = visible_rows(&self.notes, &self.visible);
        self.renderer.reset(&rows);
    }

    fn ensure_ready(&self, action: &'static str) -> ScreenResult<()> {
        match self.state {
            ScreenState::Ready => Ok(()),
            ScreenState::Loading => Err(self.reject(action, ScreenError::NotReady)),
        }
    }

    fn visible_id(&self, action: &'static str, position: usize) -> ScreenResult<NoteId> {
        self.visible.get(position).copied().ok_or_else(|| {
            self.reject(
                action,
                ScreenError::PositionOutOfRange {
                    position,
                    len: self.visible.len(),
                },
            )
        })
    }

    fn visible_position(&self, note_id: NoteId) -> Option<usize> {
        self.visible.iter().position(|id| *id == note_id)
    }

    fn index_of(&self, note_id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == note_id)
    }

    fn reject(&self, action: &'static str, err: ScreenError) -> ScreenError {
        warn!(
            "event=screen_action module=screen status=rejected action={} error={}",
            action, err
        );
        err
    }
}

/// Resolves the id projection to notes, keeping projection order.
fn visible_rows<'a>(notes: &'a [Note], visible: &[NoteId]) -> Vec<&'a Note> {
    visible
        .iter()
        .filter_map(|id| notes.iter().find(|note| note.id == *id))
        .collect()
}

fn prompt_title(title: &str) -> String {
    let normalized = title.replace(['\n', '\r'], " ");
    let mut truncated = normalized
        .chars()
        .take(MAX_PROMPT_TITLE_CHARS)
        .collect::<String>();
    if normalized.chars().count() > MAX_PROMPT_TITLE_CHARS {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{prompt_title, visible_rows};
    use crate::model::note::{Note, NoteDraft};

    #[test]
    fn visible_rows_follow_the_id_projection() {
        let notes: Vec<Note> = ["a", "b", "c"]
            .iter()
            .map(|title| Note::from_draft(NoteDraft::new(*title, "same")).unwrap())
            .collect();

        let rows = visible_rows(&notes, &[notes[2].id, notes[0].id]);
        let titles: Vec<&str> = rows.iter().map(|note| note.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);

        assert!(visible_rows(&notes, &[]).is_empty());
    }

    #[test]
    fn prompt_title_flattens_and_truncates() {
        assert_eq!(prompt_title("a\nb"), "a b");
        let long = "x".repeat(100);
        let shown = prompt_title(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 83);
    }
}
