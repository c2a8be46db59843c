//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the notes screen controller to Dart via FRB.
//! - Ship row notifications to the host in each response envelope.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide session is the single writer; calls are serialized by
//!   its mutex.
//! - Positions are visible-row positions unless named `source_position`.

use log::warn;
use rapeltout_core::db::open_db;
use rapeltout_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DeleteConfirmation, EntryResponse, EntrySource, Note, NoteId, NoteScreen, RecordingRenderer,
    RowChange, SqliteBlobStore,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const NOTES_DB_FILE_NAME: &str = "rapeltout_notes.sqlite3";
const NOTES_DB_PATH_ENV: &str = "RAPELTOUT_DB_PATH";
static NOTES_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<NotesSession>> = Mutex::new(None);

struct NotesSession {
    screen: NoteScreen<SqliteBlobStore, RecordingRenderer>,
    pending_delete: Option<DeleteConfirmation>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One visible note row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub note_id: String,
    pub title: String,
    pub description: String,
}

/// One row notification (`reset|inserted|changed|removed`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChangeItem {
    pub kind: String,
    pub position: Option<u32>,
    pub note_id: Option<String>,
}

/// Response envelope shared by every notes call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    /// Whether the requested action was applied.
    pub ok: bool,
    /// Human-readable message for diagnostics/UI notices.
    pub message: String,
    /// Visible rows after the call, in display order.
    pub rows: Vec<NoteRow>,
    /// Row notifications produced since the previous call.
    pub changes: Vec<RowChangeItem>,
}

/// Prefill payload for the edit sub-flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntryPrefill {
    pub ok: bool,
    pub message: String,
    pub title: String,
    pub description: String,
    /// Authoritative position to echo back through `notes_edit`.
    pub source_position: u32,
    pub note_id: String,
}

/// Delete confirmation dialog payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub ok: bool,
    pub message: String,
    pub title: String,
    pub prompt: String,
}

/// Opens (once) and returns the notes screen.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Repeated calls return the current rows without reloading.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open() -> NotesResponse {
    with_session(|_| Ok("Notes ready.".to_string()))
}

/// Returns current visible rows and pending row changes.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesResponse {
    with_session(|_| Ok(String::new()))
}

/// Replaces the search query; empty text shows every note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_search(query: String) -> NotesResponse {
    with_session(|session| {
        session.screen.set_query(query).map_err(|err| err.to_string())?;
        Ok(format!("{} note(s) shown.", session.screen.visible_len()))
    })
}

/// Creates a note from the entry sub-flow result.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create(title: String, description: String) -> NotesResponse {
    with_session(|session| {
        session
            .screen
            .complete_entry(EntryResponse::created(title, description))
            .map_err(|err| err.to_string())?;
        Ok("Note created.".to_string())
    })
}

/// Returns the edit prefill for the visible row at `position`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open_row(position: u32) -> NoteEntryPrefill {
    let mut guard = lock_session();
    let result = session_mut(&mut guard).and_then(|session| {
        session
            .screen
            .open_row(position as usize)
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(request) => {
            let prefill = request.prefill.unwrap_or_default();
            let (source_position, note_id) = request
                .source
                .map(|source| (source.position as u32, source.note_id.to_string()))
                .unwrap_or_default();
            NoteEntryPrefill {
                ok: true,
                message: String::new(),
                title: prefill.title,
                description: prefill.description,
                source_position,
                note_id,
            }
        }
        Err(message) => NoteEntryPrefill {
            ok: false,
            message: format!("notes_open_row failed: {message}"),
            title: String::new(),
            description: String::new(),
            source_position: 0,
            note_id: String::new(),
        },
    }
}

/// Applies an edit sub-flow result echoing `notes_open_row` source fields.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_edit(
    source_position: u32,
    note_id: String,
    title: String,
    description: String,
) -> NotesResponse {
    with_session(|session| {
        let note_id = parse_note_id(&note_id)?;
        let source = EntrySource {
            position: source_position as usize,
            note_id,
        };
        session
            .screen
            .complete_entry(EntryResponse::edited(source, title, description))
            .map_err(|err| err.to_string())?;
        Ok("Note updated.".to_string())
    })
}

/// Deletes the visible row at `position` without confirmation.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(position: u32) -> NotesResponse {
    with_session(|session| {
        session
            .screen
            .delete_row(position as usize)
            .map_err(|err| err.to_string())?;
        Ok("Note deleted.".to_string())
    })
}

/// Stages a confirmation dialog for deleting the visible row.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_request_delete(position: u32) -> DeletePrompt {
    let mut guard = lock_session();
    let result = session_mut(&mut guard).and_then(|session| {
        let confirmation = session
            .screen
            .request_delete(position as usize)
            .map_err(|err| err.to_string())?;
        let prompt = DeletePrompt {
            ok: true,
            message: String::new(),
            title: confirmation.title.clone(),
            prompt: confirmation.prompt.clone(),
        };
        session.pending_delete = Some(confirmation);
        Ok(prompt)
    });

    result.unwrap_or_else(|message| DeletePrompt {
        ok: false,
        message: format!("notes_request_delete failed: {message}"),
        title: String::new(),
        prompt: String::new(),
    })
}

/// Confirms the staged delete; the message carries the success notice.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_confirm_delete() -> NotesResponse {
    with_session(|session| {
        let Some(confirmation) = session.pending_delete.take() else {
            return Err("no delete awaiting confirmation".to_string());
        };
        let (_, notice) = session
            .screen
            .confirm_delete(confirmation)
            .map_err(|err| err.to_string())?;
        Ok(notice.message)
    })
}

/// Drops the staged delete without touching any note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_cancel_delete() -> NotesResponse {
    with_session(|session| {
        session.pending_delete = None;
        Ok(String::new())
    })
}

fn with_session(f: impl FnOnce(&mut NotesSession) -> Result<String, String>) -> NotesResponse {
    let mut guard = lock_session();
    let session = match session_mut(&mut guard) {
        Ok(session) => session,
        Err(message) => {
            return NotesResponse {
                ok: false,
                message,
                rows: Vec::new(),
                changes: Vec::new(),
            };
        }
    };

    let (ok, message) = match f(&mut *session) {
        Ok(message) => (true, message),
        Err(message) => (false, message),
    };
    NotesResponse {
        ok,
        message,
        rows: session
            .screen
            .visible_notes()
            .into_iter()
            .map(to_note_row)
            .collect(),
        changes: session
            .screen
            .renderer_mut()
            .drain()
            .into_iter()
            .map(to_row_change_item)
            .collect(),
    }
}

fn lock_session() -> MutexGuard<'static, Option<NotesSession>> {
    // Screen mutations never panic midway; a poisoned session is still consistent.
    SESSION.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn session_mut<'a>(
    guard: &'a mut MutexGuard<'static, Option<NotesSession>>,
) -> Result<&'a mut NotesSession, String> {
    let slot: &'a mut Option<NotesSession> = &mut **guard;
    if slot.is_none() {
        *slot = Some(open_session()?);
    }
    slot.as_mut().ok_or_else(|| "notes session unavailable".to_string())
}

fn open_session() -> Result<NotesSession, String> {
    let db_path = resolve_notes_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("notes DB open failed: {err}"))?;
    let blobs =
        SqliteBlobStore::try_new(conn).map_err(|err| format!("notes store init failed: {err}"))?;
    let mut screen = NoteScreen::new(blobs, RecordingRenderer::new());
    screen.start();
    Ok(NotesSession {
        screen,
        pending_delete: None,
    })
}

fn resolve_notes_db_path() -> PathBuf {
    NOTES_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(NOTES_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(NOTES_DB_FILE_NAME)
        })
        .clone()
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    NoteId::parse_str(raw.trim()).map_err(|_| {
        warn!("event=ffi_edit module=ffi status=rejected error_code=invalid_note_id");
        format!("invalid note id `{raw}`")
    })
}

fn to_note_row(note: &Note) -> NoteRow {
    NoteRow {
        note_id: note.id.to_string(),
        title: note.title.clone(),
        description: note.description.clone(),
    }
}

fn to_row_change_item(change: RowChange) -> RowChangeItem {
    match change {
        RowChange::Reset { .. } => RowChangeItem {
            kind: "reset".to_string(),
            position: None,
            note_id: None,
        },
        RowChange::Inserted { position, note_id } => RowChangeItem {
            kind: "inserted".to_string(),
            position: Some(position as u32),
            note_id: Some(note_id.to_string()),
        },
        RowChange::Changed { position, note_id } => RowChangeItem {
            kind: "changed".to_string(),
            position: Some(position as u32),
            note_id: Some(note_id.to_string()),
        },
        RowChange::Removed { position } => RowChangeItem {
            kind: "removed".to_string(),
            position: Some(position as u32),
            note_id: None,
        },
    }
}
