use rapeltout_core::db::{open_db, open_db_in_memory};
use rapeltout_core::{
    BlobStore, Note, NoteDraft, NoteStore, RepoError, SqliteBlobStore, DEFAULT_NOTES_KEY,
};
use rusqlite::Connection;

fn note(title: &str, description: &str) -> Note {
    Note::from_draft(NoteDraft::new(title, description)).unwrap()
}

#[test]
fn first_load_on_fresh_database_is_empty() {
    let store = NoteStore::new(SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap());
    assert!(store.load().is_empty());
}

#[test]
fn save_then_load_round_trips_through_sqlite() {
    let mut store =
        NoteStore::new(SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap());
    let notes = vec![
        note("Gym", "5pm"),
        note("Groceries", "Milk"),
        note("Émile", "café ☕ at 9"),
    ];

    store.save(&notes).unwrap();
    assert_eq!(store.load(), notes);

    store.save(&notes[1..]).unwrap();
    assert_eq!(store.load(), notes[1..].to_vec());
}

#[test]
fn collection_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");
    let notes = vec![note("Gym", "5pm"), note("Groceries", "Milk")];

    {
        let mut store = NoteStore::new(SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap());
        store.save(&notes).unwrap();
    }

    let store = NoteStore::new(SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap());
    assert_eq!(store.load(), notes);
}

#[test]
fn corrupt_blob_loads_as_empty() {
    let mut blobs = SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap();
    blobs.set(DEFAULT_NOTES_KEY, "{\"version\":1,\"notes\":").unwrap();

    let store = NoteStore::new(blobs);
    assert!(store.load().is_empty());
}

#[test]
fn legacy_blob_is_readable_and_rewritten_in_current_format() {
    let mut blobs = SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap();
    blobs
        .set(
            DEFAULT_NOTES_KEY,
            r#"[{"title":"Groceries","desc":"Milk"}]"#,
        )
        .unwrap();

    let mut store = NoteStore::new(blobs);
    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].description, "Milk");

    store.save(&loaded).unwrap();
    let raw = store.blob_store().get(DEFAULT_NOTES_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["notes"][0]["id"], loaded[0].id.to_string());
    assert_eq!(store.load(), loaded);
}

#[test]
fn clear_removes_the_collection() {
    let mut store =
        NoteStore::new(SqliteBlobStore::try_new(open_db_in_memory().unwrap()).unwrap());
    store.save(&[note("a", "b")]).unwrap();
    store.clear().unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn blob_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBlobStore::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(actual_version, 0);
            assert!(expected_version > 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}
