use rapeltout_core::db::migrations::{current_user_version, latest_version};
use rapeltout_core::db::{open_db, open_db_in_memory, DbError};
use rapeltout_core::{BlobStore, SqliteBlobStore};
use rusqlite::Connection;

fn kv_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(kv_entries);").unwrap();
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    columns
}

#[test]
fn fresh_database_gets_kv_entries_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_eq!(kv_columns(&conn), vec!["key", "value", "updated_at"]);

    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('notes', '[]');",
        [],
    )
    .unwrap();
    let updated_at: i64 = conn
        .query_row(
            "SELECT updated_at FROM kv_entries WHERE key = 'notes';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(updated_at > 0);
}

#[test]
fn reopening_keeps_blobs_and_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rapeltout.db");

    let mut blobs = SqliteBlobStore::try_new(open_db(&path).unwrap()).unwrap();
    blobs.set("notes", "[]").unwrap();
    blobs.set("notes", r#"{"version":1,"notes":[]}"#).unwrap();
    drop(blobs);

    let conn = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    let blobs = SqliteBlobStore::try_new(conn).unwrap();
    assert_eq!(
        blobs.get("notes").unwrap().as_deref(),
        Some(r#"{"version":1,"notes":[]}"#)
    );
}

#[test]
fn database_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaTooNew { found: 999, supported } if supported == latest_version()
    ));
    assert!(err.to_string().contains("v999"));
}
