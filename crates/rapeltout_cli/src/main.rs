//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `rapeltout_core` linkage and print the note collection found at
//!   an optional database path.
//! - Write core logs under `RAPELTOUT_LOG_DIR` when it is set.

use rapeltout_core::db::open_db;
use rapeltout_core::{default_log_level, init_logging, NoteStore, SqliteBlobStore};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "RAPELTOUT_LOG_DIR";

fn main() -> ExitCode {
    println!("rapeltout_core ping={}", rapeltout_core::ping());
    println!("rapeltout_core version={}", rapeltout_core::core_version());

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let blobs = match open_db(&db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| SqliteBlobStore::try_new(conn).map_err(|err| err.to_string()))
    {
        Ok(blobs) => blobs,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let notes = NoteStore::new(blobs).load();
    println!("notes count={}", notes.len());
    for (position, note) in notes.iter().enumerate() {
        println!("{position}\t{}\t{}", note.title, note.description);
    }
    ExitCode::SUCCESS
}
