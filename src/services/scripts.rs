use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::error::AppError;

// `GO` is a client-side batch separator, not SQL
static BATCH_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*go[ \t]*\r?$").expect("valid batch separator regex"));

pub fn split_batches(sql: &str) -> Vec<&str> {
    BATCH_SEPARATOR
        .split(sql)
        .map(str::trim)
        .filter(|batch| !batch.is_empty())
        .collect()
}

/// Runs every batch of a SQL file. A missing file or a failing batch
/// aborts the import.
pub fn run_script(conn: &Connection, path: &Path, description: &str) -> Result<(), AppError> {
    info!("Executing {}", description);

    if !path.exists() {
        error!("SQL file not found: {}", path.display());
        return Err(AppError::InputNotFound(path.to_path_buf()));
    }

    let sql = std::fs::read_to_string(path)?;
    let batches = split_batches(&sql);
    debug!("{} contains {} batches", description, batches.len());

    for (idx, batch) in batches.iter().enumerate() {
        conn.execute_batch(batch).map_err(|e| {
            error!("Error executing {} (batch {}): {}", description, idx + 1, e);
            AppError::ScriptError(format!("{} batch {}: {}", description, idx + 1, e))
        })?;
    }

    info!("{} completed", description);
    Ok(())
}
