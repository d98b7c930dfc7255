use std::path::Path;

use csv::ReaderBuilder;
use tracing::{error, info};

use crate::error::AppError;
use crate::models::RawRecord;

/// Row number of the first data line; line 1 is the header.
const FIRST_DATA_ROW: usize = 2;

/// Reads the whole file up front. Any read or decode failure aborts the
/// import before a single row is processed.
pub fn read_records(path: &Path) -> Result<Vec<(usize, RawRecord)>, AppError> {
    info!("Reading CSV file: {}", path.display());

    if !path.exists() {
        error!("CSV file not found: {}", path.display());
        return Err(AppError::InputNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes).map_err(|e| {
        error!("CSV file is not valid UTF-8: {}", e);
        AppError::CsvError(format!("{} is not valid UTF-8: {}", path.display(), e))
    })?;

    let rows = parse_records(content.strip_prefix('\u{feff}').unwrap_or(&content))?;
    info!("Read {} rows", rows.len());
    Ok(rows)
}

pub fn parse_records(content: &str) -> Result<Vec<(usize, RawRecord)>, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvError(format!("Failed to read CSV headers: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row_number = idx + FIRST_DATA_ROW;
        let record = result.map_err(|e| {
            AppError::CsvError(format!("Failed to parse CSV row {}: {}", row_number, e))
        })?;

        // Short records leave trailing columns absent
        let raw: RawRecord = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();

        rows.push((row_number, raw));
    }

    Ok(rows)
}
