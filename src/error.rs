use std::path::PathBuf;

#[derive(Debug)]
pub enum AppError {
    InputNotFound(PathBuf),
    IoError(std::io::Error),
    CsvError(String),
    DatabaseError(String),
    ScriptError(String),
    ConfigError(String),
    ParseError(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InputNotFound(path) => write!(f, "File not found: {}", path.display()),
            AppError::IoError(err) => write!(f, "IO error: {}", err),
            AppError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ScriptError(msg) => write!(f, "Script error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

/// Raised by a converter when a cell parses but cannot be represented
/// in the target type at all. Distinct from an ordinary parse failure,
/// which is just "no value".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ConversionFault(pub String);

/// Per-row persistence failure. Never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("{0}")]
    Rejected(String),
}

impl From<rusqlite::Error> for SinkError {
    fn from(err: rusqlite::Error) -> Self {
        SinkError::Rejected(err.to_string())
    }
}
