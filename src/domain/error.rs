use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// Snapshot text is empty or has no header line.
    MalformedSnapshot(String),
    /// The quorum rule accepted no record.
    NoMatchingRecord(String),
    /// Every identity field of the query is empty.
    AmbiguousQuery(String),
    ValidationError(String),
    ConfigError(String),
    TransportError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MalformedSnapshot(msg) => write!(f, "Malformed snapshot: {}", msg),
            AppError::NoMatchingRecord(msg) => write!(f, "No matching record: {}", msg),
            AppError::AmbiguousQuery(msg) => write!(f, "Ambiguous query: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::TransportError(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::TransportError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
