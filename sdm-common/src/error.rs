//! Common error types for SDM

use thiserror::Error;

/// Common result type for SDM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the record engine
#[derive(Error, Debug)]
pub enum Error {
    /// Storage row does not have the expected shape
    ///
    /// Raised by the row codec. The loader recovers by skipping the row.
    #[error("Parse error in {relation} relation: {reason} (line: {line:?})")]
    Parse {
        relation: &'static str,
        line: String,
        reason: String,
    },

    /// Requested student or subject not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A (student ID, subject name) key is ambiguous or already taken
    #[error("Duplicate key: student {student_id}, {subject}")]
    DuplicateKey { student_id: String, subject: String },

    /// Every 7-digit student ID is already in use
    #[error("Student ID space exhausted ({0} IDs in use)")]
    IdSpaceExhausted(usize),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn parse(relation: &'static str, line: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            relation,
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
