use thiserror::Error;

/// Errors that can occur while reading event logs or the identity directory.
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error during read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid JSON in a record (from serde_json).
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// A record decoded to something other than a JSON object.
    #[error("record is not a JSON object")]
    NotAnObject,
}
