//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during analysis output.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Input error.
    #[error("journal error: {0}")]
    Journal(#[from] eventdigest_journal::JournalError),
    /// A field cannot be written on a single digest line.
    #[error("{field} cannot be rendered on one line: {value:?}")]
    Unrenderable {
        /// Which field of the line.
        field: &'static str,
        /// The offending value.
        value: String,
    },
}
