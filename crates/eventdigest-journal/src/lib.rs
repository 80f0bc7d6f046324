//! Tracking-log input for eventdigest.
//!
//! This crate provides:
//! - [`EventLogReader`], a line-oriented reader that skips malformed records
//! - [`RawEvent`], a read-only view with typed accessors for the fields the
//!   analyzer needs (event type, source, payload, context, course, time)
//! - [`load_identity_directory`], the loader for the optional user dump
//!
//! ## Quick Start
//!
//! ```rust
//! use eventdigest_journal::EventLogReader;
//!
//! let log = r#"{"event_type": "/courses/edX/DemoX/Demo/info", "event_source": "server"}"#;
//! let mut reader = EventLogReader::new(log.as_bytes());
//! while let Some(event) = reader.read_event()? {
//!     assert_eq!(event.course_id().unwrap().as_str(), "edX/DemoX/Demo");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Identity directory loader.
pub mod directory;
/// Error types for input operations.
pub mod errors;
/// Decoded records.
pub mod event;
/// Event log reader implementation.
pub mod reader;

pub use directory::{
    load_identity_directory, read_identity_directory, DirectoryStats, FIELD_SEPARATOR,
    MISSING_EMAIL,
};
pub use errors::JournalError;
pub use event::{parse_timestamp, RawEvent};
pub use reader::{EventLogReader, ReadStats};
