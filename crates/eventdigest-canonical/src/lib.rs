//! Canonicalization and key discovery for privacy-aware schema digests.
//!
//! Everything in this crate is pure: no I/O, no shared mutable state, and all
//! context (hints, flags, the identity directory) is passed in explicitly, so
//! events can be processed on any number of threads.
//!
//! - [`classify_segment`] replaces identifying segments with shape placeholders.
//! - [`canonicalize_key`] canonicalizes key names, preserving delimiters.
//! - [`walk`] enumerates the key paths of a nested payload.
//! - [`canonicalize_event_type`] turns an event type into a signature, or
//!   excludes it.

#![deny(missing_docs)]

/// Segment classification into shape placeholders.
pub mod classify;
/// Course identifiers and the course-id URL pattern.
pub mod course;
/// Event-type canonicalization.
pub mod event_type;
/// Identity hints and the identity directory.
pub mod hints;
/// Key-name canonicalization.
pub mod key;
/// Per-route rule table for course-scoped event types.
pub mod routes;
/// Validation errors.
pub mod validation;
/// Key-path enumeration over nested payloads.
pub mod walker;

pub use classify::classify_segment;
pub use course::{course_id_in_url, filename_safe, CourseId};
pub use event_type::{canonicalize_event_type, Canonicalized, EventTypeOptions, Exclusion};
pub use hints::{HintSources, IdentityDirectory, IdentityHints, LeafClassification};
pub use key::{canonicalize_key, canonicalize_key_under};
pub use validation::ValidationError;
pub use walker::{walk, KeyPaths, StopWords};
