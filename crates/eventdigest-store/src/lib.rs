//! Analysis, aggregation and output for eventdigest.
//!
//! This crate provides:
//! - [`EventAnalyzer`], which turns a [`RawEvent`] into key-path emissions
//!   after partition, date and event-type filtering
//! - [`Aggregator`] and [`FrequencyRecord`], commutative counters of
//!   (signature, source) pairs per key path and partition
//! - [`PartitionWriter`], which writes one digest file per partition
//!
//! ## Quick Start
//!
//! ```rust
//! use eventdigest_store::{AnalysisOptions, EventAnalyzer, RawEvent};
//!
//! let event = RawEvent::parse(
//!     r#"{"event_type": "seq_goto", "event_source": "browser",
//!         "context": {"course_id": "edX/DemoX/Demo"}, "event": {"new": 2}}"#,
//! )?;
//! let analyzer = EventAnalyzer::new(AnalysisOptions::default(), None);
//! let (aggregator, stats) = analyzer.analyze_all(&[event]);
//! assert_eq!(stats.analyzed, 1);
//! assert_eq!(aggregator.partition_count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Frequency aggregation.
pub mod aggregate;
/// Per-event analysis.
pub mod analysis;
/// Error types for store operations.
pub mod error;
/// Partition and date filters.
pub mod filter;
/// Digest file output.
pub mod output;

pub use aggregate::{Aggregator, Emission, FrequencyRecord, RankedCount};
pub use analysis::{
    AnalysisOptions, AnalysisStats, EventAnalyzer, SkipReason, ATTESTED_KEY, CONTEXT_PREFIX,
    PAYLOAD_PREFIX, PAYLOAD_STOPWORDS,
};
pub use error::StoreError;
pub use eventdigest_journal::RawEvent;
pub use filter::{DateInterval, PartitionFilter};
pub use output::{render_line, OutputStats, PartitionWriter, DIGEST_EXTENSION, FIELD_SEPARATOR};
