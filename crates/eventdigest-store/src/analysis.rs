//! Per-event analysis: from a raw record to the key paths it contributes.

use crate::aggregate::{Aggregator, Emission};
use crate::filter::{DateInterval, PartitionFilter};
use eventdigest_canonical::{
    canonicalize_event_type, walk, Canonicalized, EventTypeOptions, Exclusion, IdentityDirectory,
    IdentityHints, StopWords,
};
use eventdigest_journal::RawEvent;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Prefix of key paths found in the payload.
pub const PAYLOAD_PREFIX: &str = "event";

/// Prefix of key paths found in the context.
pub const CONTEXT_PREFIX: &str = "context";

/// Key added to every event when the attested marker is enabled.
pub const ATTESTED_KEY: &str = "attested";

/// Payload keys whose values are never descended into.
pub const PAYLOAD_STOPWORDS: &[&str] = &["POST", "GET"];

/// What to analyze and how.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Event-type inclusion and slugging flags.
    pub event_type: EventTypeOptions,
    /// Do not walk the context.
    pub exclude_context: bool,
    /// Add the [`ATTESTED_KEY`] key path to every analyzed event.
    pub include_attested_marker: bool,
    /// Build identity hints for each event.
    pub check_user_identity: bool,
    /// Partitions to analyze.
    pub partitions: PartitionFilter,
    /// Days to analyze, by event time.
    pub interval: Option<DateInterval>,
}

/// Why an event contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No course could be determined.
    NoPartition,
    /// The course is not in the partition filter.
    FilteredPartition,
    /// No usable event time while a date interval is set.
    NoEventTime,
    /// The event time is outside the date interval.
    OutsideInterval,
    /// No `event_type`.
    MissingEventType,
    /// The event type was excluded.
    Excluded(Exclusion),
    /// No `event_source`.
    MissingEventSource,
}

impl SkipReason {
    /// Short stable name, used as a statistics key.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::NoPartition => "no_partition",
            SkipReason::FilteredPartition => "filtered_partition",
            SkipReason::NoEventTime => "no_event_time",
            SkipReason::OutsideInterval => "outside_interval",
            SkipReason::MissingEventType => "missing_event_type",
            SkipReason::Excluded(_) => "excluded",
            SkipReason::MissingEventSource => "missing_event_source",
        }
    }

    fn is_anomaly(&self) -> bool {
        matches!(
            self,
            SkipReason::NoEventTime
                | SkipReason::MissingEventType
                | SkipReason::MissingEventSource
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded(exclusion) => write!(f, "excluded: {}", exclusion),
            other => f.write_str(other.label()),
        }
    }
}

/// Counters of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// Events seen.
    pub events: u64,
    /// Events that passed every filter.
    pub analyzed: u64,
    /// Key paths emitted.
    pub emissions: u64,
    /// Skipped events by [`SkipReason::label`].
    pub skipped: BTreeMap<String, u64>,
    /// Excluded events by exclusion.
    pub exclusions: BTreeMap<String, u64>,
}

impl AnalysisStats {
    /// Records an analyzed event and its emissions.
    pub fn record_analyzed(&mut self, emissions: usize) {
        self.events += 1;
        self.analyzed += 1;
        self.emissions += emissions as u64;
    }

    /// Records a skipped event.
    pub fn record_skip(&mut self, reason: &SkipReason) {
        self.events += 1;
        *self.skipped.entry(reason.label().to_string()).or_insert(0) += 1;
        if let SkipReason::Excluded(exclusion) = reason {
            *self.exclusions.entry(exclusion.to_string()).or_insert(0) += 1;
        }
    }

    /// Events skipped for any reason.
    pub fn total_skipped(&self) -> u64 {
        self.skipped.values().sum()
    }

    /// Adds another run's counters to these.
    pub fn merge(&mut self, other: &AnalysisStats) {
        self.events += other.events;
        self.analyzed += other.analyzed;
        self.emissions += other.emissions;
        for (label, count) in &other.skipped {
            *self.skipped.entry(label.clone()).or_insert(0) += count;
        }
        for (exclusion, count) in &other.exclusions {
            *self.exclusions.entry(exclusion.clone()).or_insert(0) += count;
        }
    }
}

/// Turns raw events into emissions.
///
/// Holds no mutable state; one analyzer can be shared by every worker.
#[derive(Debug)]
pub struct EventAnalyzer<'a> {
    options: AnalysisOptions,
    directory: Option<&'a IdentityDirectory>,
    payload_stopwords: StopWords,
    context_stopwords: StopWords,
}

impl<'a> EventAnalyzer<'a> {
    /// Creates an analyzer. The directory is only consulted when
    /// `check_user_identity` is set.
    pub fn new(options: AnalysisOptions, directory: Option<&'a IdentityDirectory>) -> Self {
        Self {
            options,
            directory,
            payload_stopwords: PAYLOAD_STOPWORDS.iter().collect(),
            context_stopwords: StopWords::none(),
        }
    }

    /// The options in effect.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Identity hints of one event; empty unless identity checking is on.
    pub fn hints_for(&self, event: &RawEvent) -> IdentityHints {
        if self.options.check_user_identity {
            IdentityHints::from_sources(&event.hint_sources(), self.directory)
        } else {
            IdentityHints::new()
        }
    }

    /// Analyzes one event.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when the event contributes nothing.
    pub fn analyze(&self, event: &RawEvent) -> Result<Vec<Emission>, SkipReason> {
        let partition = event.course_id().ok_or(SkipReason::NoPartition)?;
        if !self.options.partitions.admits(&partition) {
            return Err(SkipReason::FilteredPartition);
        }
        if let Some(interval) = &self.options.interval {
            let time = event.event_time().ok_or(SkipReason::NoEventTime)?;
            if !interval.contains(&time) {
                return Err(SkipReason::OutsideInterval);
            }
        }

        let hints = self.hints_for(event);

        let event_type = event.event_type().ok_or(SkipReason::MissingEventType)?;
        let signature =
            match canonicalize_event_type(event_type, &self.options.event_type, Some(&hints)) {
                Canonicalized::Signature(signature) => signature,
                Canonicalized::Excluded(exclusion) => {
                    return Err(SkipReason::Excluded(exclusion))
                }
            };
        let source = event
            .event_source()
            .ok_or(SkipReason::MissingEventSource)?;

        Ok(self
            .key_paths(event, &hints)
            .into_iter()
            .map(|key| Emission {
                partition: partition.clone(),
                key,
                signature: signature.clone(),
                source: source.to_string(),
            })
            .collect())
    }

    /// Key paths contributed by one event, payload first, then context.
    pub fn key_paths(&self, event: &RawEvent, hints: &IdentityHints) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(payload) = event.payload() {
            keys.extend(walk(
                &payload,
                PAYLOAD_PREFIX,
                &self.payload_stopwords,
                Some(hints),
            ));
        }
        if !self.options.exclude_context {
            if let Some(context) = event.context() {
                keys.extend(walk(
                    context,
                    CONTEXT_PREFIX,
                    &self.context_stopwords,
                    Some(hints),
                ));
            }
        }
        if self.options.include_attested_marker {
            keys.push(ATTESTED_KEY.to_string());
        }
        keys
    }

    /// Analyzes one event into an aggregator, counting the outcome.
    pub fn process(&self, event: &RawEvent, aggregator: &mut Aggregator, stats: &mut AnalysisStats) {
        match self.analyze(event) {
            Ok(emissions) => {
                stats.record_analyzed(emissions.len());
                aggregator.extend(emissions);
            }
            Err(reason) => {
                if reason.is_anomaly() {
                    warn!(event_type = ?event.event_type(), %reason, "skipping event");
                } else {
                    debug!(event_type = ?event.event_type(), %reason, "skipping event");
                }
                stats.record_skip(&reason);
            }
        }
    }

    /// Analyzes a batch of events in parallel.
    ///
    /// Each worker folds into its own aggregator; the partial results are
    /// merged at the end.
    pub fn analyze_all(&self, events: &[RawEvent]) -> (Aggregator, AnalysisStats) {
        events
            .par_iter()
            .fold(
                || (Aggregator::new(), AnalysisStats::default()),
                |(mut aggregator, mut stats), event| {
                    self.process(event, &mut aggregator, &mut stats);
                    (aggregator, stats)
                },
            )
            .reduce(
                || (Aggregator::new(), AnalysisStats::default()),
                |(mut aggregator, mut stats), (other, other_stats)| {
                    aggregator.merge(other);
                    stats.merge(&other_stats);
                    (aggregator, stats)
                },
            )
    }
}
