//! Event filtering by partition and time.

use chrono::{DateTime, NaiveDate, Utc};
use eventdigest_canonical::CourseId;
use std::collections::BTreeSet;

/// Restricts analysis to a set of partitions. Empty admits every partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionFilter {
    partitions: BTreeSet<CourseId>,
}

impl PartitionFilter {
    /// A filter that admits every partition.
    pub fn all() -> Self {
        Self::default()
    }

    /// True when `partition` should be analyzed.
    pub fn admits(&self, partition: &CourseId) -> bool {
        self.partitions.is_empty() || self.partitions.contains(partition)
    }

    /// True when every partition is admitted.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Number of admitted partitions, zero meaning all.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }
}

impl FromIterator<CourseId> for PartitionFilter {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        Self {
            partitions: iter.into_iter().collect(),
        }
    }
}

/// Half-open interval of calendar days `[start, end)`, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    /// Creates an interval. Returns `None` unless `start` is before `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// First day included.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day excluded.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when `time` falls on a day of the interval.
    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        let day = time.date_naive();
        self.start <= day && day < self.end
    }
}
