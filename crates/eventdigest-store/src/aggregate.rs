//! Commutative frequency counting.
//!
//! Counting is a sum over (partition, key path, signature, source) tuples, so
//! partial results from disjoint subsets of the input can be merged in any
//! order and give the same totals.

use eventdigest_canonical::CourseId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap, HashMap};

/// One key path observed in one event, with where it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Emission {
    /// Partition (course) of the event.
    pub partition: CourseId,
    /// Canonical key path.
    pub key: String,
    /// Canonical event-type signature.
    pub signature: String,
    /// Event source (`server`, `browser`, ...).
    pub source: String,
}

/// Count of one (signature, source) pair under a key path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCount {
    /// Canonical event-type signature.
    pub signature: String,
    /// Event source.
    pub source: String,
    /// Occurrences.
    pub count: u64,
}

/// Occurrence counts of (signature, source) pairs for one key path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyRecord {
    counts: HashMap<(String, String), u64>,
}

impl FrequencyRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence.
    pub fn add(&mut self, signature: &str, source: &str) {
        self.add_count(signature, source, 1);
    }

    /// Counts `count` occurrences.
    pub fn add_count(&mut self, signature: &str, source: &str, count: u64) {
        *self
            .counts
            .entry((signature.to_string(), source.to_string()))
            .or_insert(0) += count;
    }

    /// Adds another record's counts to this one.
    pub fn merge(&mut self, other: FrequencyRecord) {
        for ((signature, source), count) in other.counts {
            *self.counts.entry((signature, source)).or_insert(0) += count;
        }
    }

    /// Occurrences of one pair.
    pub fn count(&self, signature: &str, source: &str) -> u64 {
        self.counts
            .get(&(signature.to_string(), source.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Occurrences of all pairs.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Pairs by descending count; ties by source, then signature.
    pub fn ranked(&self) -> Vec<RankedCount> {
        let mut ranked: Vec<RankedCount> = self
            .counts
            .iter()
            .map(|((signature, source), count)| RankedCount {
                signature: signature.clone(),
                source: source.clone(),
                count: *count,
            })
            .collect();
        ranked.sort_by(|a, b| match b.count.cmp(&a.count) {
            Ordering::Equal => (&a.source, &a.signature).cmp(&(&b.source, &b.signature)),
            order => order,
        });
        ranked
    }
}

/// Frequency records of every key path, grouped by partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    partitions: BTreeMap<CourseId, BTreeMap<String, FrequencyRecord>>,
}

impl Aggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one emission.
    pub fn add(&mut self, emission: &Emission) {
        self.partitions
            .entry(emission.partition.clone())
            .or_default()
            .entry(emission.key.clone())
            .or_default()
            .add(&emission.signature, &emission.source);
    }

    /// Adds another aggregator's counts to this one.
    pub fn merge(&mut self, other: Aggregator) {
        for (partition, records) in other.partitions {
            let ours = match self.partitions.entry(partition) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(records);
                    continue;
                }
                btree_map::Entry::Occupied(slot) => slot.into_mut(),
            };
            for (key, record) in records {
                ours.entry(key).or_default().merge(record);
            }
        }
    }

    /// Records of one partition, keyed by key path in ascending order.
    pub fn partition(&self, partition: &CourseId) -> Option<&BTreeMap<String, FrequencyRecord>> {
        self.partitions.get(partition)
    }

    /// Every partition with its records, partitions in ascending order.
    pub fn partitions(
        &self,
    ) -> impl Iterator<Item = (&CourseId, &BTreeMap<String, FrequencyRecord>)> {
        self.partitions.iter()
    }

    /// Number of partitions seen.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Number of distinct (partition, key path) records.
    pub fn record_count(&self) -> usize {
        self.partitions.values().map(BTreeMap::len).sum()
    }

    /// True when nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl Extend<Emission> for Aggregator {
    fn extend<I: IntoIterator<Item = Emission>>(&mut self, iter: I) {
        for emission in iter {
            self.add(&emission);
        }
    }
}
