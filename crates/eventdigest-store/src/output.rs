//! Digest files, one per partition.

use crate::aggregate::{Aggregator, FrequencyRecord};
use crate::error::StoreError;
use eventdigest_canonical::CourseId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Separator between the fields of a digest line.
pub const FIELD_SEPARATOR: char = '|';

/// Extension of digest files.
pub const DIGEST_EXTENSION: &str = "log";

fn check_field(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.contains(FIELD_SEPARATOR) || value.chars().any(char::is_control) {
        return Err(StoreError::Unrenderable {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Renders one digest line, `key|source|event_type|count`, without newline.
///
/// # Errors
///
/// Returns [`StoreError::Unrenderable`] if a field contains the separator, a
/// line break or another control character.
pub fn render_line(
    key: &str,
    source: &str,
    signature: &str,
    count: u64,
) -> Result<String, StoreError> {
    check_field("key", key)?;
    check_field("source", source)?;
    check_field("event_type", signature)?;
    Ok(format!(
        "{key}{sep}{source}{sep}{signature}{sep}{count}",
        sep = FIELD_SEPARATOR
    ))
}

/// Counters of one write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutputStats {
    /// Digest files written.
    pub files_written: u64,
    /// Lines written.
    pub lines_written: u64,
    /// Lines skipped as unrenderable.
    pub lines_skipped: u64,
    /// Partitions folded into another partition's file because both map to
    /// the same file name.
    pub partitions_merged: u64,
}

impl OutputStats {
    fn merge(&mut self, other: &OutputStats) {
        self.files_written += other.files_written;
        self.lines_written += other.lines_written;
        self.lines_skipped += other.lines_skipped;
        self.partitions_merged += other.partitions_merged;
    }
}

/// Writes digest files under an output directory.
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    root: PathBuf,
}

impl PartitionWriter {
    /// Creates the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// Output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a partition's digest file.
    pub fn path_for(&self, partition: &CourseId) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            partition.filename_safe().to_lowercase(),
            DIGEST_EXTENSION
        ))
    }

    /// Writes one partition's digest file, replacing any previous one.
    pub fn write_partition(
        &self,
        partition: &CourseId,
        records: &BTreeMap<String, FrequencyRecord>,
    ) -> Result<OutputStats, StoreError> {
        let path = self.path_for(partition);
        let mut out = BufWriter::new(File::create(&path)?);
        let mut stats = OutputStats {
            files_written: 1,
            ..Default::default()
        };

        for (key, record) in records {
            for ranked in record.ranked() {
                match render_line(key, &ranked.source, &ranked.signature, ranked.count) {
                    Ok(line) => {
                        writeln!(out, "{}", line)?;
                        stats.lines_written += 1;
                    }
                    Err(err) => {
                        warn!(partition = %partition, %err, "skipping digest line");
                        stats.lines_skipped += 1;
                    }
                }
            }
        }
        out.flush()?;

        info!(
            partition = %partition,
            path = %path.display(),
            lines = stats.lines_written,
            "wrote digest"
        );
        Ok(stats)
    }

    /// Writes the digest file of every partition.
    ///
    /// Partitions whose file names collide (`edX/DemoX/Demo` and
    /// `course-v1:edX+DemoX+Demo`, or ids differing only in case) share one
    /// file holding their summed counts.
    pub fn write_all(&self, aggregator: &Aggregator) -> Result<OutputStats, StoreError> {
        let mut files: BTreeMap<PathBuf, Vec<(&CourseId, &BTreeMap<String, FrequencyRecord>)>> =
            BTreeMap::new();
        for (partition, records) in aggregator.partitions() {
            files
                .entry(self.path_for(partition))
                .or_default()
                .push((partition, records));
        }

        let mut stats = OutputStats::default();
        for (path, mut sharing) in files {
            let (partition, records) = sharing.remove(0);
            if sharing.is_empty() {
                stats.merge(&self.write_partition(partition, records)?);
                continue;
            }

            let mut merged = records.clone();
            for (other, records) in sharing {
                warn!(
                    partition = %partition,
                    other = %other,
                    path = %path.display(),
                    "partitions share a digest file, merging counts"
                );
                for (key, record) in records {
                    merged.entry(key.clone()).or_default().merge(record.clone());
                }
                stats.partitions_merged += 1;
            }
            stats.merge(&self.write_partition(partition, &merged)?);
        }
        Ok(stats)
    }
}
