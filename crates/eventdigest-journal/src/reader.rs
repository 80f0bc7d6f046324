//! Event log reader implementation.

use crate::errors::JournalError;
use crate::event::RawEvent;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Counters kept while reading an event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Lines consumed, including blank and malformed ones.
    pub lines_read: u64,
    /// Records decoded.
    pub events_read: u64,
    /// Lines skipped because they did not decode into a record.
    pub malformed_lines: u64,
}

impl ReadStats {
    /// Adds another reader's counters to these.
    pub fn merge(&mut self, other: &ReadStats) {
        self.lines_read += other.lines_read;
        self.events_read += other.events_read;
        self.malformed_lines += other.malformed_lines;
    }
}

/// Reader for tracking logs holding one JSON record per line.
///
/// Malformed lines (invalid UTF-8, invalid JSON, non-object JSON) are logged
/// and skipped; only I/O failures are errors.
///
/// # Example
///
/// ```rust
/// use eventdigest_journal::EventLogReader;
///
/// let log = "{\"event_type\": \"play_video\"}\nnot json\n";
/// let mut reader = EventLogReader::new(log.as_bytes());
/// while let Some(event) = reader.read_event()? {
///     assert_eq!(event.event_type(), Some("play_video"));
/// }
/// assert_eq!(reader.stats().malformed_lines, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EventLogReader<R> {
    reader: R,
    buffer: Vec<u8>,
    stats: ReadStats,
}

impl EventLogReader<BufReader<File>> {
    /// Opens an event log file.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, JournalError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> EventLogReader<R> {
    /// Wraps any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            stats: ReadStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Reads the next record, skipping blank and malformed lines.
    ///
    /// Returns `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Io`] if reading fails.
    pub fn read_event(&mut self) -> Result<Option<RawEvent>, JournalError> {
        loop {
            self.buffer.clear();
            if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.stats.lines_read += 1;
            let line_number = self.stats.lines_read;

            let line = match std::str::from_utf8(&self.buffer) {
                Ok(line) => line.trim(),
                Err(err) => {
                    warn!(line_number, %err, "skipping line with invalid UTF-8");
                    self.stats.malformed_lines += 1;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match RawEvent::parse(line) {
                Ok(event) => {
                    self.stats.events_read += 1;
                    return Ok(Some(event));
                }
                Err(err) => {
                    warn!(line_number, %err, "skipping malformed record");
                    self.stats.malformed_lines += 1;
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for EventLogReader<R> {
    type Item = Result<RawEvent, JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}
