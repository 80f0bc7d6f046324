//! Identity directory loader.
//!
//! The directory is a dump of the user table: one row per line, fields
//! separated by `\x01`. Lines without the separator are dump metadata.

use crate::errors::JournalError;
use eventdigest_canonical::IdentityDirectory;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{error, info};

/// Field separator of the dump.
pub const FIELD_SEPARATOR: char = '\x01';

/// Email recorded for rows too short to carry one.
pub const MISSING_EMAIL: &str = "<missing>";

const USER_ID_FIELD: usize = 0;
const USERNAME_FIELD: usize = 1;
const EMAIL_FIELD: usize = 7;

/// Counters kept while loading the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    /// Lines consumed.
    pub lines_read: u64,
    /// Lines skipped as metadata.
    pub metadata_lines: u64,
    /// Rows admitted.
    pub rows_loaded: u64,
    /// Rows admitted with the missing-email sentinel.
    pub missing_email: u64,
    /// Lines skipped for invalid UTF-8.
    pub invalid_lines: u64,
}

/// Loads the identity directory from a dump file.
///
/// # Errors
///
/// Returns [`JournalError::Io`] if the file cannot be read.
pub fn load_identity_directory<P: AsRef<Path>>(
    path: P,
) -> Result<(IdentityDirectory, DirectoryStats), JournalError> {
    let file = File::open(path.as_ref())?;
    let loaded = read_identity_directory(BufReader::new(file))?;
    info!(
        path = %path.as_ref().display(),
        rows = loaded.1.rows_loaded,
        "loaded identity directory"
    );
    Ok(loaded)
}

/// Reads the identity directory from any buffered reader.
pub fn read_identity_directory<R: BufRead>(
    mut reader: R,
) -> Result<(IdentityDirectory, DirectoryStats), JournalError> {
    let mut directory = IdentityDirectory::new();
    let mut stats = DirectoryStats::default();

    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        stats.lines_read += 1;
        let line_number = stats.lines_read;
        let line = match std::str::from_utf8(&buffer) {
            Ok(line) => line.trim_end_matches(['\r', '\n']),
            Err(err) => {
                error!(line_number, %err, "skipping directory row with invalid UTF-8");
                stats.invalid_lines += 1;
                continue;
            }
        };
        if !line.contains(FIELD_SEPARATOR) {
            stats.metadata_lines += 1;
            continue;
        }

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let user_id = fields[USER_ID_FIELD];
        let username = fields[USERNAME_FIELD];
        let email = match fields.get(EMAIL_FIELD) {
            Some(email) => *email,
            None => {
                error!(user_id, username, "unable to parse email");
                stats.missing_email += 1;
                MISSING_EMAIL
            }
        };
        directory.insert(user_id, username, email);
        stats.rows_loaded += 1;
    }

    Ok((directory, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lines_are_skipped() {
        let dump = "-- dump header\n\
                    1\x01alice\x01a\x01b\x01c\x01d\x01e\x01alice@example.com\n\
                    2\x01bob\n";
        let (directory, stats) = read_identity_directory(dump.as_bytes()).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.username_for("1"), Some("alice"));
        assert_eq!(directory.user_id_for("bob"), Some("2"));
        assert_eq!(directory.entry("1").unwrap().email, "alice@example.com");
        assert_eq!(directory.entry("2").unwrap().email, MISSING_EMAIL);
        assert_eq!(
            stats,
            DirectoryStats {
                lines_read: 3,
                metadata_lines: 1,
                rows_loaded: 2,
                missing_email: 1,
                invalid_lines: 0,
            }
        );
    }

    #[test]
    fn rows_with_invalid_utf8_are_skipped() {
        let mut dump = b"1\x01alice\n2\x01b".to_vec();
        dump.push(0xff);
        dump.extend_from_slice(b"b\n3\x01carol\n");
        let (directory, stats) = read_identity_directory(dump.as_slice()).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.username_for("1"), Some("alice"));
        assert_eq!(directory.username_for("2"), None);
        assert_eq!(directory.username_for("3"), Some("carol"));
        assert_eq!(stats.lines_read, 3);
        assert_eq!(stats.invalid_lines, 1);
        assert_eq!(stats.rows_loaded, 2);
    }
}
