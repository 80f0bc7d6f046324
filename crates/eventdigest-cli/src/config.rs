//! Command-line flags and the validated analysis configuration.

use chrono::NaiveDate;
use clap::Args;
use eventdigest_canonical::{CourseId, EventTypeOptions, ValidationError};
use eventdigest_store::{AnalysisOptions, DateInterval, PartitionFilter};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, all detected before any input is read.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("--exclude-implicit and --exclude-explicit together exclude every event")]
    ContradictoryExclusions,
    #[error("start date {start} is not before end date {end}")]
    EmptyInterval { start: NaiveDate, end: NaiveDate },
    #[error("invalid course id in course filter: {0}")]
    InvalidCourse(#[from] ValidationError),
    #[error("--identity-directory requires --check-user-identity")]
    DirectoryWithoutIdentityCheck,
    #[error("no input paths given")]
    NoInputs,
}

/// Event-type inclusion flags shared by several commands.
#[derive(Debug, Clone, Default, Args)]
pub struct EventTypeFlags {
    /// Drop event types that are not URL paths
    #[arg(long, env = "EVENTDIGEST_EXCLUDE_IMPLICIT")]
    pub exclude_implicit: bool,
    /// Drop event types that are URL paths
    #[arg(long, env = "EVENTDIGEST_EXCLUDE_EXPLICIT")]
    pub exclude_explicit: bool,
    /// Drop URL paths known not to be exported
    #[arg(long, env = "EVENTDIGEST_EXCLUDE_KNOWN_NOISE")]
    pub exclude_known_noise: bool,
    /// Keep variable path segments instead of replacing them with placeholders
    #[arg(long, env = "EVENTDIGEST_DISABLE_SLUGGING")]
    pub disable_slugging: bool,
}

impl EventTypeFlags {
    pub fn validate(&self) -> Result<EventTypeOptions, ConfigError> {
        if self.exclude_implicit && self.exclude_explicit {
            return Err(ConfigError::ContradictoryExclusions);
        }
        Ok(EventTypeOptions {
            exclude_implicit: self.exclude_implicit,
            exclude_explicit: self.exclude_explicit,
            exclude_known_noise: self.exclude_known_noise,
            disable_slugging: self.disable_slugging,
        })
    }
}

/// Flags of the `analyze` command.
#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// Tracking log files, or directories of them
    pub inputs: Vec<PathBuf>,
    /// Directory receiving one digest file per course
    #[arg(long, short = 'o', env = "EVENTDIGEST_OUTPUT_ROOT")]
    pub output_root: PathBuf,
    #[command(flatten)]
    pub event_type: EventTypeFlags,
    /// Do not report key paths found in the event context
    #[arg(long, env = "EVENTDIGEST_EXCLUDE_CONTEXT")]
    pub exclude_context: bool,
    /// Add the `attested` key to every analyzed event
    #[arg(long, env = "EVENTDIGEST_INCLUDE_ATTESTED_MARKER")]
    pub include_attested_marker: bool,
    /// Tag values matching the event's username or user id
    #[arg(long, env = "EVENTDIGEST_CHECK_USER_IDENTITY")]
    pub check_user_identity: bool,
    /// Only analyze these courses (repeatable or comma-separated)
    #[arg(long = "course", value_delimiter = ',', env = "EVENTDIGEST_COURSES")]
    pub courses: Vec<String>,
    /// User table dump used to cross-reference usernames and user ids
    #[arg(long, env = "EVENTDIGEST_IDENTITY_DIRECTORY")]
    pub identity_directory: Option<PathBuf>,
    /// First day analyzed (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    /// First day not analyzed (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// Print run statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// A validated `analyze` configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub inputs: Vec<PathBuf>,
    pub output_root: PathBuf,
    pub identity_directory: Option<PathBuf>,
    pub options: AnalysisOptions,
}

impl AnalysisConfig {
    pub fn from_args(args: &AnalyzeArgs) -> Result<Self, ConfigError> {
        if args.inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        let event_type = args.event_type.validate()?;

        let interval = match (args.start_date, args.end_date) {
            (None, None) => None,
            (start, end) => {
                let start = start.unwrap_or(NaiveDate::MIN);
                let end = end.unwrap_or(NaiveDate::MAX);
                Some(
                    DateInterval::new(start, end)
                        .ok_or(ConfigError::EmptyInterval { start, end })?,
                )
            }
        };

        let partitions = args
            .courses
            .iter()
            .map(|course| CourseId::parse(course.trim()))
            .collect::<Result<PartitionFilter, _>>()?;

        if args.identity_directory.is_some() && !args.check_user_identity {
            return Err(ConfigError::DirectoryWithoutIdentityCheck);
        }

        Ok(Self {
            inputs: args.inputs.clone(),
            output_root: args.output_root.clone(),
            identity_directory: args.identity_directory.clone(),
            options: AnalysisOptions {
                event_type,
                exclude_context: args.exclude_context,
                include_attested_marker: args.include_attested_marker,
                check_user_identity: args.check_user_identity,
                partitions,
                interval,
            },
        })
    }
}
