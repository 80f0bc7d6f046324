//! Course identifiers: the partition unit of a digest.

use crate::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A course id as it appears inside a URL path after `/courses/`.
static COURSE_IN_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*?/courses/(?P<course_id>[^/+]+(/|\+)[^/+]+(/|\+)[^/?#]+)")
        .expect("hard-coded regular expression to be valid")
});

static SLASH_SEPARATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<org>[^/+\s]+)/(?P<course>[^/+\s]+)/(?P<run>[^/\s]+)$")
        .expect("hard-coded regular expression to be valid")
});

static OPAQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^course-v1:(?P<org>[^/+\s]+)\+(?P<course>[^/+\s]+)\+(?P<run>[^/+\s]+)$")
        .expect("hard-coded regular expression to be valid")
});

static NOT_FILENAME_SAFE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_.\-]").expect("hard-coded regular expression to be valid")
});

/// Returns the raw course id embedded in a URL or event type, if any.
///
/// The match is purely syntactic (`a/b/c` or `a+b+c` after `/courses/`); use
/// [`CourseId::from_url`] when the result must be a valid id.
pub fn course_id_in_url(url: &str) -> Option<&str> {
    COURSE_IN_URL
        .captures(url)
        .and_then(|caps| caps.name("course_id"))
        .map(|m| m.as_str())
}

/// Validated course identifier, `org/course/run` or `course-v1:org+course+run`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseId(String);

impl CourseId {
    /// Parses a validated course id.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !SLASH_SEPARATED.is_match(&s) && !OPAQUE.is_match(&s) {
            return Err(ValidationError::PatternMismatch {
                field: "CourseId",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// Extracts a valid course id from a URL path.
    pub fn from_url(url: &str) -> Option<Self> {
        course_id_in_url(url).and_then(|raw| Self::parse(raw).ok())
    }

    /// The id as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `(org, course, run)` parts of the id.
    pub fn parts(&self) -> (&str, &str, &str) {
        let caps = SLASH_SEPARATED
            .captures(&self.0)
            .or_else(|| OPAQUE.captures(&self.0));
        match caps {
            Some(caps) => {
                let part = |name| caps.name(name).map(|m| m.as_str()).unwrap_or_default();
                (part("org"), part("course"), part("run"))
            }
            None => (self.0.as_str(), "", ""),
        }
    }

    /// A form of the id usable as a file name: `org_course_run`.
    pub fn filename_safe(&self) -> String {
        let (org, course, run) = self.parts();
        filename_safe(&[org, course, run].join("_"))
    }
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`.
pub fn filename_safe(value: &str) -> String {
    NOT_FILENAME_SAFE.replace_all(value, "_").into_owned()
}

impl TryFrom<String> for CourseId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CourseId> for String {
    fn from(value: CourseId) -> Self {
        value.0
    }
}

impl AsRef<str> for CourseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
