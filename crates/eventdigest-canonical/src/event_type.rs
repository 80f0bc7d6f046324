//! Event-type canonicalization.
//!
//! Implicit (browser) event types are names like `problem_check` and are kept
//! as-is. Explicit (server) event types are URL paths; their course id is
//! stubbed, course-scoped paths are dispatched on their route tag (see
//! [`crate::routes`]), and every remaining segment is classified.

use crate::classify::classify_segment;
use crate::course::course_id_in_url;
use crate::hints::IdentityHints;
use crate::routes::{route_rule, ROUTE_INDEX};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for the course id inside an explicit event type.
pub const COURSE_ID_PLACEHOLDER: &str = "(course_id)";

/// Flags controlling which event types are kept and how they are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeOptions {
    /// Drop event types that are not URL paths.
    pub exclude_implicit: bool,
    /// Drop event types that are URL paths.
    pub exclude_explicit: bool,
    /// Drop explicit event types that are known not to be exported.
    pub exclude_known_noise: bool,
    /// Skip per-route placeholder substitution. Inclusion is unaffected.
    pub disable_slugging: bool,
}

/// Why an event type was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// Implicit event types are excluded.
    Implicit,
    /// Explicit event types are excluded.
    Explicit,
    /// Not under `/courses/<course id>/`.
    NotCourseScoped,
    /// The route is noise.
    Route(String),
    /// A wiki command such as `_edit`.
    WikiCommand,
    /// A pdfbook path outside the page template.
    PdfbookTemplate,
    /// A top-level course page with extra segments.
    TrailingSegments,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Implicit => f.write_str("implicit event type"),
            Exclusion::Explicit => f.write_str("explicit event type"),
            Exclusion::NotCourseScoped => f.write_str("not course scoped"),
            Exclusion::Route(tag) if tag.is_empty() => f.write_str("empty route"),
            Exclusion::Route(tag) => write!(f, "noise route '{}'", tag),
            Exclusion::WikiCommand => f.write_str("wiki command"),
            Exclusion::PdfbookTemplate => f.write_str("pdfbook path outside template"),
            Exclusion::TrailingSegments => f.write_str("trailing segments on course page"),
        }
    }
}

/// Outcome of canonicalizing an event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonicalized {
    /// The canonical signature.
    Signature(String),
    /// The event should not be counted.
    Excluded(Exclusion),
}

impl Canonicalized {
    /// The signature, unless excluded.
    pub fn signature(&self) -> Option<&str> {
        match self {
            Canonicalized::Signature(signature) => Some(signature),
            Canonicalized::Excluded(_) => None,
        }
    }

    /// True when the event type was excluded.
    pub fn is_excluded(&self) -> bool {
        matches!(self, Canonicalized::Excluded(_))
    }
}

/// Canonicalizes an event type into its signature.
///
/// ```rust
/// use eventdigest_canonical::{canonicalize_event_type, Canonicalized, EventTypeOptions};
///
/// let options = EventTypeOptions::default();
/// assert_eq!(
///     canonicalize_event_type("/courses/edX/DemoX/Demo/jump_to_id/8f3a1c", &options, None),
///     Canonicalized::Signature("/courses/(course_id)/jump_to_id/(block-id)".into())
/// );
/// ```
pub fn canonicalize_event_type(
    event_type: &str,
    options: &EventTypeOptions,
    hints: Option<&IdentityHints>,
) -> Canonicalized {
    if !event_type.starts_with('/') {
        if options.exclude_implicit {
            return Canonicalized::Excluded(Exclusion::Implicit);
        }
        return Canonicalized::Signature(event_type.to_string());
    }
    if options.exclude_explicit {
        return Canonicalized::Excluded(Exclusion::Explicit);
    }

    let stubbed = match course_id_in_url(event_type) {
        Some(course_id) => event_type.replace(course_id, COURSE_ID_PLACEHOLDER),
        None => event_type.to_string(),
    };
    let mut segments: Vec<String> = stubbed.split('/').map(str::to_string).collect();

    if let Err(exclusion) = apply_route(&mut segments, options) {
        return Canonicalized::Excluded(exclusion);
    }

    let signature = segments
        .iter()
        .map(|segment| classify_segment(segment, hints))
        .collect::<Vec<_>>()
        .join("/");
    Canonicalized::Signature(signature)
}

fn apply_route(segments: &mut Vec<String>, options: &EventTypeOptions) -> Result<(), Exclusion> {
    let course_scoped = segments.len() > ROUTE_INDEX && segments[2] == COURSE_ID_PLACEHOLDER;
    if segments[1] != "courses" || !course_scoped {
        if options.exclude_known_noise {
            return Err(Exclusion::NotCourseScoped);
        }
        return Ok(());
    }

    let rule = route_rule(&segments[ROUTE_INDEX]);
    if options.exclude_known_noise {
        rule.noise.check(segments)?;
    }
    if !options.disable_slugging {
        rule.rewrite.apply(segments);
    }
    Ok(())
}
