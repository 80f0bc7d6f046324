//! Per-route rules for course-scoped event types.
//!
//! A course-scoped event type splits into
//! `["", "courses", "(course_id)", <route tag>, ...]`; every index below refers
//! to that layout. Each route pairs a noise policy (applied when known noise is
//! excluded) with a rewrite (applied unless slugging is disabled).

use crate::event_type::Exclusion;

/// Index of the route tag in a split course-scoped event type.
pub const ROUTE_INDEX: usize = 3;

/// Placeholder for wiki article path segments.
pub const WIKI_SLUG: &str = "(wikislug)";

/// Shape of one position in a fixed path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Decimal digits only.
    Digits,
    /// Exactly this literal.
    Literal(&'static str),
}

impl Slot {
    fn accepts(&self, segment: &str) -> bool {
        match self {
            Slot::Digits => segment.chars().all(|c| c.is_ascii_digit()),
            Slot::Literal(literal) => segment == *literal,
        }
    }
}

/// When a route counts as known noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoisePolicy {
    /// Never noise.
    Keep,
    /// Always noise.
    Exclude,
    /// Noise only when it carries segments after the route tag.
    ExcludeTrailing,
    /// Noise when a wiki command (`_edit`, `_history`, ...) is present.
    ExcludeCommands,
    /// Noise unless every segment after the route tag fits the template.
    /// Empty segments are accepted in any slot.
    Template(&'static [Slot]),
}

/// Placeholder substitution for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Keep every segment.
    None,
    /// Stub segment `index` when the segment after it is one of `followers`.
    StubWhenFollowedBy {
        /// Segment to stub.
        index: usize,
        /// Accepted values of segment `index + 1`.
        followers: &'static [&'static str],
        /// Replacement.
        placeholder: &'static str,
    },
    /// Stub segment `index` when the path has exactly `len` segments.
    StubWhenLength {
        /// Segment to stub.
        index: usize,
        /// Required segment count.
        len: usize,
        /// Replacement.
        placeholder: &'static str,
    },
    /// Replace everything after the first `keep` segments once the path has
    /// at least `min_len` segments. `keep` may drop the route tag itself.
    CollapseTail {
        /// Segments kept verbatim.
        keep: usize,
        /// Minimum segment count.
        min_len: usize,
        /// Segments appended instead of the tail.
        placeholders: &'static [&'static str],
    },
    /// Replace segments `start..last` with one placeholder when the last
    /// segment is a known terminal action.
    CollapseBeforeTerminal {
        /// First collapsed segment.
        start: usize,
        /// Minimum segment count.
        min_len: usize,
        /// Accepted last segments.
        terminals: &'static [&'static str],
        /// Replacement for the collapsed run.
        placeholder: &'static str,
    },
    /// Slug wiki article segments up to the first command.
    WikiSlugs,
    /// Stub authored discussion and forum ids.
    DiscussionIds,
}

/// Rule descriptor for one route tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    /// Route tag (segment 3).
    pub tag: &'static str,
    /// Noise policy.
    pub noise: NoisePolicy,
    /// Placeholder substitution.
    pub rewrite: Rewrite,
}

const fn rule(tag: &'static str, noise: NoisePolicy, rewrite: Rewrite) -> RouteRule {
    RouteRule {
        tag,
        noise,
        rewrite,
    }
}

/// Every named route.
pub static ROUTES: &[RouteRule] = &[
    rule(
        "xblock",
        NoisePolicy::Exclude,
        Rewrite::StubWhenFollowedBy {
            index: 4,
            followers: &["handler", "handler_noauth"],
            placeholder: "(xblock-loc)",
        },
    ),
    rule(
        "submission_history",
        NoisePolicy::Keep,
        Rewrite::CollapseTail {
            keep: 3,
            min_len: 5,
            placeholders: &["(maybe_username)", "(block-loc)"],
        },
    ),
    rule(
        "jump_to_id",
        NoisePolicy::Keep,
        Rewrite::StubWhenLength {
            index: 4,
            len: 5,
            placeholder: "(block-id)",
        },
    ),
    rule(
        "jump_to",
        NoisePolicy::Exclude,
        Rewrite::CollapseTail {
            keep: 3,
            min_len: 0,
            placeholders: &["(block-loc)"],
        },
    ),
    rule(
        "courseware",
        NoisePolicy::Keep,
        Rewrite::CollapseTail {
            keep: 4,
            min_len: 0,
            placeholders: &["(courseware-loc)"],
        },
    ),
    rule(
        "xqueue",
        NoisePolicy::Exclude,
        Rewrite::CollapseBeforeTerminal {
            start: 5,
            min_len: 7,
            terminals: &["score_update", "ungraded_response"],
            placeholder: "(block-loc)",
        },
    ),
    rule("wiki", NoisePolicy::ExcludeCommands, Rewrite::WikiSlugs),
    rule("discussion", NoisePolicy::Keep, Rewrite::DiscussionIds),
    // /courses/(course_id)/pdfbook/<int>/chapter/<int>/<int>
    rule(
        "pdfbook",
        NoisePolicy::Template(&[
            Slot::Digits,
            Slot::Literal("chapter"),
            Slot::Digits,
            Slot::Digits,
        ]),
        Rewrite::None,
    ),
    rule("info", NoisePolicy::ExcludeTrailing, Rewrite::None),
    rule("progress", NoisePolicy::ExcludeTrailing, Rewrite::None),
    rule("course_wiki", NoisePolicy::ExcludeTrailing, Rewrite::None),
    rule("about", NoisePolicy::ExcludeTrailing, Rewrite::None),
    rule("teams", NoisePolicy::ExcludeTrailing, Rewrite::None),
];

/// Rule applied to any tag not in [`ROUTES`].
pub static UNKNOWN_ROUTE: RouteRule = rule("", NoisePolicy::Exclude, Rewrite::None);

/// Looks up the rule for a route tag.
pub fn route_rule(tag: &str) -> &'static RouteRule {
    ROUTES
        .iter()
        .find(|rule| rule.tag == tag)
        .unwrap_or(&UNKNOWN_ROUTE)
}

impl NoisePolicy {
    /// Returns the exclusion this policy imposes on `segments`, if any.
    pub fn check(&self, segments: &[String]) -> Result<(), Exclusion> {
        let tag = || Exclusion::Route(segments[ROUTE_INDEX].clone());
        match self {
            NoisePolicy::Keep => Ok(()),
            NoisePolicy::Exclude => Err(tag()),
            NoisePolicy::ExcludeTrailing if segments.len() > ROUTE_INDEX + 1 => {
                Err(Exclusion::TrailingSegments)
            }
            NoisePolicy::ExcludeTrailing => Ok(()),
            NoisePolicy::ExcludeCommands => match wiki_command(segments) {
                Some(_) => Err(Exclusion::WikiCommand),
                None => Ok(()),
            },
            NoisePolicy::Template(slots) => {
                let rest = &segments[ROUTE_INDEX + 1..];
                if rest.len() > slots.len() {
                    return Err(Exclusion::PdfbookTemplate);
                }
                let fits = rest
                    .iter()
                    .zip(slots.iter())
                    .all(|(segment, slot)| segment.is_empty() || slot.accepts(segment));
                if fits {
                    Ok(())
                } else {
                    Err(Exclusion::PdfbookTemplate)
                }
            }
        }
    }
}

impl Rewrite {
    /// Substitutes placeholders in `segments`.
    pub fn apply(&self, segments: &mut Vec<String>) {
        match *self {
            Rewrite::None => {}
            Rewrite::StubWhenFollowedBy {
                index,
                followers,
                placeholder,
            } => {
                if segments
                    .get(index + 1)
                    .is_some_and(|next| followers.contains(&next.as_str()))
                {
                    segments[index] = placeholder.to_string();
                }
            }
            Rewrite::StubWhenLength {
                index,
                len,
                placeholder,
            } => {
                if segments.len() == len {
                    segments[index] = placeholder.to_string();
                }
            }
            Rewrite::CollapseTail {
                keep,
                min_len,
                placeholders,
            } => {
                if segments.len() >= min_len {
                    segments.truncate(keep);
                    segments.extend(placeholders.iter().map(|p| p.to_string()));
                }
            }
            Rewrite::CollapseBeforeTerminal {
                start,
                min_len,
                terminals,
                placeholder,
            } => {
                let last = segments.len().saturating_sub(1);
                if segments.len() >= min_len && terminals.contains(&segments[last].as_str()) {
                    let terminal = segments.split_off(last);
                    segments.truncate(start);
                    segments.push(placeholder.to_string());
                    segments.extend(terminal);
                }
            }
            Rewrite::WikiSlugs => {
                let (start, end) = wiki_range(segments);
                let end = wiki_command(segments).unwrap_or(end);
                for segment in &mut segments[start..end] {
                    *segment = WIKI_SLUG.to_string();
                }
            }
            Rewrite::DiscussionIds => {
                // Comment and thread ids are generated hex; only authored ids need stubbing.
                if segments.get(5).is_some_and(|s| s == "threads") {
                    segments[4] = "(discussion-id)".to_string();
                }
                if segments.len() >= 7
                    && segments[4] == "forum"
                    && (segments[6] == "threads" || segments[6] == "inline")
                {
                    segments[5] = "(forum-id)".to_string();
                }
            }
        }
    }
}

/// Half-open range of wiki article segments: from the segment after the tag
/// to the end, ignoring a trailing empty segment and then a trailing
/// `moment.js`.
fn wiki_range(segments: &[String]) -> (usize, usize) {
    let start = ROUTE_INDEX + 1;
    let mut end = segments.len();
    if end > start && segments[end - 1].is_empty() {
        end -= 1;
    }
    if end > start && segments[end - 1] == "moment.js" {
        end -= 1;
    }
    (start, end.max(start))
}

/// Index of the first wiki command (`_edit`, `_history`, ...) in the article range.
fn wiki_command(segments: &[String]) -> Option<usize> {
    let (start, end) = wiki_range(segments);
    (start..end).find(|&index| segments[index].starts_with('_'))
}
