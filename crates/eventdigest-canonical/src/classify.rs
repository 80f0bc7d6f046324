//! Segment classification.
//!
//! A segment is the smallest unit the digest ever looks at: one delimiter-free
//! piece of a key name or one `/`-separated piece of an event type. Segments
//! that carry identifying or high-cardinality content are replaced by a
//! placeholder describing their shape.

use crate::hints::IdentityHints;
use once_cell::sync::Lazy;
use regex::Regex;

/// Hint names the engine can attach, with any length qualifier.
const HINT_NAMES: &str = r"username-int\d*|username(?:-\d+)?|user-id(?:-event)?(?:-\d+)?|username_from_user_id|user_id_from_username";

/// Every placeholder the engine itself produces, plus the `[]` list marker.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    let hint_tags = format!("(?:{HINT_NAMES})(?:-quoted)?|contains-(?:{HINT_NAMES})");
    let tokens = [
        r"(?:int|hex|alnum)\d+",
        r"input-id|url|course_id|emptydict|TRIMMED",
        r"xblock-loc|maybe_username|block-loc|block-id|courseware-loc|wikislug|discussion-id|forum-id",
        r"string|int|float|bool|null|list|dict",
        hint_tags.as_str(),
    ];
    Regex::new(&format!(r"\((?:{})\)|\[\]", tokens.join("|")))
        .expect("hard-coded regular expression to be valid")
});

/// Classifies a single segment into its canonical form.
///
/// Rules, first match wins:
///
/// 1. the empty segment stays empty;
/// 2. a segment equal to a hint value becomes `(<hint-name>)`;
/// 3. an already canonical segment is returned unchanged;
/// 4. all digits becomes `(int<len>)`;
/// 5. all hex digits becomes `(hex<len>)`;
/// 6. any digit becomes `(alnum<len>)`;
/// 7. anything else is a literal and is kept.
///
/// ```rust
/// use eventdigest_canonical::classify_segment;
///
/// assert_eq!(classify_segment("12345", None), "(int5)");
/// assert_eq!(classify_segment("deadbeef", None), "(hex8)");
/// assert_eq!(classify_segment("block42", None), "(alnum7)");
/// assert_eq!(classify_segment("problem", None), "problem");
/// ```
pub fn classify_segment(segment: &str, hints: Option<&IdentityHints>) -> String {
    if segment.is_empty() {
        return String::new();
    }

    if let Some(name) = hints.and_then(|hints| hints.name_of(segment)) {
        return format!("({})", name);
    }

    if is_canonical(segment) {
        return segment.to_string();
    }

    let len = segment.chars().count();
    if segment.chars().all(|c| c.is_ascii_digit()) {
        return format!("(int{})", len);
    }
    if segment.chars().all(|c| c.is_ascii_hexdigit()) {
        return format!("(hex{})", len);
    }
    if segment.chars().any(|c| c.is_ascii_digit()) {
        return format!("(alnum{})", len);
    }

    segment.to_string()
}

/// Returns true when `segment` already consists of placeholders and literal text.
///
/// Only placeholders this crate emits count; any other parenthesized text is
/// raw input. Placeholders may carry digits (`(int5)`, `(user-id-4)`), so the
/// digit check runs on what is left once they are removed.
pub fn is_canonical(segment: &str) -> bool {
    if !PLACEHOLDER.is_match(segment) {
        return false;
    }
    let residue = PLACEHOLDER.replace_all(segment, "");
    !residue.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(pairs: &[(&str, &str)]) -> IdentityHints {
        let mut hints = IdentityHints::new();
        for (name, value) in pairs {
            hints.insert(*name, *value);
        }
        hints
    }

    #[test]
    fn digits_become_int_placeholders() {
        for s in ["0", "7", "42", "00123", "12345678901234567890"] {
            assert_eq!(classify_segment(s, None), format!("(int{})", s.len()));
        }
    }

    #[test]
    fn hex_needs_a_letter_to_beat_int() {
        assert_eq!(classify_segment("abc123def456", None), "(hex12)");
        assert_eq!(classify_segment("ABCDEF", None), "(hex6)");
        assert_eq!(classify_segment("cafe", None), "(hex4)");
    }

    #[test]
    fn mixed_content_is_alnum() {
        assert_eq!(classify_segment("loc123", None), "(alnum6)");
        assert_eq!(classify_segment("i4x-edX", None), "(alnum7)");
    }

    #[test]
    fn words_are_literal() {
        assert_eq!(classify_segment("problem_check", None), "problem_check");
        assert_eq!(classify_segment("courses", None), "courses");
        assert_eq!(classify_segment("", None), "");
    }

    #[test]
    fn hint_match_wins_over_numeric_shape() {
        let hints = hints(&[("user-id", "12345")]);
        assert_eq!(classify_segment("12345", Some(&hints)), "(user-id)");
        assert_eq!(classify_segment("123456", Some(&hints)), "(int6)");
    }

    #[test]
    fn equal_hint_values_resolve_to_first_sorted_name() {
        let hints = hints(&[("username", "777"), ("user-id", "777")]);
        assert_eq!(classify_segment("777", Some(&hints)), "(user-id)");
    }

    #[test]
    fn placeholders_are_stable() {
        for s in ["(int5)", "(hex24)", "(user-id-4)", "(course_id)", "x[](alnum6)", "[]"] {
            assert_eq!(classify_segment(s, None), s);
        }
    }

    #[test]
    fn digits_outside_placeholders_still_classify() {
        assert_eq!(classify_segment("(int5)7", None), "(alnum7)");
        assert_eq!(classify_segment("(1)", None), "(alnum3)");
    }

    #[test]
    fn parenthesized_raw_values_are_classified() {
        assert_eq!(classify_segment("(user12345)", None), "(alnum11)");
        assert_eq!(classify_segment("(alice1987)", None), "(alnum11)");
        assert_eq!(classify_segment("(int)5", None), "(alnum6)");
        assert_eq!(classify_segment("(alice)", None), "(alice)");
    }

    #[test]
    fn hint_and_leaf_tags_are_stable() {
        for s in [
            "owner(username-5)",
            "x(username-int4)",
            "x(username-int)",
            "x(user-id-event-6)",
            "x(contains-user-id-4)",
            "x(username-3-quoted)",
            "answers(input-id)(string)",
            "(maybe_username)",
            "(courseware-loc)",
        ] {
            assert_eq!(classify_segment(s, None), s);
        }
    }

    #[test]
    fn hint_check_precedes_placeholder_check() {
        let hints = hints(&[("username", "(int5)")]);
        assert_eq!(classify_segment("(int5)", Some(&hints)), "(username)");
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(classify_segment("é1", None), "(alnum2)");
    }
}
