//! Key-name canonicalization.

use crate::classify::classify_segment;
use once_cell::sync::Lazy;
use regex::Regex;

/// Any key ending in two numbers, each 0-49, with an optional known suffix.
static INPUT_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<input_id>.+_[1234]?[0-9]_[1234]?[0-9])(_dynamath|_comment|_choiceinput_.*)?$")
        .expect("hard-coded regular expression to be valid")
});

/// Placeholder for a detected input id.
pub const INPUT_ID_PLACEHOLDER: &str = "(input-id)";

/// Placeholder for keys holding recommendation URLs.
pub const URL_PLACEHOLDER: &str = "(url)";

/// Delimiters preserved inside key names, in priority order.
const DELIMITERS: [char; 2] = ['_', '.'];

/// Key paths whose child keys are URLs rather than field names.
pub const URL_KEY_PREFIXES: &[&str] = &[
    "event.export.recommendations",
    "event.information.export.recommendations",
    "event.export.removed_recommendations",
    "event.information.export.removed_recommendations",
];

/// Canonicalizes a raw key name.
///
/// An input id (`<anything>_<0-49>_<0-49>` plus an optional `_dynamath`,
/// `_comment` or `_choiceinput_*` suffix) is replaced by `(input-id)`. The
/// result is then split on the first delimiter present (`_` before `.`) and
/// each part is classified on its own.
///
/// ```rust
/// use eventdigest_canonical::canonicalize_key;
///
/// assert_eq!(canonicalize_key("i4x-edX-problem-abc_2_1"), "(input-id)");
/// assert_eq!(canonicalize_key("i4x-edX-problem-abc_2_1_comment"), "(input-id)_comment");
/// assert_eq!(canonicalize_key("attempt_12"), "attempt_(int2)");
/// assert_eq!(canonicalize_key("seq.5f3a"), "seq.(hex4)");
/// ```
pub fn canonicalize_key(raw: &str) -> String {
    let replaced;
    let mut value = raw;
    if let Some(input_id) = INPUT_ID.captures(raw).and_then(|caps| caps.name("input_id")) {
        replaced = raw.replace(input_id.as_str(), INPUT_ID_PLACEHOLDER);
        value = &replaced;
    }

    match DELIMITERS.iter().find(|d| value.contains(**d)) {
        Some(delimiter) => value
            .split(*delimiter)
            .map(|part| classify_segment(part, None))
            .collect::<Vec<_>>()
            .join(&delimiter.to_string()),
        None => classify_segment(value, None),
    }
}

/// Canonicalizes a key found directly under the key path `prefix`.
///
/// Children of the recommendation prefixes are always `(url)`.
pub fn canonicalize_key_under(prefix: &str, raw: &str) -> String {
    if URL_KEY_PREFIXES.contains(&prefix) {
        URL_PLACEHOLDER.to_string()
    } else {
        canonicalize_key(raw)
    }
}
