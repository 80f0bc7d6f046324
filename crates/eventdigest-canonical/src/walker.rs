//! Structural walker over nested payloads.
//!
//! [`walk`] yields every key path found under a value. Paths are built from
//! canonical key names only; leaves contribute a `(classification)` suffix.
//!
//! | shape            | emitted                               |
//! |------------------|---------------------------------------|
//! | `{}`             | `prefix(emptydict)`                   |
//! | `[]`             | `prefix[]`                            |
//! | `{k: v, ..}`     | paths of `v` under `prefix.canon(k)`  |
//! | `[v, ..]`        | paths of the first `v` under `prefix[]` |
//! | scalar           | `prefix(type)` or `prefix(hint-tag)`  |

use crate::hints::{IdentityHints, LeafClassification};
use crate::key::canonicalize_key_under;
use serde_json::Value;
use std::collections::HashSet;

/// Case-insensitive set of raw key names whose values are not descended into.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// No stop-words.
    pub fn none() -> Self {
        Self::default()
    }

    /// True when `key` (compared lower-cased) is a stop-word.
    pub fn contains(&self, key: &str) -> bool {
        !self.words.is_empty() && self.words.contains(&key.to_lowercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }
}

enum Frame<'a> {
    Visit(&'a Value, String),
    Emit(String),
}

/// Lazy iterator over the key paths under a value.
///
/// Traversal is depth-first in key order and uses an explicit stack, so deep
/// payloads cannot overflow the call stack.
pub struct KeyPaths<'a> {
    stack: Vec<Frame<'a>>,
    stopwords: &'a StopWords,
    hints: Option<&'a IdentityHints>,
}

/// Enumerates the key paths under `value`, each starting with `prefix`.
///
/// ```rust
/// use eventdigest_canonical::{walk, StopWords};
/// use serde_json::json;
///
/// let stopwords = StopWords::none();
/// let paths: Vec<String> = walk(&json!({"attempts": 3}), "event", &stopwords, None).collect();
/// assert_eq!(paths, vec!["event.attempts(int)"]);
/// ```
pub fn walk<'a>(
    value: &'a Value,
    prefix: &str,
    stopwords: &'a StopWords,
    hints: Option<&'a IdentityHints>,
) -> KeyPaths<'a> {
    KeyPaths {
        stack: vec![Frame::Visit(value, prefix.to_string())],
        stopwords,
        hints,
    }
}

impl<'a> KeyPaths<'a> {
    fn expand(&mut self, value: &'a Value, prefix: String) -> Option<String> {
        match value {
            Value::Object(map) if map.is_empty() => Some(format!("{}(emptydict)", prefix)),
            Value::Object(map) => {
                let first = self.stack.len();
                for (key, child) in map {
                    let path = format!("{}.{}", prefix, canonicalize_key_under(&prefix, key));
                    if self.stopwords.contains(key) {
                        self.stack.push(Frame::Emit(format!("{}(TRIMMED)", path)));
                    } else {
                        self.stack.push(Frame::Visit(child, path));
                    }
                }
                self.stack[first..].reverse();
                None
            }
            Value::Array(items) => {
                let path = format!("{}[]", prefix);
                match items.first() {
                    None => Some(path),
                    Some(first) => {
                        self.stack.push(Frame::Visit(first, path));
                        None
                    }
                }
            }
            leaf => {
                let mut tags = match self.hints {
                    Some(hints) => hints.match_leaf(&leaf_text(leaf)),
                    None => Vec::new(),
                };
                if tags.is_empty() {
                    tags.push(LeafClassification::Primitive(primitive_name(leaf)));
                }
                let first = self.stack.len();
                for tag in tags {
                    self.stack.push(Frame::Emit(format!("{}({})", prefix, tag)));
                }
                self.stack[first..].reverse();
                None
            }
        }
    }
}

impl<'a> Iterator for KeyPaths<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Emit(path) => return Some(path),
                Frame::Visit(value, prefix) => {
                    if let Some(path) = self.expand(value, prefix) {
                        return Some(path);
                    }
                }
            }
        }
        None
    }
}

/// String form of a leaf used for hint matching.
pub fn leaf_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Primitive type name of a leaf.
pub fn primitive_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
