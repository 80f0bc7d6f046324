//! Identity hints and the identity directory.
//!
//! Hints are the identifying strings known for one event (its username, its
//! user ids). The walker and the classifiers compare values against them so a
//! numeric user id shows up as `(user-id)` instead of `(int5)`.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifying values observed for a single event, keyed by hint name.
///
/// Iteration is ordered by hint name so tie-breaks between equal values are
/// deterministic. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentityHints {
    values: BTreeMap<String, String>,
}

impl IdentityHints {
    /// Creates an empty hint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` under `name`, replacing any earlier value.
    ///
    /// Returns `false` (and records nothing) for an empty value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return false;
        }
        self.values.insert(name.into(), value);
        true
    }

    /// Returns the value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of recorded hints.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no hint is recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the first hint name (in name order) whose value equals `value`.
    pub fn name_of(&self, value: &str) -> Option<&str> {
        self.iter()
            .find(|(_, hint)| *hint == value)
            .map(|(name, _)| name)
    }

    /// Matches a leaf's string form against every hint.
    ///
    /// Each hint contributes at most one classification, checked in the order
    /// exact, quoted, contained. Several hints may match the same leaf.
    pub fn match_leaf(&self, leaf: &str) -> Vec<LeafClassification> {
        let mut found = Vec::new();
        for (name, hint) in self.iter() {
            if hint == leaf {
                found.push(LeafClassification::Hint(name.to_string()));
            } else if is_quoted(leaf, hint) {
                found.push(LeafClassification::HintQuoted(name.to_string()));
            } else if leaf.contains(hint) {
                found.push(LeafClassification::ContainsHint(name.to_string()));
            }
        }
        found
    }
}

fn is_quoted(leaf: &str, hint: &str) -> bool {
    leaf.len() == hint.len() + 2
        && leaf.starts_with('"')
        && leaf.ends_with('"')
        && &leaf[1..leaf.len() - 1] == hint
}

/// Classification attached to a terminal value in a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeafClassification {
    /// The leaf equals the named hint.
    Hint(String),
    /// The leaf is the named hint wrapped in double quotes.
    HintQuoted(String),
    /// The leaf contains the named hint.
    ContainsHint(String),
    /// No hint matched; the leaf's primitive type.
    Primitive(&'static str),
}

impl fmt::Display for LeafClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafClassification::Hint(name) => write!(f, "{}", name),
            LeafClassification::HintQuoted(name) => write!(f, "{}-quoted", name),
            LeafClassification::ContainsHint(name) => write!(f, "contains-{}", name),
            LeafClassification::Primitive(kind) => write!(f, "{}", kind),
        }
    }
}

/// One row of the identity directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Username registered for the user id.
    pub username: String,
    /// Email address, or the missing-email sentinel.
    pub email: String,
}

/// Read-only user id / username lookup tables.
///
/// Built once before any event is classified and then shared by reference.
#[derive(Debug, Clone, Default)]
pub struct IdentityDirectory {
    by_user_id: HashMap<String, DirectoryEntry>,
    by_username: HashMap<String, String>,
}

impl IdentityDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row. Later rows win for a repeated user id or username.
    pub fn insert(
        &mut self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) {
        let user_id = user_id.into();
        let username = username.into();
        self.by_username.insert(username.clone(), user_id.clone());
        self.by_user_id.insert(
            user_id,
            DirectoryEntry {
                username,
                email: email.into(),
            },
        );
    }

    /// Looks up the row for a user id.
    pub fn entry(&self, user_id: &str) -> Option<&DirectoryEntry> {
        self.by_user_id.get(user_id)
    }

    /// Username registered for `user_id`.
    pub fn username_for(&self, user_id: &str) -> Option<&str> {
        self.entry(user_id).map(|entry| entry.username.as_str())
    }

    /// User id registered for `username`.
    pub fn user_id_for(&self, username: &str) -> Option<&str> {
        self.by_username.get(username).map(String::as_str)
    }

    /// Number of user ids in the directory.
    pub fn len(&self) -> usize {
        self.by_user_id.len()
    }

    /// True when the directory holds no rows.
    pub fn is_empty(&self) -> bool {
        self.by_user_id.is_empty()
    }
}

/// Identifying values pulled out of one event, before they are named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintSources {
    /// Top-level username.
    pub username: Option<String>,
    /// `context.user_id`, in string form.
    pub context_user_id: Option<String>,
    /// `user_id` inside the event payload, in string form.
    pub payload_user_id: Option<String>,
}

impl IdentityHints {
    /// Names the identifying values of one event.
    ///
    /// Short values get length-qualified names (`user-id-3`, `username-int4`).
    /// With a directory, the cross lookups `username_from_user_id` and
    /// `user_id_from_username` are added too.
    pub fn from_sources(sources: &HintSources, directory: Option<&IdentityDirectory>) -> Self {
        let mut hints = IdentityHints::new();

        let username = sources.username.as_deref().map(str::trim);
        if let Some(username) = username {
            let len = username.chars().count();
            let all_digits = !username.is_empty() && username.chars().all(|c| c.is_ascii_digit());
            let name = match (all_digits, len <= 5) {
                (true, true) => format!("username-int{}", len),
                (true, false) => "username-int".to_string(),
                (false, true) => format!("username-{}", len),
                (false, false) => "username".to_string(),
            };
            hints.insert(name, username);
        }

        if let Some(user_id) = sources.context_user_id.as_deref() {
            hints.insert(length_qualified("user-id", user_id), user_id);
        }

        if let Some(user_id) = sources.payload_user_id.as_deref() {
            hints.insert(length_qualified("user-id-event", user_id), user_id);
        }

        if let Some(directory) = directory {
            if let Some(name) = sources
                .context_user_id
                .as_deref()
                .and_then(|id| directory.username_for(id))
            {
                hints.insert("username_from_user_id", name);
            }
            if let Some(id) = username.and_then(|name| directory.user_id_for(name)) {
                hints.insert("user_id_from_username", id);
            }
        }

        hints
    }
}

fn length_qualified(base: &str, value: &str) -> String {
    let len = value.chars().count();
    if len <= 4 {
        format!("{}-{}", base, len)
    } else {
        base.to_string()
    }
}
