use crate::errors::JournalError;
use chrono::{DateTime, NaiveDateTime, Utc};
use eventdigest_canonical::{CourseId, HintSources};
use serde_json::Value;
use std::borrow::Cow;
use tracing::warn;

/// One decoded tracking-log record.
///
/// A thin, read-only view over the record's JSON object. Accessors return
/// `None` for missing or mistyped fields rather than failing; the analyzer
/// decides which absences are fatal for a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent(Value);

impl RawEvent {
    /// Wraps a decoded record. Only JSON objects are records.
    pub fn from_value(value: Value) -> Result<Self, JournalError> {
        if !value.is_object() {
            return Err(JournalError::NotAnObject);
        }
        Ok(Self(value))
    }

    /// Decodes one log line.
    pub fn parse(line: &str) -> Result<Self, JournalError> {
        Self::from_value(serde_json::from_str(line)?)
    }

    /// The underlying JSON.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// `event_type`, if it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.str_field("event_type")
    }

    /// `event_source`, if it is a string.
    pub fn event_source(&self) -> Option<&str> {
        self.str_field("event_source")
    }

    /// Top-level `username`.
    pub fn username(&self) -> Option<&str> {
        self.str_field("username")
    }

    /// `page`, the browser URL of implicit events.
    pub fn page(&self) -> Option<&str> {
        self.str_field("page")
    }

    /// `context`, unless missing or null.
    pub fn context(&self) -> Option<&Value> {
        self.0.get("context").filter(|context| !context.is_null())
    }

    /// The action-specific payload (the top-level `event` field).
    ///
    /// Some emitters encode the payload as a JSON string; it is decoded here.
    /// Only objects are payloads: anything else is logged and ignored.
    pub fn payload(&self) -> Option<Cow<'_, Value>> {
        let payload = match self.0.get("event") {
            None | Some(Value::Null) => return None,
            Some(Value::String(embedded)) => match serde_json::from_str::<Value>(embedded) {
                Ok(decoded) => Cow::Owned(decoded),
                Err(err) => {
                    warn!(event_type = ?self.event_type(), %err, "unparsable event payload");
                    return None;
                }
            },
            Some(value) => Cow::Borrowed(value),
        };
        if payload.is_object() {
            Some(payload)
        } else {
            warn!(event_type = ?self.event_type(), "event payload is not an object");
            None
        }
    }

    /// `context.user_id` in string form.
    pub fn context_user_id(&self) -> Option<String> {
        self.context()
            .and_then(|context| context.get("user_id"))
            .and_then(scalar_text)
    }

    /// `user_id` inside the payload, in string form.
    pub fn payload_user_id(&self) -> Option<String> {
        self.payload()
            .and_then(|payload| payload.get("user_id").and_then(scalar_text))
    }

    /// Identifying values of this event, for hint construction.
    pub fn hint_sources(&self) -> HintSources {
        HintSources {
            username: self.username().map(str::to_string),
            context_user_id: self.context_user_id(),
            payload_user_id: self.payload_user_id(),
        }
    }

    /// The course this event belongs to.
    ///
    /// `context.course_id` wins when present (an invalid one yields `None`).
    /// Otherwise the course is read from the URL: the event type of server
    /// events, the page of browser events.
    pub fn course_id(&self) -> Option<CourseId> {
        let declared = self
            .context()
            .and_then(|context| context.get("course_id"))
            .and_then(Value::as_str)
            .filter(|course_id| !course_id.is_empty());
        if let Some(course_id) = declared {
            return CourseId::parse(course_id).ok();
        }

        let url = match self.event_source()? {
            "server" => self.event_type()?,
            "browser" => self.page()?,
            _ => return None,
        };
        CourseId::from_url(url)
    }

    /// When the event was received, falling back to when it was emitted.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        let received = self
            .context()
            .and_then(|context| context.get("received_at"))
            .and_then(Value::as_str);
        received
            .or_else(|| self.str_field("time"))
            .and_then(parse_timestamp)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parses an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
