//! Records: the read-only message view the engine classifies.
//!
//! The engine never owns or mutates a record; it only reads it through the
//! [`Record`] trait. [`Message`] is the concrete record used by the headless
//! binary and the test harnesses. It deserializes from one JSON object per
//! line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A typed view of record data, produced by a
/// [`FieldAccessor`](crate::FieldAccessor) and consumed by a
/// [`Predicate`](crate::Predicate).
///
/// Every built-in accessor yields [`Value::Str`]. Predicates only ever match
/// strings; any other variant evaluates to `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Nothing to match against.
    None,
    Str(Cow<'a, str>),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl<'a> Value<'a> {
    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View a JSON field value. Arrays, objects and `null` carry nothing a
    /// string predicate could match and map to [`Value::None`].
    pub fn from_json(value: &'a serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Value::Str(Cow::Borrowed(s)),
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::None, Value::Float),
            },
            _ => Value::None,
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'static> {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

/// Read interface onto a received message.
pub trait Record {
    /// Look up a single named field.
    fn field(&self, name: &str) -> Option<Value<'_>>;

    /// Names of every field, in a stable order.
    fn field_names(&self) -> Vec<&str>;

    /// The marshalled contents of the whole message.
    fn contents(&self) -> Cow<'_, str>;

    fn send_subject(&self) -> &str;

    /// Empty when the message carries no reply subject.
    fn reply_subject(&self) -> &str;

    /// Empty when the message carries no tracking id.
    fn tracking_id(&self) -> &str;

    fn timestamp(&self) -> DateTime<Utc>;
}

/// A decoded bus message.
///
/// Only `send_subject` is required when deserializing; the timestamp
/// defaults to the time of decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Receive timestamp (UTC).
    #[serde(default = "Utc::now")]
    pub ts: DateTime<Utc>,
    pub send_subject: String,
    #[serde(default)]
    pub reply_subject: String,
    #[serde(default)]
    pub tracking_id: String,
    /// Message fields keyed by name. A sorted map keeps
    /// [`Record::field_names`] deterministic.
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Marshalled form as received. When absent, [`Record::contents`] renders
    /// the field map as compact JSON instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Message {
    pub fn new(send_subject: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            send_subject: send_subject.into(),
            reply_subject: String::new(),
            tracking_id: String::new(),
            fields: BTreeMap::new(),
            raw: None,
        }
    }
}

impl Record for Message {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        self.fields.get(name).map(Value::from_json)
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn contents(&self) -> Cow<'_, str> {
        match &self.raw {
            Some(raw) => Cow::Borrowed(raw),
            // Serializing a map of JSON values cannot fail.
            None => Cow::Owned(serde_json::to_string(&self.fields).unwrap_or_default()),
        }
    }

    fn send_subject(&self) -> &str {
        &self.send_subject
    }

    fn reply_subject(&self) -> &str {
        &self.reply_subject
    }

    fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.ts
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
