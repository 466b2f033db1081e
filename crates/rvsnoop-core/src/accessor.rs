//! Field accessors and their registry.
//!
//! A [`FieldAccessor`] pulls one named view out of a [`Record`]. The set of
//! accessors is closed; each variant has a stable identifier (part of the
//! persisted definition format) and a display name (for selection UI).
//!
//! Lookup goes through two compile-time ordered maps, so the registry needs
//! no initialisation and iterates in registration order. Adding an accessor
//! means one new variant, one arm in each `match` below and one row in each
//! map.

use crate::error::{Error, Result};
use crate::record::{Record, Value};
use phf::phf_ordered_map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Extracts one string view from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAccessor {
    /// The marshalled contents of the whole message.
    FieldContents,
    /// Every field name, joined with `", "`.
    FieldNames,
    ReplySubject,
    SendSubject,
    TrackingId,
}

static BY_IDENTIFIER: phf::OrderedMap<&'static str, FieldAccessor> = phf_ordered_map! {
    "fieldContents" => FieldAccessor::FieldContents,
    "fieldNames" => FieldAccessor::FieldNames,
    "replySubject" => FieldAccessor::ReplySubject,
    "sendSubject" => FieldAccessor::SendSubject,
    "trackingId" => FieldAccessor::TrackingId,
};

static BY_DISPLAY_NAME: phf::OrderedMap<&'static str, FieldAccessor> = phf_ordered_map! {
    "Field Contents" => FieldAccessor::FieldContents,
    "Field Names" => FieldAccessor::FieldNames,
    "Reply Subject" => FieldAccessor::ReplySubject,
    "Send Subject" => FieldAccessor::SendSubject,
    "Tracking ID" => FieldAccessor::TrackingId,
};

/// Separator used by [`FieldAccessor::FieldNames`].
pub const FIELD_NAME_SEPARATOR: &str = ", ";

impl FieldAccessor {
    /// Persisted identifier. Never rename one of these.
    pub fn identifier(self) -> &'static str {
        match self {
            FieldAccessor::FieldContents => "fieldContents",
            FieldAccessor::FieldNames => "fieldNames",
            FieldAccessor::ReplySubject => "replySubject",
            FieldAccessor::SendSubject => "sendSubject",
            FieldAccessor::TrackingId => "trackingId",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FieldAccessor::FieldContents => "Field Contents",
            FieldAccessor::FieldNames => "Field Names",
            FieldAccessor::ReplySubject => "Reply Subject",
            FieldAccessor::SendSubject => "Send Subject",
            FieldAccessor::TrackingId => "Tracking ID",
        }
    }

    /// Resolve a persisted identifier.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] carrying `identifier` when nothing is
    /// registered under it.
    pub fn from_identifier(identifier: &str) -> Result<Self> {
        BY_IDENTIFIER
            .get(identifier)
            .copied()
            .ok_or_else(|| Error::InvalidIdentifier {
                registry: "accessor identifier",
                value: identifier.to_string(),
            })
    }

    /// Resolve a display name as shown in selection UI.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] carrying `name` when nothing is
    /// registered under it.
    pub fn from_display_name(name: &str) -> Result<Self> {
        BY_DISPLAY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| Error::InvalidIdentifier {
                registry: "accessor display name",
                value: name.to_string(),
            })
    }

    /// Display names in registration order.
    pub fn display_names() -> impl Iterator<Item = &'static str> {
        BY_DISPLAY_NAME.keys().copied()
    }

    /// Every accessor in registration order.
    pub fn all() -> impl Iterator<Item = FieldAccessor> {
        BY_IDENTIFIER.values().copied()
    }

    /// Pull this accessor's view out of `record`.
    pub fn extract<'r, R: Record + ?Sized>(self, record: &'r R) -> Value<'r> {
        match self {
            FieldAccessor::FieldContents => Value::Str(record.contents()),
            FieldAccessor::FieldNames => {
                Value::from(record.field_names().join(FIELD_NAME_SEPARATOR))
            }
            FieldAccessor::ReplySubject => Value::from(record.reply_subject()),
            FieldAccessor::SendSubject => Value::from(record.send_subject()),
            FieldAccessor::TrackingId => Value::from(record.tracking_id()),
        }
    }
}

impl fmt::Display for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for FieldAccessor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_identifier(s)
    }
}

impl Serialize for FieldAccessor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.identifier())
    }
}

impl<'de> Deserialize<'de> for FieldAccessor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_identifier(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
