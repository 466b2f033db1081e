//! Record types: named, coloured classification rules.
//!
//! A [`RecordType`] value is an immutable snapshot. The
//! [`ClassificationTable`](crate::ClassificationTable) edits a type by
//! swapping in a new snapshot with the same [`RecordTypeId`] while it holds
//! its write lock, so a reader sees either the old rule or the new one, never
//! a mix. Collaborators that hold an `Arc<RecordType>` for display can refresh
//! it with [`ClassificationTable::get_by_id`](crate::ClassificationTable::get_by_id).

use crate::color::Color;
use crate::matcher::RecordMatcher;
use crate::record::Record;
use std::fmt;

/// Stable identity of a record type within one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordTypeId(pub(crate) u64);

impl RecordTypeId {
    /// The catch-all default type. Always present, never removable.
    pub const DEFAULT: RecordTypeId = RecordTypeId(0);

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    id: RecordTypeId,
    name: String,
    color: Color,
    matcher: RecordMatcher,
    selected: bool,
}

impl RecordType {
    /// New types start out selected (visible).
    pub(crate) fn new(
        id: RecordTypeId,
        name: String,
        color: Color,
        matcher: RecordMatcher,
    ) -> Self {
        Self {
            id,
            name,
            color,
            matcher,
            selected: true,
        }
    }

    pub fn id(&self) -> RecordTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn matcher(&self) -> &RecordMatcher {
        &self.matcher
    }

    /// Whether records of this type pass the live filter.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_default(&self) -> bool {
        self.id == RecordTypeId::DEFAULT
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.matcher.matches(record)
    }

    pub(crate) fn with_name(&self, name: String) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    pub(crate) fn with_color(&self, color: Color) -> Self {
        Self {
            color,
            ..self.clone()
        }
    }

    pub(crate) fn with_matcher(&self, matcher: RecordMatcher) -> Self {
        Self {
            matcher,
            ..self.clone()
        }
    }

    pub(crate) fn with_selected(&self, selected: bool) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
