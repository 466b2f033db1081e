//! Record matchers: boolean tests over a whole record.
//!
//! A [`RecordMatcher`] is either the catch-all [`RecordMatcher::Any`], one
//! accessor paired with one predicate, or an AND/OR/NOT composite of other
//! matchers. Matchers are immutable values; a record type that needs a
//! different rule gets a new matcher.

use crate::accessor::FieldAccessor;
use crate::error::Result;
use crate::predicate::{Predicate, PredicateKind};
use crate::record::Record;
use std::fmt;

/// A boolean test over a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordMatcher {
    /// Matches every record. Used by the default type.
    Any,
    /// Extract one view with `accessor` and test it with `predicate`.
    Field {
        accessor: FieldAccessor,
        predicate: Predicate,
    },
    /// All must match; stops at the first miss. Empty is `true`.
    And(Vec<RecordMatcher>),
    /// Any must match; stops at the first hit. Empty is `false`.
    Or(Vec<RecordMatcher>),
    Not(Box<RecordMatcher>),
}

/// The always-true matcher.
pub const DEFAULT_MATCHER: RecordMatcher = RecordMatcher::Any;

impl Default for RecordMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER
    }
}

impl RecordMatcher {
    pub fn field(accessor: FieldAccessor, predicate: Predicate) -> Self {
        RecordMatcher::Field {
            accessor,
            predicate,
        }
    }

    /// Build a single accessor/predicate matcher from persisted identifiers.
    ///
    /// # Errors
    ///
    /// Any construction error from [`FieldAccessor::from_identifier`] or
    /// [`Predicate::from_identifier`].
    pub fn from_identifiers(
        accessor: &str,
        predicate: &str,
        argument: impl Into<String>,
        ignoring_case: bool,
    ) -> Result<Self> {
        Ok(Self::field(
            FieldAccessor::from_identifier(accessor)?,
            Predicate::from_identifier(predicate, argument, ignoring_case)?,
        ))
    }

    /// Case-sensitive "send subject contains `argument`".
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) if
    /// `argument` is empty.
    pub fn send_subject_contains(argument: impl Into<String>) -> Result<Self> {
        Ok(Self::field(
            FieldAccessor::SendSubject,
            Predicate::new(PredicateKind::Contains, argument, false)?,
        ))
    }

    /// Case-sensitive "send subject starts with `argument`".
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) if
    /// `argument` is empty.
    pub fn send_subject_starts_with(argument: impl Into<String>) -> Result<Self> {
        Ok(Self::field(
            FieldAccessor::SendSubject,
            Predicate::new(PredicateKind::StartsWith, argument, false)?,
        ))
    }

    pub fn and(matchers: impl IntoIterator<Item = RecordMatcher>) -> Self {
        RecordMatcher::And(matchers.into_iter().collect())
    }

    pub fn or(matchers: impl IntoIterator<Item = RecordMatcher>) -> Self {
        RecordMatcher::Or(matchers.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(matcher: RecordMatcher) -> Self {
        RecordMatcher::Not(Box::new(matcher))
    }

    /// `true` for the unconditional catch-all.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, RecordMatcher::Any)
    }

    /// One-line human readable rule, e.g. `Send Subject contains "ERROR"`.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        match self {
            RecordMatcher::Any => true,
            RecordMatcher::Field {
                accessor,
                predicate,
            } => predicate.matches(&accessor.extract(record)),
            RecordMatcher::And(matchers) => matchers.iter().all(|m| m.matches(record)),
            RecordMatcher::Or(matchers) => matchers.iter().any(|m| m.matches(record)),
            RecordMatcher::Not(matcher) => !matcher.matches(record),
        }
    }
}

impl fmt::Display for RecordMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[RecordMatcher], op: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{part}")?;
            }
            f.write_str(")")
        }

        match self {
            RecordMatcher::Any => f.write_str("matches everything"),
            RecordMatcher::Field {
                accessor,
                predicate,
            } => write!(f, "{accessor} {predicate}"),
            RecordMatcher::And(parts) => join(f, parts, "and"),
            RecordMatcher::Or(parts) => join(f, parts, "or"),
            RecordMatcher::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
