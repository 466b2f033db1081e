//! Error type shared by every fallible operation in rvsnoop-core.
//!
//! Matching never fails. Only construction (accessors, predicates, imported
//! definitions) and table mutation return errors, and a failed mutation always
//! leaves the table exactly as it was.

use crate::record_type::RecordTypeId;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An accessor or predicate identifier (or display name) is not registered.
    #[error("unknown {registry}: {value:?}")]
    InvalidIdentifier {
        /// Which lookup failed, e.g. `"accessor identifier"`.
        registry: &'static str,
        value: String,
    },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A `regex` predicate argument that does not compile.
    #[error("invalid regex pattern {pattern:?}: {detail}")]
    InvalidPattern { pattern: String, detail: String },

    #[error("record type name already in use: {name:?}")]
    NameConflict { name: String },

    /// The default catch-all type cannot lose its match-everything rule.
    #[error("record type {name:?} is protected")]
    ProtectedType { name: String },

    #[error("no record type with id {id}")]
    UnknownType { id: RecordTypeId },
}

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }
}
