//! rvsnoop-core: record classification and predicate matching.
//!
//! Incoming messages are classified by scanning an ordered list of
//! [`RecordType`]s and taking the first whose [`RecordMatcher`] accepts the
//! record. The last type always matches, so every record gets a type.
//!
//! ```text
//! Record ──► FieldAccessor ──► Value ──► Predicate
//!                 └──────── RecordMatcher ────────┘
//!                                │
//!            ClassificationTable (RwLock) ──► TypeFilter ──► listeners
//! ```
//!
//! The table is an ordinary value. Create one per session, wrap it in an
//! `Arc`, and hand it to whoever needs it.

pub mod accessor;
pub mod color;
pub mod config;
pub mod definitions;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod predicate;
pub mod record;
pub mod record_type;
pub mod table;

pub use accessor::FieldAccessor;
pub use color::Color;
pub use definitions::{MatcherDef, RecordTypeDef, TypeDefinitions};
pub use error::{Error, Result};
pub use filter::{FilterEvent, FilterListener, SubscriptionId, TypeFilter};
pub use matcher::{RecordMatcher, DEFAULT_MATCHER};
pub use predicate::{Predicate, PredicateKind};
pub use record::{Message, Record, Value};
pub use record_type::{RecordType, RecordTypeId};
pub use table::ClassificationTable;
