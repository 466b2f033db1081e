//! Test builders: ergonomic constructors for `Message`, tables and event logs.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use parking_lot::Mutex;
use rvsnoop::{
    ClassificationTable, Color, FilterEvent, Message, RecordMatcher, RecordType, TypeFilter,
};
use std::collections::BTreeMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// MessageBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Message`] test fixtures.
///
/// # Example
///
/// ```rust
/// let msg = MessageBuilder::new("ORDERS.NEW")
///     .reply_subject("_INBOX.42")
///     .tracking_id("trk-1")
///     .field("qty", 3)
///     .build();
/// ```
pub struct MessageBuilder {
    ts: chrono::DateTime<chrono::Utc>,
    send_subject: String,
    reply_subject: String,
    tracking_id: String,
    fields: BTreeMap<String, serde_json::Value>,
    raw: Option<String>,
}

impl MessageBuilder {
    pub fn new(send_subject: impl Into<String>) -> Self {
        Self {
            ts: chrono::Utc::now(),
            send_subject: send_subject.into(),
            reply_subject: String::new(),
            tracking_id: String::new(),
            fields: BTreeMap::new(),
            raw: None,
        }
    }

    pub fn reply_subject(mut self, subject: impl Into<String>) -> Self {
        self.reply_subject = subject.into();
        self
    }

    pub fn tracking_id(mut self, id: impl Into<String>) -> Self {
        self.tracking_id = id.into();
        self
    }

    pub fn ts(mut self, ts: chrono::DateTime<chrono::Utc>) -> Self {
        self.ts = ts;
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn build(self) -> Message {
        Message {
            ts: self.ts,
            send_subject: self.send_subject,
            reply_subject: self.reply_subject,
            tracking_id: self.tracking_id,
            fields: self.fields,
            raw: self.raw,
        }
    }
}

/// A message with only a send subject.
pub fn msg(send_subject: &str) -> Message {
    MessageBuilder::new(send_subject).build()
}

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

/// A shared table holding the seed types.
pub fn seeded_table() -> Arc<ClassificationTable> {
    Arc::new(ClassificationTable::new())
}

/// Add a send-subject-contains type, panicking on error.
pub fn add_contains(
    table: &ClassificationTable,
    name: &str,
    needle: &str,
    color: Color,
) -> Arc<RecordType> {
    let matcher = RecordMatcher::send_subject_contains(needle).expect("valid needle");
    table
        .create_type_with(name, color, matcher)
        .expect("name not in use")
}

/// Type names in priority order.
pub fn type_names(table: &ClassificationTable) -> Vec<String> {
    table
        .all_types()
        .iter()
        .map(|t| t.name().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Records every [`FilterEvent`] delivered to a subscribed filter.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<FilterEvent>>>,
}

impl EventLog {
    pub fn attach(filter: &TypeFilter) -> Self {
        let log = Self::default();
        let sink = Arc::clone(&log.events);
        filter.subscribe(move |event: FilterEvent| sink.lock().push(event));
        log
    }

    /// Take everything recorded so far.
    pub fn drain(&self) -> Vec<FilterEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}
