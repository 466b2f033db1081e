//! Live filter view over the classification table.
//!
//! A downstream filtered list asks [`TypeFilter::matches`] whether a record
//! is currently visible, and subscribes to [`FilterEvent`]s so it knows when
//! to re-run the filter:
//!
//! - [`FilterEvent::Constrained`]: the filter became stricter. Only records
//!   that are currently visible need rechecking.
//! - [`FilterEvent::Relaxed`]: the filter became looser. Only records that are
//!   currently hidden need rechecking.
//! - [`FilterEvent::Changed`]: neither; rescan everything.
//!
//! Events are delivered after the table's write lock has been released, so a
//! listener can query the table (or even mutate it) from inside its callback.
//! Concurrent writers may deliver their events in either order.

use crate::record::Record;
use crate::table::ClassificationTable;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// How the visibility predicate changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterEvent {
    Constrained,
    Relaxed,
    Changed,
}

/// Receives [`FilterEvent`]s. Implemented for any `Fn(FilterEvent)` closure.
pub trait FilterListener: Send + Sync {
    fn filter_changed(&self, event: FilterEvent);
}

impl<F> FilterListener for F
where
    F: Fn(FilterEvent) + Send + Sync,
{
    fn filter_changed(&self, event: FilterEvent) {
        self(event)
    }
}

/// Handle returned by [`TypeFilter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Entry = (SubscriptionId, Arc<dyn FilterListener>);

/// The listener list. The mutex is only held to copy or edit the list, never
/// while a listener runs.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, listener: Arc<dyn FilterListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, listener));
        tracing::trace!(subscription = %id, "filter listener subscribed");
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        before != entries.len()
    }

    pub(crate) fn fire(&self, event: FilterEvent) {
        let snapshot: Vec<Arc<dyn FilterListener>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::trace!(?event, listeners = snapshot.len(), "delivering filter event");
        for listener in snapshot {
            listener.filter_changed(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

// ---------------------------------------------------------------------------
// Event derivation
// ---------------------------------------------------------------------------

/// Records that used to classify to a type with `selected == from` may now
/// classify to types carrying any of the flags in `to`.
pub(crate) fn moved_from(from: bool, to: impl IntoIterator<Item = bool>) -> Option<FilterEvent> {
    if !to.into_iter().any(|flag| flag != from) {
        return None;
    }
    Some(if from {
        FilterEvent::Constrained
    } else {
        FilterEvent::Relaxed
    })
}

/// Records that used to classify to types carrying the flags in `from` may
/// now classify to a single type with `selected == to`.
pub(crate) fn moved_into(from: impl IntoIterator<Item = bool>, to: bool) -> Option<FilterEvent> {
    if !from.into_iter().any(|flag| flag != to) {
        return None;
    }
    Some(if to {
        FilterEvent::Relaxed
    } else {
        FilterEvent::Constrained
    })
}

/// Records may move between any of the types carrying these flags, in
/// either direction.
pub(crate) fn reshuffled(flags: impl IntoIterator<Item = bool>) -> Option<FilterEvent> {
    let mut flags = flags.into_iter();
    let first = flags.next()?;
    flags.any(|flag| flag != first).then_some(FilterEvent::Changed)
}

/// The whole type list was swapped out.
pub(crate) fn replaced(
    before: impl IntoIterator<Item = bool>,
    after: impl IntoIterator<Item = bool>,
) -> Option<FilterEvent> {
    let (before_all, before_none) = uniformity(before);
    let (after_all, after_none) = uniformity(after);
    if (before_all && after_all) || (before_none && after_none) {
        None
    } else if after_all || before_none {
        Some(FilterEvent::Relaxed)
    } else if after_none || before_all {
        Some(FilterEvent::Constrained)
    } else {
        Some(FilterEvent::Changed)
    }
}

/// `(every flag set, no flag set)`
fn uniformity(flags: impl IntoIterator<Item = bool>) -> (bool, bool) {
    flags
        .into_iter()
        .fold((true, true), |(all, none), flag| (all && flag, none && !flag))
}

// ---------------------------------------------------------------------------
// TypeFilter
// ---------------------------------------------------------------------------

/// The filter view handed to a live-filtered record list.
///
/// Cheap to clone; every clone observes the same table and listener list.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    table: Arc<ClassificationTable>,
}

impl TypeFilter {
    pub(crate) fn new(table: Arc<ClassificationTable>) -> Self {
        Self { table }
    }

    /// Whether `record` should currently be shown: its first matching type
    /// is selected.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.table.is_visible(record)
    }

    pub fn subscribe(&self, listener: impl FilterListener + 'static) -> SubscriptionId {
        self.table.listeners().subscribe(Arc::new(listener))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.table.listeners().unsubscribe(id)
    }

    /// Tell subscribers the filter became stricter for reasons outside the
    /// table.
    pub fn constrain(&self) {
        self.table.listeners().fire(FilterEvent::Constrained);
    }

    /// Tell subscribers the filter became looser for reasons outside the
    /// table.
    pub fn relax(&self) {
        self.table.listeners().fire(FilterEvent::Relaxed);
    }

    pub fn table(&self) -> &Arc<ClassificationTable> {
        &self.table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
