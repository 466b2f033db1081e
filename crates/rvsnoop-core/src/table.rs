//! The classification table: an ordered, concurrently readable list of
//! record types.
//!
//! Classification scans the list in priority order and returns the first type
//! whose matcher accepts the record. The default type matches everything and
//! is always last, so classification cannot fail.
//!
//! All state sits behind one writer-preferring [`RwLock`]. Readers hold the
//! read lock for a whole scan. Writers hold the write lock for a whole
//! mutation, including name generation and conflict checks, and compute the
//! resulting [`FilterEvent`] before releasing it. The event is delivered after
//! the lock is gone.

use crate::color::Color;
use crate::definitions::{MatcherDef, RecordTypeDef, TypeDefinitions};
use crate::error::{Error, Result};
use crate::filter::{self, FilterEvent, Listeners, TypeFilter};
use crate::matcher::RecordMatcher;
use crate::record::Record;
use crate::record_type::{RecordType, RecordTypeId};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const AUTO_NAME_PREFIX: &str = "My Record Type #";
pub const DEFAULT_TYPE_NAME: &str = "Normal";

/// Rules in priority order, then the catch-all.
#[derive(Debug)]
struct TypeList {
    rules: Vec<Arc<RecordType>>,
    default: Arc<RecordType>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Rule(usize),
    Default,
}

impl TypeList {
    fn iter(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.rules.iter().chain(iter::once(&self.default))
    }

    fn len(&self) -> usize {
        self.rules.len() + 1
    }

    fn flags(&self) -> Vec<bool> {
        self.iter().map(|t| t.is_selected()).collect()
    }

    /// Selection flags of `rules[index..]` followed by the default type.
    fn flags_from(&self, index: usize) -> impl Iterator<Item = bool> + '_ {
        self.rules[index.min(self.rules.len())..]
            .iter()
            .chain(iter::once(&self.default))
            .map(|t| t.is_selected())
    }

    fn first_match<R: Record + ?Sized>(&self, record: &R) -> &Arc<RecordType> {
        self.rules
            .iter()
            .find(|t| t.matches(record))
            .unwrap_or(&self.default)
    }

    fn slot(&self, id: RecordTypeId) -> Result<Slot> {
        if id == RecordTypeId::DEFAULT {
            return Ok(Slot::Default);
        }
        self.rules
            .iter()
            .position(|t| t.id() == id)
            .map(Slot::Rule)
            .ok_or(Error::UnknownType { id })
    }

    fn get(&self, slot: Slot) -> &Arc<RecordType> {
        match slot {
            Slot::Rule(i) => &self.rules[i],
            Slot::Default => &self.default,
        }
    }

    fn set(&mut self, slot: Slot, record_type: Arc<RecordType>) {
        match slot {
            Slot::Rule(i) => self.rules[i] = record_type,
            Slot::Default => self.default = record_type,
        }
    }

    fn name_in_use(&self, name: &str) -> bool {
        self.iter().any(|t| t.name() == name)
    }

    /// `"My Record Type #n"` for the smallest unused `n >= 1`.
    fn auto_name(&self) -> String {
        let mut n = 1u64;
        loop {
            let name = format!("{AUTO_NAME_PREFIX}{n}");
            if !self.name_in_use(&name) {
                return name;
            }
            n += 1;
        }
    }

    /// Insert just ahead of the default type.
    fn push_rule(&mut self, record_type: Arc<RecordType>) -> Option<FilterEvent> {
        let event = filter::moved_into([self.default.is_selected()], record_type.is_selected());
        self.rules.push(record_type);
        event
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_argument("record type name must not be empty"));
    }
    Ok(())
}

fn default_type() -> Arc<RecordType> {
    Arc::new(RecordType::new(
        RecordTypeId::DEFAULT,
        DEFAULT_TYPE_NAME.to_string(),
        Color::BLACK,
        RecordMatcher::Any,
    ))
}

/// Shared, thread-safe store of record types.
///
/// Create one per session and pass it around as `Arc<ClassificationTable>`.
#[derive(Debug)]
pub struct ClassificationTable {
    types: RwLock<TypeList>,
    next_id: AtomicU64,
    listeners: Listeners,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::len_without_is_empty)]
impl ClassificationTable {
    /// A table holding the built-in seed types.
    pub fn new() -> Self {
        let table = Self::empty();
        let seeds = table.seed_list();
        *table.types.write() = seeds;
        table
    }

    /// A table holding only the default type.
    pub fn empty() -> Self {
        Self {
            types: RwLock::new(TypeList {
                rules: Vec::new(),
                default: default_type(),
            }),
            next_id: AtomicU64::new(1),
            listeners: Listeners::default(),
        }
    }

    /// A table built from persisted definitions.
    ///
    /// # Errors
    ///
    /// As [`ClassificationTable::replace_all`].
    pub fn from_definitions(defs: &TypeDefinitions) -> Result<Self> {
        let table = Self::empty();
        let list = table.build_list(defs)?;
        *table.types.write() = list;
        Ok(table)
    }

    /// The live filter view. Every view of one table shares its listeners.
    pub fn filter(self: &Arc<Self>) -> TypeFilter {
        TypeFilter::new(Arc::clone(self))
    }

    pub(crate) fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    fn next_id(&self) -> RecordTypeId {
        RecordTypeId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn seed_rule(
        &self,
        name: &str,
        color: Color,
        matcher: Result<RecordMatcher>,
    ) -> Arc<RecordType> {
        let matcher = matcher.expect("built-in seed rules must be valid");
        Arc::new(RecordType::new(self.next_id(), name.to_string(), color, matcher))
    }

    fn seed_list(&self) -> TypeList {
        TypeList {
            rules: vec![
                self.seed_rule(
                    "Error",
                    Color::RED,
                    RecordMatcher::send_subject_contains("ERROR"),
                ),
                self.seed_rule(
                    "Warning",
                    Color::ORANGE,
                    RecordMatcher::send_subject_contains("WARN"),
                ),
                self.seed_rule(
                    "System",
                    Color::GRAY,
                    RecordMatcher::send_subject_starts_with("_"),
                ),
            ],
            default: default_type(),
        }
    }

    /// Validate and build a complete list without touching the table.
    fn build_list(&self, defs: &TypeDefinitions) -> Result<TypeList> {
        let (rule_defs, default_def) = match defs.types.split_last() {
            Some((last, rest)) if last.matcher == MatcherDef::Any => (rest, Some(last)),
            _ => (defs.types.as_slice(), None),
        };

        let mut names = HashSet::with_capacity(defs.types.len() + 1);
        let mut claim = |name: &str| -> Result<()> {
            validate_name(name)?;
            if !names.insert(name.to_string()) {
                return Err(Error::NameConflict {
                    name: name.to_string(),
                });
            }
            Ok(())
        };

        let mut rules = Vec::with_capacity(rule_defs.len());
        for def in rule_defs {
            claim(&def.name)?;
            let matcher = def.matcher.build()?;
            let record_type = RecordType::new(self.next_id(), def.name.clone(), def.color, matcher)
                .with_selected(def.selected);
            rules.push(Arc::new(record_type));
        }

        let default = match default_def {
            Some(def) => {
                claim(&def.name)?;
                Arc::new(
                    RecordType::new(
                        RecordTypeId::DEFAULT,
                        def.name.clone(),
                        def.color,
                        RecordMatcher::Any,
                    )
                    .with_selected(def.selected),
                )
            }
            None => {
                claim(DEFAULT_TYPE_NAME)?;
                default_type()
            }
        };

        Ok(TypeList { rules, default })
    }

    /// Run `f` under the write lock, then deliver its event unlocked.
    fn write<T>(&self, f: impl FnOnce(&mut TypeList) -> (T, Option<FilterEvent>)) -> T {
        let (out, event) = {
            let mut list = self.types.write();
            f(&mut list)
        };
        if let Some(event) = event {
            self.listeners.fire(event);
        }
        out
    }

    fn try_write<T>(
        &self,
        f: impl FnOnce(&mut TypeList) -> Result<(T, Option<FilterEvent>)>,
    ) -> Result<T> {
        let (out, event) = {
            let mut list = self.types.write();
            f(&mut list)?
        };
        if let Some(event) = event {
            self.listeners.fire(event);
        }
        Ok(out)
    }

    fn swap_list(&self, next: TypeList) {
        self.write(|list| {
            let before = list.flags();
            *list = next;
            let event = filter::replaced(before, list.flags());
            ((), event)
        })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The first type, in priority order, whose matcher accepts `record`.
    pub fn classify<R: Record + ?Sized>(&self, record: &R) -> Arc<RecordType> {
        Arc::clone(self.types.read().first_match(record))
    }

    pub fn first_matching_type<R: Record + ?Sized>(&self, record: &R) -> Arc<RecordType> {
        self.classify(record)
    }

    /// Whether the type `record` classifies to is selected.
    pub fn is_visible<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.types.read().first_match(record).is_selected()
    }

    /// Snapshot of every type in priority order, default last.
    pub fn all_types(&self) -> Vec<Arc<RecordType>> {
        self.types.read().iter().cloned().collect()
    }

    /// Number of types, counting the default.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn get(&self, index: usize) -> Option<Arc<RecordType>> {
        self.types.read().iter().nth(index).cloned()
    }

    /// The current snapshot of the type with `id`, if it is still present.
    pub fn get_by_id(&self, id: RecordTypeId) -> Option<Arc<RecordType>> {
        let list = self.types.read();
        list.slot(id).ok().map(|slot| Arc::clone(list.get(slot)))
    }

    pub fn index_of(&self, id: RecordTypeId) -> Option<usize> {
        self.types.read().iter().position(|t| t.id() == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<RecordType>> {
        self.types.read().iter().find(|t| t.name() == name).cloned()
    }

    pub fn is_name_in_use(&self, name: &str) -> bool {
        self.types.read().name_in_use(name)
    }

    pub fn default_type(&self) -> Arc<RecordType> {
        Arc::clone(&self.types.read().default)
    }

    /// Export the current types in their persisted form.
    pub fn definitions(&self) -> TypeDefinitions {
        TypeDefinitions {
            types: self
                .types
                .read()
                .iter()
                .map(|t| RecordTypeDef::from(t.as_ref()))
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Add a black, match-everything type with the next free auto name.
    pub fn create_type(&self) -> Arc<RecordType> {
        self.create_auto_named(Color::BLACK, RecordMatcher::Any)
    }

    /// Add a type with the next free auto name and the given colour and rule.
    ///
    /// Naming and insertion share one write lock, so readers never see the
    /// type before it carries `matcher`.
    pub fn create_auto_named(&self, color: Color, matcher: RecordMatcher) -> Arc<RecordType> {
        self.write(|list| {
            let name = list.auto_name();
            let created = Arc::new(RecordType::new(self.next_id(), name, color, matcher));
            tracing::debug!(id = %created.id(), name = created.name(), "record type created");
            let event = list.push_rule(Arc::clone(&created));
            (created, event)
        })
    }

    /// Add a type with an explicit name, colour and rule.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for an empty name.
    /// - [`Error::NameConflict`] if another type already uses `name`.
    pub fn create_type_with(
        &self,
        name: &str,
        color: Color,
        matcher: RecordMatcher,
    ) -> Result<Arc<RecordType>> {
        validate_name(name)?;
        self.try_write(|list| {
            if list.name_in_use(name) {
                return Err(Error::NameConflict {
                    name: name.to_string(),
                });
            }
            let created = Arc::new(RecordType::new(
                self.next_id(),
                name.to_string(),
                color,
                matcher,
            ));
            tracing::debug!(id = %created.id(), name, "record type created");
            let event = list.push_rule(Arc::clone(&created));
            Ok((created, event))
        })
    }

    /// Remove a type. The default type and unknown ids are left alone and
    /// report `false`.
    pub fn remove_type(&self, id: RecordTypeId) -> bool {
        self.write(|list| {
            let Ok(Slot::Rule(index)) = list.slot(id) else {
                return (false, None);
            };
            let removed = list.rules.remove(index);
            tracing::debug!(%id, name = removed.name(), "record type removed");
            let event = filter::moved_from(removed.is_selected(), list.flags_from(index));
            (true, event)
        })
    }

    /// Move a type to `index` in priority order. The index is clamped so the
    /// default type stays last; moving the default type does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownType`] if `id` is not in the table.
    pub fn move_type(&self, id: RecordTypeId, index: usize) -> Result<()> {
        self.try_write(|list| {
            let Slot::Rule(from) = list.slot(id)? else {
                return Ok(((), None));
            };
            let to = index.min(list.rules.len() - 1);
            if from == to {
                return Ok(((), None));
            }
            let moved = list.rules.remove(from);
            list.rules.insert(to, moved);
            tracing::debug!(%id, from, to, "record type moved");
            let (lo, hi) = (from.min(to), from.max(to));
            let event = filter::reshuffled(list.rules[lo..=hi].iter().map(|t| t.is_selected()));
            Ok(((), event))
        })
    }

    /// # Errors
    ///
    /// - [`Error::UnknownType`] if `id` is not in the table.
    /// - [`Error::InvalidArgument`] for an empty name.
    /// - [`Error::NameConflict`] if another type already uses `name`.
    pub fn rename(&self, id: RecordTypeId, name: &str) -> Result<Arc<RecordType>> {
        self.try_write(|list| {
            let slot = list.slot(id)?;
            let current = list.get(slot);
            if current.name() == name {
                return Ok((Arc::clone(current), None));
            }
            validate_name(name)?;
            if list.name_in_use(name) {
                return Err(Error::NameConflict {
                    name: name.to_string(),
                });
            }
            tracing::debug!(%id, from = current.name(), to = name, "record type renamed");
            let updated = Arc::new(current.with_name(name.to_string()));
            list.set(slot, Arc::clone(&updated));
            Ok((updated, None))
        })
    }

    /// # Errors
    ///
    /// [`Error::UnknownType`] if `id` is not in the table.
    pub fn set_color(&self, id: RecordTypeId, color: Color) -> Result<Arc<RecordType>> {
        self.try_write(|list| {
            let slot = list.slot(id)?;
            let updated = Arc::new(list.get(slot).with_color(color));
            list.set(slot, Arc::clone(&updated));
            Ok((updated, None))
        })
    }

    /// Replace a type's rule.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownType`] if `id` is not in the table.
    /// - [`Error::ProtectedType`] for the default type.
    pub fn set_matcher(&self, id: RecordTypeId, matcher: RecordMatcher) -> Result<Arc<RecordType>> {
        self.try_write(|list| {
            let index = match list.slot(id)? {
                Slot::Rule(index) => index,
                Slot::Default => {
                    return Err(Error::ProtectedType {
                        name: list.default.name().to_string(),
                    })
                }
            };
            let updated = Arc::new(list.rules[index].with_matcher(matcher));
            tracing::debug!(%id, rule = %updated.matcher(), "record type matcher changed");
            list.rules[index] = Arc::clone(&updated);
            let event = filter::reshuffled(list.flags_from(index));
            Ok((updated, event))
        })
    }

    /// Show or hide records of a type.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownType`] if `id` is not in the table.
    pub fn set_selected(&self, id: RecordTypeId, selected: bool) -> Result<Arc<RecordType>> {
        self.try_write(|list| {
            let slot = list.slot(id)?;
            let current = list.get(slot);
            if current.is_selected() == selected {
                return Ok((Arc::clone(current), None));
            }
            let updated = Arc::new(current.with_selected(selected));
            list.set(slot, Arc::clone(&updated));
            tracing::debug!(%id, selected, "record type selection changed");
            let event = if selected {
                FilterEvent::Relaxed
            } else {
                FilterEvent::Constrained
            };
            Ok((updated, Some(event)))
        })
    }

    /// Atomically restore the built-in seed types. Every id changes.
    pub fn reset(&self) {
        let seeds = self.seed_list();
        tracing::debug!("record types reset to seeds");
        self.swap_list(seeds);
    }

    /// Atomically drop everything but a fresh default type.
    pub fn clear(&self) {
        tracing::debug!("record types cleared");
        self.swap_list(TypeList {
            rules: Vec::new(),
            default: default_type(),
        });
    }

    /// Atomically replace every type with `defs`.
    ///
    /// If the last definition has an `any` matcher it becomes the default
    /// type; otherwise a fresh default type is appended.
    ///
    /// # Errors
    ///
    /// The first invalid name, duplicate name, identifier, argument or
    /// pattern. The table is unchanged on error.
    pub fn replace_all(&self, defs: &TypeDefinitions) -> Result<()> {
        let list = self.build_list(defs).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected record type definitions");
        })?;
        tracing::debug!(types = list.len(), "record types replaced");
        self.swap_list(list);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
