//! Dynamic lists with stable entry identity.
//!
//! A [`FieldArray`] tracks one [`EntryId`] per entry of a list stored in the
//! form values. Ids are handed out by a per-form [`IdAllocator`] when an
//! entry is created and stay attached to that entry while siblings are added
//! or removed, so renderers can key input groups by id instead of position.

use std::fmt::{self, Display};

use serde::Serialize;
use serde_json::Value;

/// Stable identity of a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(u64);

impl EntryId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// Monotonic id source. Ids are never reused within one form.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn next_id(&mut self) -> EntryId {
        let id = EntryId(self.next);
        self.next += 1;
        id
    }
}

/// Identity bookkeeping for one list.
///
/// The ids are kept in step with the list's values: entry `i` of the values
/// is keyed by `ids()[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldArray {
    ids: Vec<EntryId>,
}

impl FieldArray {
    pub(crate) fn keyed(len: usize, alloc: &mut IdAllocator) -> Self {
        Self {
            ids: (0..len).map(|_| alloc.next_id()).collect(),
        }
    }

    /// Entry ids in list order.
    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Current position of the entry with `id`.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.ids.iter().position(|&other| other == id)
    }

    /// Pushes `entry` onto `items` under a fresh id.
    pub(crate) fn append(
        &mut self,
        items: &mut Vec<Value>,
        entry: Value,
        alloc: &mut IdAllocator,
    ) -> EntryId {
        let id = alloc.next_id();
        items.push(entry);
        self.ids.push(id);
        id
    }

    /// Removes the entry at `index` from both `items` and the ids.
    ///
    /// Returns `None` when `index` is out of range.
    pub(crate) fn remove(&mut self, items: &mut Vec<Value>, index: usize) -> Option<(EntryId, Value)> {
        if index >= items.len() || index >= self.ids.len() {
            return None;
        }
        let value = items.remove(index);
        let id = self.ids.remove(index);
        Some((id, value))
    }

    /// Discards all ids and issues fresh ones for `len` entries.
    pub(crate) fn rekey(&mut self, len: usize, alloc: &mut IdAllocator) {
        *self = Self::keyed(len, alloc);
    }
}
