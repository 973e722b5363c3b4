// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entry records and the arena that owns them.
//!
//! The ordered index and the registry never hold an [`Entry`] directly;
//! both store the same [`EntryId`] handle into one [`EntryArena`]. A value
//! update therefore happens once and is seen by both structures, and an
//! entry is freed exactly once, by [`EntryArena::remove`].

use crate::path::Path;

/// Handle to an entry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

impl EntryId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// The stored record for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: Path,
    /// `None` for an ancestor created implicitly and never set.
    pub value: Option<String>,
}

impl Entry {
    pub fn new(path: Path, value: Option<String>) -> Self {
        Self { path, value }
    }
}

/// Slot storage with a free list for recycled handles.
#[derive(Debug, Default)]
pub struct EntryArena {
    slots: Vec<Option<Entry>>,
    free: Vec<EntryId>,
    len: usize,
}

impl EntryArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, entry: Entry) -> EntryId {
        self.len += 1;
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(entry);
            return id;
        }
        let id = EntryId(self.slots.len());
        self.slots.push(Some(entry));
        id
    }

    #[inline]
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Free a slot. Returns the entry that lived there.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let entry = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id);
        self.len -= 1;
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    /// Path of a live entry. Handles held by the index and the registry
    /// are always live, so a miss here means structural corruption.
    pub(crate) fn path(&self, id: EntryId) -> &Path {
        match self.get(id) {
            Some(entry) => &entry.path,
            None => panic!("dangling entry handle {:?}", id),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EntryId(i), e)))
    }
}
