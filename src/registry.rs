// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Creation-ordered registry of entries.
//!
//! A doubly linked sequence of [`EntryId`]s, threaded through a link
//! table indexed by the same handle the arena hands out. The sequence
//! keeps a hierarchical order on top of creation order:
//!
//! ```text
//! /a            every path follows its parent,
//! /a/b          and a path's descendants sit in one
//! /a/b/x        contiguous block right after it
//! /a/c
//! /d
//! ```
//!
//! Listing children is one forward scan, and deleting a subtree is a
//! contiguous run of removals starting at its root.

use std::collections::HashSet;

use crate::entry::{EntryArena, EntryId};
use crate::error::InvariantViolation;
use crate::path::Path;

#[derive(Debug, Clone, Copy)]
struct Links {
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

#[derive(Debug, Default)]
pub struct Registry {
    links: Vec<Option<Links>>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    len: usize,
}

impl Registry {
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

    #[inline]
    fn links(&self, id: EntryId) -> Option<Links> {
        self.links.get(id.index()).copied().flatten()
    }

    #[inline]
    pub fn next(&self, id: EntryId) -> Option<EntryId> {
        self.links(id)?.next
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.links(id).is_some()
    }

    fn set_links(&mut self, id: EntryId, links: Option<Links>) {
        let idx = id.index();
        if self.links.len() <= idx {
            self.links.resize(idx + 1, None);
        }
        self.links[idx] = links;
    }

    fn set_prev(&mut self, id: EntryId, prev: Option<EntryId>) {
        if let Some(Some(links)) = self.links.get_mut(id.index()) {
            links.prev = prev;
        }
    }

    fn set_next(&mut self, id: EntryId, next: Option<EntryId>) {
        if let Some(Some(links)) = self.links.get_mut(id.index()) {
            links.next = next;
        }
    }

    /// Splice `id` in before `next`, or append when `next` is `None`.
    pub fn insert_before(&mut self, id: EntryId, next: Option<EntryId>) {
        debug_assert!(!self.contains(id), "entry {:?} already registered", id);

        let prev = match next {
            Some(next) => self.links(next).and_then(|l| l.prev),
            None => self.tail,
        };
        self.set_links(id, Some(Links { prev, next }));

        match prev {
            Some(prev) => self.set_next(prev, Some(id)),
            None => self.head = Some(id),
        }
        match next {
            Some(next) => self.set_prev(next, Some(id)),
            None => self.tail = Some(id),
        }
        self.len += 1;
    }

    /// Where a new entry for `path` must go: the node to insert before,
    /// or `None` to append.
    ///
    /// Top-level paths, and paths whose parent is not registered, are
    /// appended. Otherwise the new entry lands at the end of its parent's
    /// descendant block.
    pub fn insertion_point(&self, entries: &EntryArena, path: &Path) -> Option<EntryId> {
        let parent = path.parent()?;
        let depth = parent.segment_count();
        let parent_id = self.find(entries, &parent)?;

        let mut cursor = self.next(parent_id);
        while let Some(id) = cursor {
            if entries.path(id).segment_count() <= depth {
                return Some(id);
            }
            cursor = self.next(id);
        }
        None
    }

    /// Insert `id` at the position that keeps the hierarchy contiguous.
    ///
    /// Returns the node it was placed before. Further entries belonging to
    /// the same new subtree can be spliced before that same node with
    /// [`Self::insert_before`] without rescanning.
    pub fn insert_maintaining_hierarchy(
        &mut self,
        entries: &EntryArena,
        id: EntryId,
    ) -> Option<EntryId> {
        let next = self.insertion_point(entries, entries.path(id));
        self.insert_before(id, next);
        next
    }

    /// Linear scan for the node holding `path`.
    pub fn find(&self, entries: &EntryArena, path: &Path) -> Option<EntryId> {
        self.iter().find(|&id| entries.path(id) == path)
    }

    /// Unlink `id` and return the node that followed it.
    ///
    /// The entry itself stays in the arena; the caller frees it once it is
    /// gone from the index as well.
    pub fn remove(&mut self, id: EntryId) -> Option<EntryId> {
        let Links { prev, next } = self.links(id)?;
        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }
        self.set_links(id, None);
        self.len -= 1;
        next
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Walk in registry order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            cursor: self.head,
        }
    }

    /// Names of the immediate children of `ancestor` (`None` is the root),
    /// in registry order. Deeper descendants are skipped.
    pub fn children<'a>(
        &'a self,
        entries: &'a EntryArena,
        ancestor: Option<&'a Path>,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let depth = ancestor.map_or(0, Path::segment_count);
        self.iter().filter_map(move |id| {
            let path = entries.path(id);
            if path.segment_count() != depth + 1 {
                return None;
            }
            path.child_name_relative_to(ancestor)
        })
    }

    /// Verify link symmetry and the hierarchical order.
    pub fn check_contiguous(&self, entries: &EntryArena) -> Result<(), InvariantViolation> {
        let mut walked = 0usize;
        let mut prev: Option<EntryId> = None;
        let mut seen: HashSet<&Path> = HashSet::with_capacity(self.len);
        // Paths whose descendant block is still open, outermost first.
        let mut open: Vec<&Path> = Vec::new();

        for id in self.iter() {
            let links = self.links(id).ok_or_else(|| {
                InvariantViolation::StructureMismatch(format!("unlinked node {:?} reachable", id))
            })?;
            if links.prev != prev {
                return Err(InvariantViolation::StructureMismatch(format!(
                    "broken back link at {}",
                    entries.path(id)
                )));
            }
            walked += 1;
            if walked > self.len {
                return Err(InvariantViolation::StructureMismatch(
                    "registry walk exceeds its length".into(),
                ));
            }

            let path = entries.path(id);
            while open.last().is_some_and(|top| !top.is_ancestor_of(path)) {
                open.pop();
            }
            if let Some(parent) = path.parent() {
                match open.last() {
                    Some(top) if **top == parent => {}
                    _ if seen.contains(&parent) => {
                        return Err(InvariantViolation::NotContiguous {
                            path: parent.to_string(),
                        })
                    }
                    _ => {
                        return Err(InvariantViolation::ParentMissing {
                            path: path.to_string(),
                        })
                    }
                }
            }
            seen.insert(path);
            open.push(path);
            prev = Some(id);
        }

        if walked != self.len || prev != self.tail {
            return Err(InvariantViolation::StructureMismatch(format!(
                "registry length {} but walked {}",
                self.len, walked
            )));
        }
        Ok(())
    }
}

/// Forward iterator over registered handles.
pub struct Iter<'a> {
    registry: &'a Registry,
    cursor: Option<EntryId>,
}

impl Iterator for Iter<'_> {
    type Item = EntryId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.registry.next(id);
        Some(id)
    }
}
