// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The path store: arena, ordered index and registry kept in lockstep.
//!
//! # Structure
//!
//! ```text
//!                 ┌──────────────┐
//!   find ────────▶│ OrderedIndex │──┐
//!                 └──────────────┘  │  EntryId
//!                                   ▼
//!                            ┌────────────┐
//!                            │ EntryArena │  path + value, owned once
//!                            └────────────┘
//!                                   ▲
//!                 ┌──────────────┐  │  EntryId
//!   list/search ─▶│   Registry   │──┘
//!   delete        └──────────────┘
//! ```
//!
//! Every mutation goes through all three before returning, so a caller
//! never observes the index and the registry out of step.

use tracing::{debug, info, instrument};

use crate::config::{ChildOrder, StoreConfig};
use crate::entry::{Entry, EntryArena, EntryId};
use crate::error::{InvariantViolation, StoreError};
use crate::index::OrderedIndex;
use crate::metrics::{self, LatencyTimer};
use crate::path::Path;
use crate::registry::Registry;

/// What a [`PathStore::set`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOutcome {
    /// Entries created, implicit ancestors included.
    pub created: usize,
    /// The path existed and its value was replaced.
    pub updated: bool,
}

/// In-memory hierarchical path store.
///
/// # Example
///
/// ```
/// use path_store::{Path, PathStore, StoreError};
///
/// let mut store = PathStore::new();
/// let path = Path::parse("/usr/local/bin").unwrap();
/// store.set(&path, "binaries").unwrap();
///
/// assert_eq!(store.find(&path), Ok("binaries"));
/// assert_eq!(store.find(&Path::parse("/usr").unwrap()), Err(StoreError::NoData));
/// assert_eq!(store.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct PathStore {
    config: StoreConfig,
    entries: EntryArena,
    index: OrderedIndex,
    registry: Registry,
}

impl PathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of distinct paths, implicit ancestors included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains(path)
    }

    /// Height of the ordered index.
    pub fn index_height(&self) -> usize {
        self.index.height()
    }

    /// Set `path` to `value`, creating any missing ancestors without a
    /// value.
    ///
    /// An existing path has its value replaced in place. New entries (the
    /// missing ancestors and the path itself) are placed as one contiguous
    /// run at the end of the nearest existing ancestor's block.
    ///
    /// Only fails with [`StoreError::DuplicatePath`], which would mean the
    /// index and the existence check disagree.
    #[instrument(skip_all, fields(path = %path))]
    pub fn set(&mut self, path: &Path, value: impl Into<String>) -> Result<SetOutcome, StoreError> {
        let _timer = LatencyTimer::new("set");
        let value = value.into();

        if let Some(id) = self.index.find(path) {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.value = Some(value);
            }
            debug!("Replaced value of existing path");
            metrics::record_operation("set", "success");
            self.verify("set");
            return Ok(SetOutcome {
                created: 0,
                updated: true,
            });
        }

        let mut placement = Placement::default();
        let mut created = 0;
        for ancestor in path.ancestors() {
            if self.index.contains(&ancestor) {
                continue;
            }
            self.create(ancestor, None, &mut placement)?;
            created += 1;
        }
        let synthesized = created;
        self.create(path.clone(), Some(value), &mut placement)?;
        created += 1;

        debug!(created, synthesized, "Inserted new path");
        metrics::record_operation("set", "success");
        metrics::record_entries_created(created);
        if synthesized > 0 {
            metrics::record_ancestors_synthesized(synthesized);
        }
        self.publish_gauges();
        self.verify("set");

        Ok(SetOutcome {
            created,
            updated: false,
        })
    }

    /// Allocate an entry and link it into the index and the registry.
    fn create(
        &mut self,
        path: Path,
        value: Option<String>,
        placement: &mut Placement,
    ) -> Result<EntryId, StoreError> {
        let id = self.entries.insert(Entry::new(path.clone(), value));
        if let Err(e) = self.index.insert(path, id) {
            self.entries.remove(id);
            return Err(e);
        }
        match placement.before {
            Some(next) => self.registry.insert_before(id, next),
            None => {
                let next = self.registry.insert_maintaining_hierarchy(&self.entries, id);
                placement.before = Some(next);
            }
        }
        Ok(id)
    }

    /// Exact lookup.
    ///
    /// [`StoreError::NotFound`] if the path is absent, [`StoreError::NoData`]
    /// if it exists only as an implicit ancestor.
    pub fn find(&self, path: &Path) -> Result<&str, StoreError> {
        let result = self
            .index
            .find(path)
            .and_then(|id| self.entries.get(id))
            .ok_or(StoreError::NotFound)
            .and_then(|entry| entry.value.as_deref().ok_or(StoreError::NoData));

        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_operation("find", status);
        result
    }

    /// Every path that holds a value, with its value, in registry order.
    pub fn list_all(&self) -> impl Iterator<Item = (&Path, &str)> + '_ {
        metrics::record_operation("list_all", "success");
        self.iter()
            .filter_map(|(path, value)| value.map(|v| (path, v)))
    }

    /// Every entry in registry order, implicit ancestors included.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, Option<&str>)> + '_ {
        self.registry
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| (&entry.path, entry.value.as_deref()))
    }

    /// Names of the immediate children of `path` (`None` is the root),
    /// sorted per [`StoreConfig::child_order`].
    ///
    /// [`StoreError::NotFound`] if `path` is absent. The root always
    /// exists, so listing it on an empty store is an empty list.
    pub fn list_children(&self, path: Option<&Path>) -> Result<Vec<String>, StoreError> {
        if path.is_some_and(|path| !self.index.contains(path)) {
            metrics::record_operation("list_children", "not_found");
            return Err(StoreError::NotFound);
        }

        let mut names: Vec<String> = self
            .registry
            .children(&self.entries, path)
            .map(str::to_string)
            .collect();
        // Siblings share their parent's prefix, so ordering by name is
        // ordering by full path.
        names.sort_unstable();
        if self.config.child_order == ChildOrder::Descending {
            names.reverse();
        }

        metrics::record_operation("list_children", "success");
        Ok(names)
    }

    /// First path, in registry order, whose value equals `value` exactly.
    pub fn search_by_value(&self, value: &str) -> Option<&Path> {
        let found = self
            .registry
            .iter()
            .filter_map(|id| self.entries.get(id))
            .find(|entry| entry.value.as_deref() == Some(value))
            .map(|entry| &entry.path);

        metrics::record_operation("search", if found.is_some() { "success" } else { "not_found" });
        found
    }

    /// Delete `path` and all of its descendants. Returns how many entries
    /// were removed.
    ///
    /// The registry keeps a path's descendants in one run right after it,
    /// so this is a forward walk that stops at the first node outside the
    /// subtree.
    #[instrument(skip_all, fields(path = %path))]
    pub fn delete(&mut self, path: &Path) -> Result<usize, StoreError> {
        let _timer = LatencyTimer::new("delete");

        let Some(start) = self
            .index
            .find(path)
            .filter(|&id| self.registry.contains(id))
        else {
            metrics::record_operation("delete", "not_found");
            return Err(StoreError::NotFound);
        };

        let mut removed = 0;
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let current = self.entries.path(id).clone();
            if !path.contains(&current) {
                break;
            }
            self.index.delete(&current);
            cursor = self.registry.remove(id);
            self.entries.remove(id);
            removed += 1;
        }

        debug!(removed, "Deleted subtree");
        metrics::record_operation("delete", "success");
        metrics::record_entries_removed(removed);
        self.publish_gauges();
        self.verify("delete");
        Ok(removed)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        let removed = self.len();
        self.index.clear();
        self.registry.clear();
        self.entries.clear();

        info!(removed, "Cleared path store");
        metrics::record_operation("clear", "success");
        metrics::record_entries_removed(removed);
        self.publish_gauges();
    }

    /// Check the index balance, the registry order, and that both
    /// structures hold exactly the same entries as the arena.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.index.check_balanced()?;
        self.registry.check_contiguous(&self.entries)?;

        let (indexed, registered, owned) =
            (self.index.len(), self.registry.len(), self.entries.len());
        if indexed != registered || registered != owned {
            return Err(InvariantViolation::StructureMismatch(format!(
                "index has {}, registry has {}, arena has {}",
                indexed, registered, owned
            )));
        }
        for (id, entry) in self.entries.iter() {
            if self.index.find(&entry.path) != Some(id) {
                return Err(InvariantViolation::StructureMismatch(format!(
                    "'{}' is owned but indexed under another handle",
                    entry.path
                )));
            }
            if !self.registry.contains(id) {
                return Err(InvariantViolation::StructureMismatch(format!(
                    "'{}' is owned but not registered",
                    entry.path
                )));
            }
        }
        Ok(())
    }

    fn verify(&self, operation: &str) {
        if !self.config.verify_invariants {
            return;
        }
        if let Err(violation) = self.check_invariants() {
            panic!("path store corrupted after {}: {}", operation, violation);
        }
    }

    fn publish_gauges(&self) {
        metrics::set_entry_count(self.len());
        metrics::set_index_height(self.index.height());
    }
}

/// Where the entries of one `set` go in the registry. The first new entry
/// finds its slot by scanning; the rest follow it to the same spot.
#[derive(Default)]
struct Placement {
    before: Option<Option<EntryId>>,
}
