// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! AVL-balanced ordered index from [`Path`] to [`EntryId`].
//!
//! This is the authoritative existence check for the store: exactly one
//! node per distinct path, O(log n) find, insert and delete.
//!
//! # Balancing
//!
//! Every node caches its height. After an insert or delete, each node on
//! the way back up recomputes its height and, when the balance factor
//! `height(left) - height(right)` leaves `[-1, 1]`, is rotated:
//!
//! ```text
//! left-left    → rotate right
//! left-right   → rotate left on the left child, then rotate right
//! right-right  → rotate left
//! right-left   → rotate right on the right child, then rotate left
//! ```
//!
//! Rotations take a subtree by value and return its new root, so there
//! are no parent pointers to keep in sync.

use std::cmp::Ordering;

use crate::entry::EntryId;
use crate::error::{InvariantViolation, StoreError};
use crate::path::Path;

type Link = Option<Box<Node>>;

#[derive(Debug)]
struct Node {
    path: Path,
    entry: EntryId,
    left: Link,
    right: Link,
    height: usize,
}

impl Node {
    fn leaf(path: Path, entry: EntryId) -> Self {
        Self {
            path,
            entry,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

#[inline]
fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

/// Restore the AVL property at `node`, returning the new subtree root.
fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();
    let factor = node.balance_factor();

    if factor > 1 {
        if node.left.as_ref().map_or(0, |l| l.balance_factor()) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if factor < -1 {
        if node.right.as_ref().map_or(0, |r| r.balance_factor()) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn rebalance_link(link: &mut Link) {
    if let Some(node) = link.take() {
        *link = Some(rebalance(node));
    }
}

fn insert_at(link: &mut Link, path: Path, entry: EntryId) -> Result<(), StoreError> {
    let Some(node) = link.as_mut() else {
        *link = Some(Box::new(Node::leaf(path, entry)));
        return Ok(());
    };
    match path.cmp(&node.path) {
        Ordering::Less => insert_at(&mut node.left, path, entry)?,
        Ordering::Greater => insert_at(&mut node.right, path, entry)?,
        Ordering::Equal => return Err(StoreError::DuplicatePath(path.to_string())),
    }
    rebalance_link(link);
    Ok(())
}

fn max_of(mut node: &Node) -> &Node {
    while let Some(right) = node.right.as_deref() {
        node = right;
    }
    node
}

fn delete_at(link: &mut Link, path: &Path) -> Option<EntryId> {
    let node = link.as_mut()?;
    let removed = match path.cmp(&node.path) {
        Ordering::Less => delete_at(&mut node.left, path),
        Ordering::Greater => delete_at(&mut node.right, path),
        Ordering::Equal if node.left.is_some() && node.right.is_some() => {
            // Promote the in-order predecessor, then remove it from the
            // left subtree where it still lives.
            let (pred_path, pred_entry) = {
                let predecessor = max_of(node.left.as_deref()?);
                (predecessor.path.clone(), predecessor.entry)
            };
            let removed = std::mem::replace(&mut node.entry, pred_entry);
            node.path = pred_path.clone();
            delete_at(&mut node.left, &pred_path);
            Some(removed)
        }
        Ordering::Equal => {
            let mut gone = link.take()?;
            *link = gone.left.take().or_else(|| gone.right.take());
            return Some(gone.entry);
        }
    };
    if removed.is_some() {
        rebalance_link(link);
    }
    removed
}

fn check_node(link: &Link) -> Result<usize, InvariantViolation> {
    let Some(node) = link else {
        return Ok(0);
    };
    let left = check_node(&node.left)?;
    let right = check_node(&node.right)?;
    if left.abs_diff(right) > 1 {
        return Err(InvariantViolation::Unbalanced {
            path: node.path.to_string(),
            left,
            right,
        });
    }
    let actual = 1 + left.max(right);
    if node.height != actual {
        return Err(InvariantViolation::HeightMismatch {
            path: node.path.to_string(),
            stored: node.height,
            actual,
        });
    }
    Ok(actual)
}

/// Balanced search tree keyed by path.
#[derive(Debug, Default)]
pub struct OrderedIndex {
    root: Link,
    len: usize,
}

impl OrderedIndex {
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

    /// Height of the whole tree; 0 when empty.
    #[must_use]
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    pub fn find(&self, path: &Path) -> Option<EntryId> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match path.cmp(&node.path) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node.entry),
            };
        }
        None
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.find(path).is_some()
    }

    /// Insert a new path. A path that is already indexed is left untouched
    /// and reported as [`StoreError::DuplicatePath`].
    pub fn insert(&mut self, path: Path, entry: EntryId) -> Result<(), StoreError> {
        insert_at(&mut self.root, path, entry)?;
        self.len += 1;
        Ok(())
    }

    /// Remove a path, returning the handle it mapped to. Absent paths are
    /// a no-op.
    pub fn delete(&mut self, path: &Path) -> Option<EntryId> {
        let removed = delete_at(&mut self.root, path)?;
        self.len -= 1;
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Ascending in-order walk.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref())
    }

    /// Verify stored heights, AVL balance and key order.
    pub fn check_balanced(&self) -> Result<(), InvariantViolation> {
        check_node(&self.root)?;
        let mut previous: Option<&Path> = None;
        for (path, _) in self.iter() {
            if let Some(before) = previous {
                if before >= path {
                    return Err(InvariantViolation::OutOfOrder {
                        before: before.to_string(),
                        after: path.to_string(),
                    });
                }
            }
            previous = Some(path);
        }
        Ok(())
    }
}

/// In-order iterator over `(path, entry)` pairs.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.descend(root);
        iter
    }

    fn descend(&mut self, mut node: Option<&'a Node>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Path, EntryId);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        Some((&node.path, node.entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryArena};

    fn p(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    /// Index plus an arena that hands out real handles.
    fn build(paths: &[&str]) -> (OrderedIndex, EntryArena) {
        let mut index = OrderedIndex::new();
        let mut arena = EntryArena::new();
        for raw in paths {
            let path = p(raw);
            let id = arena.insert(Entry::new(path.clone(), None));
            index.insert(path, id).unwrap();
        }
        (index, arena)
    }

    fn root_path(index: &OrderedIndex) -> &str {
        index.root.as_ref().unwrap().path.as_str()
    }

    #[test]
    fn test_empty_index() {
        let index = OrderedIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert!(index.find(&p("/a")).is_none());
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_insert_and_find() {
        let (index, arena) = build(&["/m", "/c", "/x"]);
        assert_eq!(index.len(), 3);
        let id = index.find(&p("/c")).unwrap();
        assert_eq!(arena.path(id).as_str(), "/c");
        assert!(index.find(&p("/d")).is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (mut index, mut arena) = build(&["/a", "/b"]);
        let id = arena.insert(Entry::new(p("/a"), None));
        let err = index.insert(p("/a"), id).unwrap_err();
        assert_eq!(err, StoreError::DuplicatePath("/a".into()));
        assert_eq!(index.len(), 2);
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_left_left_rotation() {
        let (index, _) = build(&["/c", "/b", "/a"]);
        assert_eq!(root_path(&index), "/b");
        assert_eq!(index.height(), 2);
    }

    #[test]
    fn test_right_right_rotation() {
        let (index, _) = build(&["/a", "/b", "/c"]);
        assert_eq!(root_path(&index), "/b");
        assert_eq!(index.height(), 2);
    }

    #[test]
    fn test_left_right_rotation() {
        let (index, _) = build(&["/c", "/a", "/b"]);
        assert_eq!(root_path(&index), "/b");
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_right_left_rotation() {
        let (index, _) = build(&["/a", "/c", "/b"]);
        assert_eq!(root_path(&index), "/b");
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_sorted_inserts_stay_logarithmic() {
        let paths: Vec<String> = (0..1024).map(|i| format!("/k{:05}", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (index, _) = build(&refs);
        assert_eq!(index.len(), 1024);
        // AVL height bound: < 1.44 * log2(n + 2)
        assert!(index.height() <= 14, "height {}", index.height());
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_delete_leaf_and_single_child() {
        let (mut index, _) = build(&["/b", "/a", "/c", "/d"]);
        assert!(index.delete(&p("/d")).is_some());
        assert!(index.delete(&p("/c")).is_some());
        assert_eq!(index.len(), 2);
        assert!(index.find(&p("/c")).is_none());
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_delete_two_children_promotes_predecessor() {
        let (mut index, arena) = build(&["/d", "/b", "/f", "/a", "/c", "/e", "/g"]);
        assert_eq!(root_path(&index), "/d");
        let gone = index.delete(&p("/d")).unwrap();
        assert_eq!(arena.path(gone).as_str(), "/d");
        assert_eq!(root_path(&index), "/c");
        let remaining: Vec<&str> = index.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(remaining, vec!["/a", "/b", "/c", "/e", "/f", "/g"]);
        // the promoted path still maps to its own entry
        let c = index.find(&p("/c")).unwrap();
        assert_eq!(arena.path(c).as_str(), "/c");
        assert!(index.check_balanced().is_ok());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let (mut index, _) = build(&["/a", "/b"]);
        assert!(index.delete(&p("/zzz")).is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_delete_rebalances() {
        let paths: Vec<String> = (0..200).map(|i| format!("/n{:03}", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (mut index, _) = build(&refs);
        for raw in refs.iter().step_by(2) {
            assert!(index.delete(&p(raw)).is_some());
            assert!(index.check_balanced().is_ok());
        }
        assert_eq!(index.len(), 100);
    }

    #[test]
    fn test_iter_is_ascending() {
        let (index, _) = build(&["/b", "/a/x", "/a", "/c"]);
        let asc: Vec<&str> = index.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(asc, vec!["/a", "/a/x", "/b", "/c"]);
    }

    #[test]
    fn test_clear() {
        let (mut index, _) = build(&["/a", "/b"]);
        index.clear();
        assert!(index.is_empty());
        assert!(index.find(&p("/a")).is_none());
    }
}
