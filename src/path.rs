// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Slash-rooted hierarchical paths and the algebra the store composes.
//!
//! A [`Path`] is always canonical: one leading separator, no empty
//! segments, no trailing separator.
//!
//! ```text
//! "a//b/c/"  ──parse──▶  /a/b/c
//!
//! /a/b/c
//! ├── parent        → /a/b
//! ├── prefix(1)     → /a
//! ├── ancestors()   → [/a, /a/b]
//! └── child_name_relative_to(/a) → "b"
//! ```
//!
//! Ordering is plain lexicographic order over the rendered string, so
//! `/a/b` < `/a0` < `/ab`.

use std::fmt;
use std::sync::Arc;

pub const SEPARATOR: char = '/';

/// An immutable, canonical path. Cloning is a reference-count bump.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    text: Arc<str>,
}

impl Path {
    /// Canonicalize raw input.
    ///
    /// Returns `None` when the input has no segments (`""`, `"/"`, `"//"`),
    /// which denotes the conceptual root.
    ///
    /// ```
    /// use path_store::Path;
    ///
    /// assert_eq!(Path::parse("a//b/").unwrap().as_str(), "/a/b");
    /// assert!(Path::parse("/").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let mut text = String::with_capacity(raw.len() + 1);
        for segment in raw.split(SEPARATOR).filter(|s| !s.is_empty()) {
            text.push(SEPARATOR);
            text.push_str(segment);
        }
        if text.is_empty() {
            None
        } else {
            Some(Self { text: text.into() })
        }
    }

    /// Build from a string already known to be canonical.
    fn from_canonical(text: &str) -> Self {
        debug_assert!(Self::parse(text).is_some_and(|p| &*p.text == text));
        Self { text: text.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of segments, always at least one.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.text.matches(SEPARATOR).count()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.text[1..].split(SEPARATOR)
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        match self.text.rfind(SEPARATOR) {
            Some(idx) => &self.text[idx + 1..],
            None => &self.text,
        }
    }

    /// All segments but the last; `None` for a one-segment path.
    pub fn parent(&self) -> Option<Self> {
        match self.text.rfind(SEPARATOR) {
            Some(0) | None => None,
            Some(idx) => Some(Self::from_canonical(&self.text[..idx])),
        }
    }

    /// The first `n` segments.
    ///
    /// `None` if `n == 0` or `n` exceeds [`Self::segment_count`].
    pub fn prefix(&self, n: usize) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let mut boundaries = self
            .text
            .match_indices(SEPARATOR)
            .map(|(idx, _)| idx)
            .skip(n);
        match boundaries.next() {
            Some(end) => Some(Self::from_canonical(&self.text[..end])),
            None if self.segment_count() == n => Some(self.clone()),
            None => None,
        }
    }

    /// Proper ancestors, root-to-leaf: `/a/b/c` → `[/a, /a/b]`.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        self.text
            .match_indices(SEPARATOR)
            .skip(1)
            .map(|(end, _)| Self::from_canonical(&self.text[..end]))
    }

    /// The segment of `self` that immediately follows `ancestor`.
    ///
    /// `ancestor` must be a strict prefix ending on a segment boundary:
    /// `/a` is a prefix of `/a/b` but not of `/ab`. `None` as ancestor
    /// stands for the root and yields the first segment.
    pub fn child_name_relative_to(&self, ancestor: Option<&Path>) -> Option<&str> {
        let rest = match ancestor {
            None => &self.text[1..],
            Some(ancestor) => {
                let rest = self.text.strip_prefix(&*ancestor.text)?;
                rest.strip_prefix(SEPARATOR)?
            }
        };
        rest.split(SEPARATOR).next()
    }

    /// Strict, segment-boundary ancestor test.
    #[inline]
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        other.child_name_relative_to(Some(self)).is_some()
    }

    /// `self` is `other` or one of its ancestors.
    #[inline]
    pub fn contains(&self, other: &Path) -> bool {
        self == other || self.is_ancestor_of(other)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({})", self.text)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn p(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_canonicalizes() {
        assert_eq!(p("/a/b/c").as_str(), "/a/b/c");
        assert_eq!(p("a/b").as_str(), "/a/b");
        assert_eq!(p("//a///b//").as_str(), "/a/b");
        assert_eq!(p("a/").as_str(), "/a");
    }

    #[test]
    fn test_parse_root_is_none() {
        assert!(Path::parse("").is_none());
        assert!(Path::parse("/").is_none());
        assert!(Path::parse("////").is_none());
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(p("/a").segment_count(), 1);
        assert_eq!(p("/a/b/c").segment_count(), 3);
        assert_eq!(p("/a/b/c").segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parent() {
        assert_eq!(p("/a/b/c").parent(), Some(p("/a/b")));
        assert_eq!(p("/a/b").parent(), Some(p("/a")));
        assert_eq!(p("/a").parent(), None);
    }

    #[test]
    fn test_prefix() {
        let path = p("/usr/local/bin");
        assert_eq!(path.prefix(0), None);
        assert_eq!(path.prefix(1), Some(p("/usr")));
        assert_eq!(path.prefix(2), Some(p("/usr/local")));
        assert_eq!(path.prefix(3), Some(path.clone()));
        assert_eq!(path.prefix(4), None);
    }

    #[test]
    fn test_ancestors_root_to_leaf() {
        let chain: Vec<String> = p("/a/b/c").ancestors().map(|a| a.to_string()).collect();
        assert_eq!(chain, vec!["/a", "/a/b"]);
        assert_eq!(p("/a").ancestors().count(), 0);
    }

    #[test]
    fn test_child_name_relative_to() {
        let path = p("/a/b/c");
        assert_eq!(path.child_name_relative_to(None), Some("a"));
        assert_eq!(path.child_name_relative_to(Some(&p("/a"))), Some("b"));
        assert_eq!(path.child_name_relative_to(Some(&p("/a/b"))), Some("c"));
        assert_eq!(path.child_name_relative_to(Some(&path)), None);
        assert_eq!(path.child_name_relative_to(Some(&p("/x"))), None);
    }

    #[test]
    fn test_child_name_respects_segment_boundary() {
        assert_eq!(p("/ab/c").child_name_relative_to(Some(&p("/a"))), None);
        assert!(!p("/a").is_ancestor_of(&p("/ab")));
        assert!(p("/a").is_ancestor_of(&p("/a/b")));
        assert!(!p("/a").is_ancestor_of(&p("/a")));
        assert!(p("/a").contains(&p("/a")));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert_eq!(p("/a").cmp(&p("/a")), Ordering::Equal);
        assert!(p("/a/b") < p("/a0"));
        assert!(p("/a0") < p("/ab"));
        assert!(p("/a") < p("/a/b"));
    }

    #[test]
    fn test_name() {
        assert_eq!(p("/a/b").name(), "b");
        assert_eq!(p("/a").name(), "a");
    }

    #[test]
    fn test_clone_shares_storage() {
        let a = p("/a/b");
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.text, &b.text));
    }
}
