//! # Path Store
//!
//! An in-memory store for hierarchical, slash-delimited paths, each
//! optionally holding a text value.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Command Layer                         │
//! │  • Parses "set /a/b value", "find /a", "list", ...          │
//! │  • Prints values or the "not found" / "no data" sentinels   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         PathStore                           │
//! │  • set: synthesizes missing ancestors, updates in place     │
//! │  • delete: removes a path and its whole subtree             │
//! └─────────────────────────────────────────────────────────────┘
//!              │                                 │
//!              ▼                                 ▼
//! ┌──────────────────────────┐     ┌──────────────────────────┐
//! │      OrderedIndex        │     │        Registry          │
//! │  • AVL tree by path      │     │  • creation order        │
//! │  • O(log n) exact match  │     │  • subtrees contiguous   │
//! └──────────────────────────┘     └──────────────────────────┘
//!              │                                 │
//!              └──────────────┬──────────────────┘
//!                             ▼
//!               ┌──────────────────────────┐
//!               │        EntryArena        │
//!               │  • one owner per entry   │
//!               └──────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use path_store::{Path, PathStore, StoreError};
//!
//! let mut store = PathStore::new();
//! store.set(&Path::parse("/a/b").unwrap(), "1").unwrap();
//! store.set(&Path::parse("/a/c").unwrap(), "2").unwrap();
//!
//! let a = Path::parse("a").unwrap();
//! assert_eq!(store.find(&a), Err(StoreError::NoData));
//! assert_eq!(store.list_children(Some(&a)).unwrap(), vec!["c", "b"]);
//!
//! store.delete(&a).unwrap();
//! assert!(store.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`path`]: canonical paths and path algebra
//! - [`entry`]: entries and the arena that owns them
//! - [`index`]: AVL ordered index
//! - [`registry`]: creation-ordered, hierarchy-contiguous registry
//! - [`store`]: the [`PathStore`] tying them together
//! - [`command`]: line-oriented command dispatcher
//! - [`metrics`]: `metrics` crate instrumentation

pub mod config;
pub mod error;
pub mod path;
pub mod entry;
pub mod index;
pub mod registry;
pub mod store;
pub mod command;
pub mod metrics;

pub use config::{ChildOrder, StoreConfig};
pub use error::{CommandError, ConfigError, InvariantViolation, StoreError};
pub use path::Path;
pub use entry::{Entry, EntryArena, EntryId};
pub use index::OrderedIndex;
pub use registry::Registry;
pub use store::{PathStore, SetOutcome};
pub use command::{Command, Flow, Session};
pub use metrics::LatencyTimer;
