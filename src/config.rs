//! Configuration for the path store.
//!
//! # Example
//!
//! ```
//! use path_store::{ChildOrder, StoreConfig};
//!
//! // Defaults
//! let config = StoreConfig::default();
//! assert_eq!(config.child_order, ChildOrder::Descending);
//! assert_eq!(config.max_line_bytes, 65535);
//!
//! // From JSON, unspecified fields fall back to defaults
//! let config = StoreConfig::from_json(r#"{ "child_order": "ascending" }"#).unwrap();
//! assert_eq!(config.child_order, ChildOrder::Ascending);
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Order in which `list_children` returns names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildOrder {
    /// Lexicographic, smallest first.
    Ascending,
    /// Lexicographic, largest first. Matches the historical listing order.
    #[default]
    Descending,
}

/// Configuration for the path store.
///
/// All fields have defaults; an empty JSON object is a valid config.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Order of child names returned by `list_children`
    #[serde(default)]
    pub child_order: ChildOrder,

    /// Run the full invariant check after every mutation (default: on in
    /// debug builds). O(n) per mutation, so keep it off in release.
    #[serde(default = "default_verify_invariants")]
    pub verify_invariants: bool,

    /// Longest command line the command layer accepts, in bytes
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

fn default_verify_invariants() -> bool { cfg!(debug_assertions) }
fn default_max_line_bytes() -> usize { 65535 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            child_order: ChildOrder::default(),
            verify_invariants: default_verify_invariants(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl StoreConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.child_order, ChildOrder::Descending);
        assert_eq!(config.verify_invariants, cfg!(debug_assertions));
        assert_eq!(config.max_line_bytes, 65535);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = StoreConfig::from_json("{}").unwrap();
        assert_eq!(config.child_order, ChildOrder::Descending);
        assert_eq!(config.max_line_bytes, 65535);
    }

    #[test]
    fn test_full_json() {
        let config = StoreConfig::from_json(
            r#"{ "child_order": "ascending", "verify_invariants": false, "max_line_bytes": 128 }"#,
        )
        .unwrap();
        assert_eq!(config.child_order, ChildOrder::Ascending);
        assert!(!config.verify_invariants);
        assert_eq!(config.max_line_bytes, 128);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(StoreConfig::from_json(r#"{ "child_order": "sideways" }"#).is_err());
        assert!(StoreConfig::from_json("not json").is_err());
    }
}
