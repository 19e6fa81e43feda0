// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

use serde::Deserialize;

/// Tuning of a [`SphericalIndex`](crate::index::SphericalIndex).
///
/// Missing fields take their default, so an application can load a partial
/// table from its own configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Objects a node holds before it splits.
    pub max_objects_per_node: usize,
    /// Depth below which nodes never split.
    pub max_level: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            max_objects_per_node: 100,
            max_level: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_keep_defaults() {
        let c: IndexConfig = serde_json::from_str(r#"{"max_level": 3}"#).unwrap();
        assert_eq!(c.max_level, 3);
        assert_eq!(c.max_objects_per_node, 100);
        assert!(serde_json::from_str::<IndexConfig>(r#"{"depth": 3}"#).is_err());
    }
}
