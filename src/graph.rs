//! Canonical dependency graph shared by the extractor, synthesizer, store and layout engine.
//!
//! Nodes carry identity fields only. Positions belong to the layout engine
//! and never appear here.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// One source file or logical module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileNode {
    /// Unique key, canonically the path relative to the repository root.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Coloring/clustering key derived from the containing directory. Always >= 1.
    pub group: u32,
    /// Visual size. Always > 0.
    pub radius: f64,
}

/// A directed "source depends on target" edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyLink {
    /// Id of the importing node.
    pub source: String,
    /// Id of the imported node.
    pub target: String,
    /// Relationship strength. Always >= 1.
    pub value: u32,
}

/// A node/link set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    /// Nodes; ids are unique in a canonical graph.
    pub nodes: Vec<FileNode>,
    /// Links; both endpoints exist in `nodes` in a canonical graph.
    pub links: Vec<DependencyLink>,
}

impl Graph {
    /// Returns `true` when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maps each node id to its position in `nodes`. The first occurrence wins.
    #[must_use]
    pub fn index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            index.entry(node.id.as_str()).or_insert(i);
        }
        index
    }

    /// Enforces the canonical invariants.
    ///
    /// Nodes with an empty id and repeated ids (after the first) are
    /// removed; links whose endpoints are missing are dropped.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        let mut seen = HashSet::new();
        let node_count = self.nodes.len();
        let nodes: Vec<FileNode> = self
            .nodes
            .into_iter()
            .filter(|node| !node.id.is_empty() && seen.insert(node.id.clone()))
            .collect();
        if nodes.len() != node_count {
            warn!("dropped {} empty or duplicate node ids", node_count - nodes.len());
        }

        let link_count = self.links.len();
        let links: Vec<DependencyLink> = self
            .links
            .into_iter()
            .filter(|link| seen.contains(&link.source) && seen.contains(&link.target))
            .collect();
        if links.len() != link_count {
            warn!("dropped {} links with missing endpoints", link_count - links.len());
        }

        Self { nodes, links }
    }

    /// Returns `true` if ids are unique and non-empty and every link
    /// references existing nodes.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        let mut ids = HashSet::new();
        self.nodes.iter().all(|n| !n.id.is_empty() && ids.insert(n.id.as_str()))
            && self
                .links
                .iter()
                .all(|l| ids.contains(l.source.as_str()) && ids.contains(l.target.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> FileNode {
        FileNode { id: id.into(), name: id.into(), group: 1, radius: 10.0 }
    }

    fn link(source: &str, target: &str) -> DependencyLink {
        DependencyLink { source: source.into(), target: target.into(), value: 1 }
    }

    #[test]
    fn canonicalize_drops_duplicates_and_dangling_links() {
        let mut first_a = node("a");
        first_a.group = 3;
        let graph = Graph {
            nodes: vec![first_a, node("b"), node("a"), node("")],
            links: vec![link("a", "b"), link("a", "ghost"), link("", "a")],
        };
        assert!(!graph.is_canonical());

        let canonical = graph.canonicalize();
        assert!(canonical.is_canonical());
        assert_eq!(canonical.nodes.len(), 2);
        assert_eq!(canonical.nodes[0].group, 3);
        assert_eq!(canonical.links, vec![link("a", "b")]);
    }

    #[test]
    fn serialized_shape_uses_plain_field_names() {
        let graph = Graph { nodes: vec![node("app.js")], links: vec![] };
        let json = serde_json::to_string(&graph).unwrap();
        assert_eq!(
            json,
            r#"{"nodes":[{"id":"app.js","name":"app.js","group":1,"radius":10.0}],"links":[]}"#
        );
    }
}
