//! Static dependency extraction.
//!
//! Builds a best-effort file graph from lexical scanning alone: every
//! scanned source file becomes a node, every resolved relative import adds
//! its target as a node and a `value = 1` link. Bare package imports are
//! left out of the graph.

pub mod resolve;
pub mod scanner;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::{DependencyLink, FileNode, Graph};
use crate::ports::filesystem::FileSystem;
use resolve::{parent_dir, Resolution, Resolver};

/// File extensions treated as source.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

/// Directory names never descended into.
pub const EXCLUDED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// Radius of a node with no outgoing edges.
const BASE_RADIUS: f64 = 10.0;
/// Radius added per distinct outgoing edge.
const RADIUS_PER_EDGE: f64 = 2.0;

/// Result of one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Extraction {
    /// The statically derived graph.
    pub graph: Graph,
    /// Exported declaration names per scanned file id.
    pub exports: BTreeMap<String, Vec<String>>,
    /// Files that were not scanned, and why.
    pub skipped: Vec<SkippedFile>,
}

/// A source file left out of the scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedFile {
    /// Relative id of the file.
    pub path: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Why a file was not scanned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Larger than the configured byte threshold.
    TooLarge {
        /// Actual size.
        bytes: u64,
    },
    /// Could not be read (permissions, invalid UTF-8).
    Unreadable {
        /// Underlying error text.
        error: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { bytes } => write!(f, "too large ({bytes} bytes)"),
            Self::Unreadable { error } => write!(f, "unreadable: {error}"),
        }
    }
}

/// Returns `true` if the path has one of the [`SOURCE_EXTENSIONS`].
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// `/`-separated path of `path` relative to `root`, or `None` if outside it.
#[must_use]
pub fn relative_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Scans every source file in `files` (absolute paths under `root`).
///
/// Non-source files are ignored. Oversized or unreadable files are logged
/// and recorded in [`Extraction::skipped`]; they never abort the run.
pub fn extract(fs: &dyn FileSystem, root: &Path, files: &[PathBuf], max_file_bytes: u64) -> Extraction {
    let mut sources: Vec<(String, &PathBuf)> = files
        .iter()
        .filter(|path| is_source_file(path))
        .filter_map(|path| relative_id(root, path).map(|id| (id, path)))
        .collect();
    sources.sort_by(|a, b| a.0.cmp(&b.0));
    sources.dedup_by(|a, b| a.0 == b.0);

    let resolver = Resolver::new(sources.iter().map(|(id, _)| id.clone()));
    let mut builder = GraphBuilder::default();
    let mut exports = BTreeMap::new();
    let mut skipped = Vec::new();

    for (id, path) in &sources {
        let content = match read_bounded(fs, path, max_file_bytes) {
            Ok(content) => content,
            Err(reason) => {
                warn!("skipping {id}: {reason}");
                skipped.push(SkippedFile { path: id.clone(), reason });
                continue;
            }
        };

        let scanned = scanner::scan(&content);
        debug!("{id}: {} specifiers, {} exports", scanned.specifiers.len(), scanned.exports.len());
        builder.add_node(id);

        for specifier in &scanned.specifiers {
            match resolver.resolve(id, specifier) {
                Resolution::Internal(target) => builder.add_link(id, &target),
                Resolution::External => {}
                Resolution::OutsideRoot => debug!("{id}: {specifier} resolves outside the repository"),
            }
        }
        if !scanned.exports.is_empty() {
            exports.insert(id.clone(), scanned.exports);
        }
    }

    Extraction { graph: builder.finish(), exports, skipped }
}

fn read_bounded(fs: &dyn FileSystem, path: &Path, max_bytes: u64) -> Result<String, SkipReason> {
    let bytes = fs.file_size(path).map_err(|e| SkipReason::Unreadable { error: e.to_string() })?;
    if bytes > max_bytes {
        return Err(SkipReason::TooLarge { bytes });
    }
    fs.read_to_string(path).map_err(|e| SkipReason::Unreadable { error: e.to_string() })
}

/// Accumulates nodes in first-seen order with per-run directory groups.
#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<String>,
    node_group: HashMap<String, u32>,
    groups: HashMap<String, u32>,
    links: Vec<(String, String)>,
    seen_links: HashSet<(String, String)>,
}

impl GraphBuilder {
    fn add_node(&mut self, id: &str) {
        if self.node_group.contains_key(id) {
            return;
        }
        let next = u32::try_from(self.groups.len() + 1).unwrap_or(u32::MAX);
        let group = *self.groups.entry(parent_dir(id).to_string()).or_insert(next);
        self.node_group.insert(id.to_string(), group);
        self.nodes.push(id.to_string());
    }

    fn add_link(&mut self, source: &str, target: &str) {
        self.add_node(target);
        let key = (source.to_string(), target.to_string());
        if self.seen_links.insert(key.clone()) {
            self.links.push(key);
        }
    }

    fn finish(self) -> Graph {
        let mut out_degree: HashMap<&str, u32> = HashMap::new();
        for (source, _) in &self.links {
            *out_degree.entry(source.as_str()).or_default() += 1;
        }

        let nodes = self
            .nodes
            .iter()
            .map(|id| FileNode {
                id: id.clone(),
                name: id.clone(),
                group: self.node_group[id],
                radius: BASE_RADIUS
                    + RADIUS_PER_EDGE * f64::from(out_degree.get(id.as_str()).copied().unwrap_or(0)),
            })
            .collect();
        let links = self
            .links
            .iter()
            .map(|(source, target)| DependencyLink {
                source: source.clone(),
                target: target.clone(),
                value: 1,
            })
            .collect();
        Graph { nodes, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;

    fn run(fs: &MemFs) -> Extraction {
        let root = Path::new("/repo");
        let files = fs.walk_files(root, &EXCLUDED_DIRS).unwrap();
        extract(fs, root, &files, 1024)
    }

    fn node<'a>(extraction: &'a Extraction, id: &str) -> &'a FileNode {
        extraction.graph.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn relative_import_resolves_against_importer_directory() {
        let fs = MemFs::new().with_file("/repo/a/b/c.ts", "import x from './d';\n");
        let extraction = run(&fs);
        assert_eq!(
            extraction.graph.links,
            vec![DependencyLink { source: "a/b/c.ts".into(), target: "a/b/d".into(), value: 1 }]
        );
        assert!(extraction.graph.is_canonical());
    }

    #[test]
    fn bare_imports_create_no_nodes_or_links() {
        let fs = MemFs::new()
            .with_file("/repo/server.js", "import express from 'express';\nconst x = require('lodash');\n");
        let extraction = run(&fs);
        assert_eq!(extraction.graph.nodes.len(), 1);
        assert_eq!(extraction.graph.nodes[0].id, "server.js");
        assert!(extraction.graph.links.is_empty());
        assert!(extraction.graph.nodes.iter().all(|n| n.id != "express"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let fs = MemFs::new()
            .with_file("/repo/src/index.ts", "import { app } from './app';\nimport './styles.css';\n")
            .with_file("/repo/src/app.ts", "const util = require('../lib/util');\nexport const app = 1;\n")
            .with_file("/repo/lib/util.js", "module.exports = {};\n");
        assert_eq!(run(&fs), run(&fs));
    }

    #[test]
    fn groups_follow_first_seen_directory() {
        let fs = MemFs::new()
            .with_file("/repo/index.js", "import a from './lib/a';\n")
            .with_file("/repo/lib/a.js", "import b from '../util/b';\n")
            .with_file("/repo/util/b.js", "");
        let extraction = run(&fs);
        assert_eq!(node(&extraction, "index.js").group, 1);
        assert_eq!(node(&extraction, "lib/a.js").group, 2);
        assert_eq!(node(&extraction, "util/b.js").group, 3);
    }

    #[test]
    fn radius_grows_with_distinct_outgoing_edges() {
        let fs = MemFs::new()
            .with_file(
                "/repo/main.ts",
                "import a from './a';\nimport b from './b';\nconst again = require('./a');\n",
            )
            .with_file("/repo/a.ts", "")
            .with_file("/repo/b.ts", "");
        let extraction = run(&fs);
        assert!((node(&extraction, "main.ts").radius - 14.0).abs() < f64::EPSILON);
        assert!((node(&extraction, "a.ts").radius - 10.0).abs() < f64::EPSILON);
        assert_eq!(extraction.graph.links.len(), 2);
    }

    #[test]
    fn oversized_files_are_flagged_not_scanned() {
        let big = format!("import a from './a';\n{}", "x".repeat(2048));
        let fs = MemFs::new().with_file("/repo/big.js", &big).with_file("/repo/small.js", "");
        let extraction = run(&fs);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].path, "big.js");
        assert!(matches!(extraction.skipped[0].reason, SkipReason::TooLarge { .. }));
        assert_eq!(extraction.graph.nodes.len(), 1);
    }

    #[test]
    fn non_source_and_vendored_files_are_ignored() {
        let fs = MemFs::new()
            .with_file("/repo/README.md", "import a from './a';")
            .with_file("/repo/node_modules/pkg/index.js", "import a from './a';")
            .with_file("/repo/src/main.tsx", "export default function App() {}\n");
        let extraction = run(&fs);
        assert_eq!(extraction.graph.nodes.len(), 1);
        assert_eq!(extraction.exports["src/main.tsx"], vec!["App"]);
    }

    #[test]
    fn skip_reasons_read_as_plain_text() {
        assert_eq!(SkipReason::TooLarge { bytes: 204_800 }.to_string(), "too large (204800 bytes)");
        let unreadable = SkipReason::Unreadable { error: "permission denied".into() };
        assert_eq!(unreadable.to_string(), "unreadable: permission denied");
    }
}
