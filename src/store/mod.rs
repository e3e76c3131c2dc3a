//! Analysis store: persistence of completed analyses keyed by project id.
//!
//! The store uses the `FileSystem` port for all I/O. Layout:
//!
//! ```text
//! <root>/
//!   └── projects/
//!         └── <project-id>.json
//! ```
//!
//! Files are pretty-printed JSON, so a stored graph reloads and re-serializes
//! to the same bytes.

use std::path::{Path, PathBuf};

use crate::error::AnalysisError;
use crate::graph::Graph;
use crate::pipeline::Analysis;
use crate::ports::filesystem::FileSystem;

/// Persistence layer for analyses.
pub struct GraphStore<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
}

impl<'a> GraphStore<'a> {
    /// Creates a store rooted at the given path.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, root: &Path) -> Self {
        Self { fs, root: root.to_path_buf() }
    }

    /// Saves an analysis as `<root>/projects/<id>.json`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is not a plain file name or the write fails.
    pub fn save(&self, analysis: &Analysis) -> Result<PathBuf, AnalysisError> {
        let path = self.project_path(&analysis.project_id)?;
        let json = serde_json::to_string_pretty(analysis).map_err(|e| AnalysisError::Store {
            reason: format!("failed to serialize {}: {e}", analysis.project_id),
        })?;
        self.fs.write(&path, &json).map_err(|e| AnalysisError::Store {
            reason: format!("failed to write {}: {e}", path.display()),
        })?;
        Ok(path)
    }

    /// Loads a stored analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if the project is unknown or its file cannot be parsed.
    pub fn load(&self, id: &str) -> Result<Analysis, AnalysisError> {
        let path = self.project_path(id)?;
        let contents = self.fs.read_to_string(&path).map_err(|e| AnalysisError::Store {
            reason: format!("no stored project {id}: {e}"),
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| AnalysisError::Store { reason: format!("failed to parse project {id}: {e}") })
    }

    /// Loads only the display graph of a stored analysis.
    ///
    /// # Errors
    ///
    /// Same as [`GraphStore::load`].
    pub fn load_graph(&self, id: &str) -> Result<Graph, AnalysisError> {
        self.load(id).map(|analysis| analysis.graph)
    }

    /// Lists stored project ids, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the projects directory exists but cannot be listed.
    pub fn list(&self) -> Result<Vec<String>, AnalysisError> {
        let dir = self.root.join("projects");
        if !self.fs.exists(&dir) {
            return Ok(Vec::new());
        }
        let entries = self.fs.list_dir(&dir).map_err(|e| AnalysisError::Store {
            reason: format!("failed to list {}: {e}", dir.display()),
        })?;
        Ok(entries.into_iter().filter_map(|n| n.strip_suffix(".json").map(String::from)).collect())
    }

    fn project_path(&self, id: &str) -> Result<PathBuf, AnalysisError> {
        let plain = !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\']);
        if !plain {
            return Err(AnalysisError::Store { reason: format!("invalid project id {id:?}") });
        }
        Ok(self.root.join("projects").join(format!("{id}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencyLink, FileNode};
    use crate::materialize::RepoStats;
    use crate::synth::validate::AnalysisPayload;
    use crate::testing::MemFs;
    use chrono::{TimeZone, Utc};

    fn sample(id: &str) -> Analysis {
        Analysis {
            project_id: id.into(),
            name: "widget".into(),
            repository_url: "https://github.com/acme/widget".into(),
            branch: "main".into(),
            analyzed_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            stats: RepoStats { file_count: 2, total_lines: 10, js_files: 2, json_files: 0, md_files: 0 },
            dependencies: vec!["react".into()],
            payload: AnalysisPayload::default(),
            graph: Graph {
                nodes: vec![
                    FileNode { id: "app.js".into(), name: "app.js".into(), group: 1, radius: 20.0 },
                    FileNode { id: "lib.js".into(), name: "lib.js".into(), group: 2, radius: 10.5 },
                ],
                links: vec![DependencyLink { source: "app.js".into(), target: "lib.js".into(), value: 1 }],
            },
            static_graph: Graph::default(),
            exports: std::collections::BTreeMap::new(),
            skipped_files: Vec::new(),
            graph_retried: false,
        }
    }

    #[test]
    fn graphs_round_trip_byte_for_byte() {
        let fs = MemFs::new();
        let store = GraphStore::new(&fs, Path::new("/store"));

        let path = store.save(&sample("widget")).unwrap();
        assert_eq!(path, Path::new("/store/projects/widget.json"));
        let written = fs.contents(&path).unwrap();

        let loaded = store.load("widget").unwrap();
        assert_eq!(loaded, sample("widget"));
        assert_eq!(serde_json::to_string_pretty(&loaded).unwrap(), written);
        assert_eq!(store.load_graph("widget").unwrap(), sample("widget").graph);
    }

    #[test]
    fn list_returns_saved_ids() {
        let fs = MemFs::new();
        let store = GraphStore::new(&fs, Path::new("/store"));
        assert!(store.list().unwrap().is_empty());

        store.save(&sample("beta")).unwrap();
        store.save(&sample("alpha")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn unknown_and_unsafe_ids_are_store_errors() {
        let fs = MemFs::new();
        let store = GraphStore::new(&fs, Path::new("/store"));
        assert!(matches!(store.load("missing"), Err(AnalysisError::Store { .. })));
        assert!(store.save(&sample("../escape")).is_err());
        assert!(store.load("").is_err());
    }
}
