//! Repository materialization: fetch a checkout into a scratch directory,
//! list its files, and gather the facts the model prompt needs.
//!
//! Checkouts live at `<workdir>/<millis>/<repo-name>` and are removed after
//! analysis whether or not it succeeded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::AnalysisError;
use crate::extract::{is_source_file, relative_id, EXCLUDED_DIRS};
use crate::ports::filesystem::FileSystem;
use crate::ports::source::FetchRequest;
use crate::synth::validate::MainFile;

/// Basenames whose contents are shown to the model.
pub const KEY_FILES: [&str; 14] = [
    "package.json",
    "tsconfig.json",
    "README.md",
    ".eslintrc",
    "jest.config.js",
    "webpack.config.js",
    "vite.config.ts",
    "next.config.js",
    "app.ts",
    "app.js",
    "index.ts",
    "index.js",
    "main.ts",
    "main.js",
];

/// Root-level files that are always worth pointing at, with their role.
const ROOT_MAIN_FILES: [(&str, &str); 6] = [
    ("index.js", "Main entry point"),
    ("app.js", "Application entry point"),
    ("server.js", "Server entry point"),
    ("package.json", "Project configuration and dependencies"),
    ("README.md", "Project documentation"),
    (".env.example", "Environment variables template"),
];

/// Entry points recognized directly under `src/`.
const SRC_ENTRY_POINTS: [&str; 3] = ["index.js", "app.js", "main.js"];

/// A fetched repository on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Root of the working tree.
    pub root: PathBuf,
    /// Per-run scratch directory holding `root`; removed by [`cleanup`].
    pub scratch: PathBuf,
    /// Every file under `root` outside the excluded directories, sorted.
    pub files: Vec<PathBuf>,
}

/// File and line counts for a checkout.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoStats {
    /// All files outside excluded directories.
    pub file_count: usize,
    /// Sum of line counts; unreadable files count zero.
    pub total_lines: usize,
    /// `.js .jsx .ts .tsx` files.
    pub js_files: usize,
    /// `.json` files.
    pub json_files: usize,
    /// `.md .markdown` files.
    pub md_files: usize,
}

/// Name of a repository from its URL: the last path segment without `.git`.
///
/// Falls back to `repo` for anything that is not a single plain path
/// component, so the checkout always lands inside its scratch directory.
#[must_use]
pub fn repo_name(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit(['/', ':']).next().unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        "repo".to_string()
    } else {
        name.to_string()
    }
}

/// Fetches `request` into a fresh scratch directory and lists its files.
///
/// # Errors
///
/// Returns [`AnalysisError::Retrieval`] if the source fails,
/// [`AnalysisError::Timeout`] if it exceeds `settings.clone_timeout_secs`, and
/// [`AnalysisError::Workspace`] if the scratch directory cannot be prepared
/// or read. Partial checkouts are removed before returning an error.
pub async fn fetch(
    ctx: &ServiceContext,
    settings: &Settings,
    request: &FetchRequest,
) -> Result<Checkout, AnalysisError> {
    let scratch = settings.workdir.join(ctx.clock.now().timestamp_millis().to_string());
    let root = scratch.join(repo_name(&request.url));
    ctx.fs.create_dir_all(&scratch).map_err(|e| AnalysisError::Workspace {
        path: scratch.clone(),
        reason: e.to_string(),
    })?;

    info!(url = %request.url, branch = %request.branch, dest = %root.display(), "fetching repository");
    let limit = Duration::from_secs(settings.clone_timeout_secs);
    let fetched = tokio::time::timeout(limit, ctx.source.fetch(request, &root)).await;

    let failure = match fetched {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            Some(AnalysisError::Retrieval { url: request.url.clone(), reason: e.to_string() })
        }
        Err(_) => Some(AnalysisError::Timeout { stage: "clone", secs: settings.clone_timeout_secs }),
    };
    if let Some(err) = failure {
        remove_scratch(ctx.fs.as_ref(), &scratch);
        return Err(err);
    }

    match ctx.fs.walk_files(&root, &EXCLUDED_DIRS) {
        Ok(files) => {
            debug!("checkout has {} files", files.len());
            Ok(Checkout { root, scratch, files })
        }
        Err(e) => {
            remove_scratch(ctx.fs.as_ref(), &scratch);
            Err(AnalysisError::Workspace { path: root, reason: e.to_string() })
        }
    }
}

/// Removes the checkout's scratch directory.
pub fn cleanup(fs: &dyn FileSystem, checkout: &Checkout) {
    remove_scratch(fs, &checkout.scratch);
}

fn remove_scratch(fs: &dyn FileSystem, scratch: &Path) {
    if let Err(e) = fs.remove_dir_all(scratch) {
        warn!("failed to remove {}: {e}", scratch.display());
    }
}

/// Newline-separated sorted relative paths.
#[must_use]
pub fn file_tree(root: &Path, files: &[PathBuf]) -> String {
    let mut ids: Vec<String> = files.iter().filter_map(|f| relative_id(root, f)).collect();
    ids.sort();
    ids.join("\n")
}

/// Counts files by kind and totals their lines.
#[must_use]
pub fn collect_stats(fs: &dyn FileSystem, files: &[PathBuf]) -> RepoStats {
    let mut stats = RepoStats::default();
    for file in files {
        stats.file_count += 1;
        stats.total_lines += match fs.read_to_string(file) {
            Ok(content) => content.split('\n').count(),
            Err(e) => {
                debug!("not counting lines of {}: {e}", file.display());
                0
            }
        };

        let ext = file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
        match ext.as_deref() {
            _ if is_source_file(file) => stats.js_files += 1,
            Some("json") => stats.json_files += 1,
            Some("md" | "markdown") => stats.md_files += 1,
            _ => {}
        }
    }
    stats
}

/// Names from `package.json` `dependencies` and `devDependencies`, sorted
/// and deduplicated. A missing or malformed manifest yields nothing.
#[must_use]
pub fn package_dependencies(fs: &dyn FileSystem, root: &Path) -> Vec<String> {
    let manifest = root.join("package.json");
    let Ok(content) = fs.read_to_string(&manifest) else {
        return Vec::new();
    };
    let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) else {
        warn!("package.json is not valid JSON");
        return Vec::new();
    };

    let mut names: Vec<String> = ["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| json.get(section).and_then(serde_json::Value::as_object))
        .flat_map(|deps| deps.keys().cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Contents of the [`KEY_FILES`] found anywhere in the checkout.
///
/// Oversized files are listed with a marker instead of their contents.
#[must_use]
pub fn key_file_contents(fs: &dyn FileSystem, root: &Path, files: &[PathBuf], max_bytes: u64) -> String {
    let mut sections = Vec::new();
    for file in files {
        let is_key = file.file_name().and_then(|n| n.to_str()).is_some_and(|n| KEY_FILES.contains(&n));
        let Some(id) = relative_id(root, file).filter(|_| is_key) else { continue };

        match fs.file_size(file) {
            Ok(bytes) if bytes > max_bytes => {
                sections.push(format!("{id}: [File too large to analyze]"));
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("cannot stat {id}: {e}");
                continue;
            }
        }
        match fs.read_to_string(file) {
            Ok(content) => sections.push(format!("{id}:\n{content}\n")),
            Err(e) => warn!("cannot read {id}: {e}"),
        }
    }
    sections.join("\n---\n")
}

/// Main files found by name alone, used when the model names none.
///
/// `src/` entry points come first, then root-level key files, then
/// `routes/index.js` if the checkout has a `routes/` directory.
#[must_use]
pub fn main_files(root: &Path, files: &[PathBuf]) -> Vec<MainFile> {
    let mut ids: Vec<String> = files.iter().filter_map(|f| relative_id(root, f)).collect();
    ids.sort();

    let entry = |path: String, description: &str| MainFile {
        path,
        description: description.to_string(),
        confidence: 0.0,
    };
    let src = ids.iter().filter_map(|id| {
        let name = id.strip_prefix("src/")?;
        SRC_ENTRY_POINTS.contains(&name).then(|| entry(id.clone(), "Source entry point"))
    });
    let top = ids.iter().filter_map(|id| {
        ROOT_MAIN_FILES
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, description)| entry(id.clone(), description))
    });
    let routes = ids
        .iter()
        .any(|id| id.starts_with("routes/"))
        .then(|| entry("routes/index.js".to_string(), "API routes definition"));

    src.chain(top).chain(routes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;

    fn paths(fs: &MemFs) -> Vec<PathBuf> {
        fs.walk_files(Path::new("/repo"), &EXCLUDED_DIRS).unwrap()
    }

    #[test]
    fn repo_name_from_url() {
        assert_eq!(repo_name("https://github.com/acme/widget.git"), "widget");
        assert_eq!(repo_name("https://github.com/acme/widget/"), "widget");
        assert_eq!(repo_name("git@github.com:acme/widget.git"), "widget");
        assert_eq!(repo_name(""), "repo");
        assert_eq!(repo_name("https://github.com/acme/.git"), "repo");
    }

    #[test]
    fn main_files_by_name() {
        let root = Path::new("/repo");
        let files: Vec<PathBuf> = [
            "README.md",
            "package.json",
            "server.js",
            "lib/index.js",
            "src/app.js",
            "src/util.js",
            "src/nested/main.js",
            "routes/users.js",
        ]
        .iter()
        .map(|f| root.join(f))
        .collect();

        let found: Vec<(String, String)> =
            main_files(root, &files).into_iter().map(|m| (m.path, m.description)).collect();
        let expected = [
            ("src/app.js", "Source entry point"),
            ("README.md", "Project documentation"),
            ("package.json", "Project configuration and dependencies"),
            ("server.js", "Server entry point"),
            ("routes/index.js", "API routes definition"),
        ];
        let expected: Vec<(String, String)> =
            expected.iter().map(|(p, d)| ((*p).to_string(), (*d).to_string())).collect();
        assert_eq!(found, expected);
        assert!(main_files(root, &[]).is_empty());
    }

    #[test]
    fn repo_name_never_escapes_the_scratch_directory() {
        assert_eq!(repo_name("https://github.com/acme/.."), "repo");
        assert_eq!(repo_name("https://github.com/acme/../"), "repo");
        assert_eq!(repo_name("https://github.com/acme/."), "repo");
        assert_eq!(repo_name("https://github.com/acme/..\\evil"), "repo");
        let scratch = Path::new("/work/1");
        assert!(scratch.join(repo_name("https://host/x/..")).starts_with(scratch));
    }

    #[test]
    fn stats_count_kinds_and_lines() {
        let fs = MemFs::new()
            .with_file("/repo/src/app.ts", "a\nb\nc")
            .with_file("/repo/package.json", "{}\n")
            .with_file("/repo/README.md", "# hi")
            .with_file("/repo/docs/guide.markdown", "")
            .with_file("/repo/logo.svg", "<svg/>")
            .with_file("/repo/node_modules/x/index.js", "ignored");
        let stats = collect_stats(&fs, &paths(&fs));
        assert_eq!(
            stats,
            RepoStats { file_count: 5, total_lines: 3 + 2 + 1 + 1 + 1, js_files: 1, json_files: 1, md_files: 2 }
        );
    }

    #[test]
    fn dependencies_are_merged_and_sorted() {
        let fs = MemFs::new().with_file(
            "/repo/package.json",
            r#"{"dependencies": {"react": "^18", "axios": "1"}, "devDependencies": {"vite": "5", "react": "^18"}}"#,
        );
        assert_eq!(package_dependencies(&fs, Path::new("/repo")), vec!["axios", "react", "vite"]);

        let broken = MemFs::new().with_file("/repo/package.json", "{ nope");
        assert!(package_dependencies(&broken, Path::new("/repo")).is_empty());
        assert!(package_dependencies(&MemFs::new(), Path::new("/repo")).is_empty());
    }

    #[test]
    fn key_files_are_joined_with_separator_and_size_marker() {
        let fs = MemFs::new()
            .with_file("/repo/package.json", "{}")
            .with_file("/repo/src/index.ts", &"x".repeat(64))
            .with_file("/repo/src/other.ts", "not a key file");
        let contents = key_file_contents(&fs, Path::new("/repo"), &paths(&fs), 32);
        assert_eq!(contents, "package.json:\n{}\n\n---\nsrc/index.ts: [File too large to analyze]");
    }

    #[test]
    fn file_tree_lists_relative_paths() {
        let fs = MemFs::new().with_file("/repo/b.js", "").with_file("/repo/a/c.js", "");
        assert_eq!(file_tree(Path::new("/repo"), &paths(&fs)), "a/c.js\nb.js");
    }
}
