//! Module-specifier resolution against the scanned file tree.

use std::collections::HashSet;

/// Extensions tried, in order, when a specifier omits one.
const RESOLVE_EXTENSIONS: [&str; 4] = ["ts", "tsx", "js", "jsx"];

/// Where a specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A path inside the repository, `/`-separated and relative to the root.
    Internal(String),
    /// A bare package name; not part of the file graph.
    External,
    /// A relative specifier that climbs above the repository root.
    OutsideRoot,
}

/// Resolves relative specifiers to node ids.
///
/// A resolved path that names a known file (directly, with one of the
/// source extensions appended, or as a directory `index` file) resolves to
/// that file's id. Otherwise the normalized path is used as-is, so
/// `./d` imported from `a/b/c.ts` becomes `a/b/d`.
#[derive(Debug, Default)]
pub struct Resolver {
    known: HashSet<String>,
}

impl Resolver {
    /// Builds a resolver over the given relative file ids.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { known: ids.into_iter().map(Into::into).collect() }
    }

    /// Resolves `specifier` as imported from the file `importer`.
    #[must_use]
    pub fn resolve(&self, importer: &str, specifier: &str) -> Resolution {
        if !is_relative(specifier) {
            return Resolution::External;
        }
        let Some(path) = join_normalized(parent_dir(importer), specifier) else {
            return Resolution::OutsideRoot;
        };
        match self.match_known(path) {
            // The repository root itself with no index file.
            resolved if resolved.is_empty() => Resolution::OutsideRoot,
            resolved => Resolution::Internal(resolved),
        }
    }

    fn match_known(&self, path: String) -> String {
        if self.known.contains(&path) {
            return path;
        }
        let with_extension = RESOLVE_EXTENSIONS
            .iter()
            .filter(|_| !path.is_empty())
            .map(|ext| format!("{path}.{ext}"));
        let as_directory =
            RESOLVE_EXTENSIONS.iter().map(|ext| join_dir(&path, &format!("index.{ext}")));
        let found = with_extension.chain(as_directory).find(|c| self.known.contains(c));
        found.unwrap_or(path)
    }
}

/// `.`-prefixed specifiers (`./x`, `../x`, `.`, `..`) are relative.
fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('.')
}

/// Directory part of a `/`-separated id; empty for root-level files.
#[must_use]
pub fn parent_dir(id: &str) -> &str {
    id.rsplit_once('/').map_or("", |(dir, _)| dir)
}

fn join_dir(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Joins `specifier` onto `dir`, folding `.` and `..` segments.
///
/// Returns `None` if the result would leave the root.
fn join_normalized(dir: &str, specifier: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
