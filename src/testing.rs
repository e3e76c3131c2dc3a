//! Test doubles shared by unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::BoxError;
use crate::ports::filesystem::FileSystem;

/// In-memory filesystem for exercising store and extractor logic without disk.
#[derive(Default)]
pub(crate) struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MemFs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, returning `self` for chaining.
    pub(crate) fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files.lock().unwrap().insert(path.into(), contents.to_string());
        self
    }

    pub(crate) fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }
}

impl FileSystem for MemFs {
    fn read_to_string(&self, path: &Path) -> Result<String, BoxError> {
        self.contents(path).ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxError> {
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        // A directory exists if it was created or if any file lives under it.
        self.dirs.lock().unwrap().contains(path)
            || self.files.lock().unwrap().keys().any(|k| k.starts_with(path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, BoxError> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter(|k| k.parent() == Some(path))
            .filter_map(|k| k.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn walk_files(&self, root: &Path, exclude_dirs: &[&str]) -> Result<Vec<PathBuf>, BoxError> {
        if !self.exists(root) {
            return Err(format!("Directory not found: {}", root.display()).into());
        }
        let files = self.files.lock().unwrap();
        Ok(files
            .keys()
            .filter(|k| {
                k.strip_prefix(root).is_ok_and(|rel| {
                    let parent_dirs = rel.parent().into_iter().flat_map(Path::components);
                    !parent_dirs
                        .into_iter()
                        .any(|c| exclude_dirs.iter().any(|ex| c.as_os_str() == *ex))
                })
            })
            .cloned()
            .collect())
    }

    fn file_size(&self, path: &Path) -> Result<u64, BoxError> {
        let contents = self.read_to_string(path)?;
        Ok(contents.len() as u64)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), BoxError> {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), BoxError> {
        self.files.lock().unwrap().retain(|k, _| !k.starts_with(path));
        self.dirs.lock().unwrap().retain(|k| !k.starts_with(path));
        Ok(())
    }
}
