//! Filesystem port for file I/O operations.

use std::path::{Path, PathBuf};

use crate::error::BoxError;

/// Provides filesystem access for checkouts, scanning, and the store.
///
/// Abstracting the filesystem allows deterministic replay and testing
/// without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, BoxError>;

    /// Writes the given contents to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), BoxError>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Lists the entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, BoxError>;

    /// Recursively lists every regular file under `root` as absolute paths,
    /// sorted, without descending into directories named in `exclude_dirs`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` itself cannot be read. Unreadable
    /// subdirectories are skipped.
    fn walk_files(&self, root: &Path, exclude_dirs: &[&str]) -> Result<Vec<PathBuf>, BoxError>;

    /// Returns the size of a file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    fn file_size(&self, path: &Path) -> Result<u64, BoxError>;

    /// Creates a directory and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), BoxError>;

    /// Removes a directory tree. Removing a missing path succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing tree cannot be removed.
    fn remove_dir_all(&self, path: &Path) -> Result<(), BoxError>;
}
