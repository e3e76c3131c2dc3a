//! Recording adapter for the `RepoSource` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::record_result;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::replaying::source::CheckoutSnapshot;
use crate::cassette::recorder::CassetteRecorder;
use crate::error::BoxError;
use crate::ports::filesystem::FileSystem;
use crate::ports::source::{FetchFuture, FetchRequest, RepoSource};

/// Records fetches, capturing the checkout's text files so replay can
/// recreate it without network access.
pub struct RecordingRepoSource {
    inner: Box<dyn RepoSource>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingRepoSource {
    /// Creates a new recording source wrapping the given implementation.
    pub fn new(inner: Box<dyn RepoSource>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl RepoSource for RecordingRepoSource {
    fn fetch<'a>(&'a self, request: &'a FetchRequest, dest: &'a Path) -> FetchFuture<'a> {
        Box::pin(async move {
            let result = match self.inner.fetch(request, dest).await {
                Ok(()) => snapshot(dest),
                Err(e) => Err(e),
            };
            record_result(&self.recorder, "source", "fetch", request, &result);
            result.map(|_| ())
        })
    }
}

/// Capture every UTF-8 file under `root`, skipping VCS metadata and vendored packages.
fn snapshot(root: &Path) -> Result<CheckoutSnapshot, BoxError> {
    let fs = LiveFileSystem;
    let mut snapshot = CheckoutSnapshot::default();
    for path in fs.walk_files(root, &[".git", "node_modules"])? {
        let Ok(relative) = path.strip_prefix(root) else { continue };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match fs.read_to_string(&path) {
            Ok(contents) => {
                snapshot.files.insert(key, contents);
            }
            Err(e) => debug!("not recording {key}: {e}"),
        }
    }
    Ok(snapshot)
}
