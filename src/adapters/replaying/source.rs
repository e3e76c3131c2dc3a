//! Replaying adapter for the `RepoSource` port.
//!
//! A recorded fetch carries a snapshot of the checkout (relative path to
//! contents); replay writes that snapshot into the destination directory.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::source::{FetchFuture, FetchRequest, RepoSource};

/// Files captured from a fetched checkout, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSnapshot {
    /// File contents by relative path.
    pub files: BTreeMap<String, String>,
}

impl CheckoutSnapshot {
    /// Write every file of the snapshot under `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file escapes `dest` or cannot be written.
    pub fn materialize(&self, dest: &Path) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(dest)?;
        for (relative, contents) in &self.files {
            if relative.split('/').any(|part| part == "..") || relative.starts_with('/') {
                return Err(std::io::Error::other(format!("snapshot path escapes checkout: {relative}")));
            }
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
        }
        Ok(())
    }
}

/// Serves recorded fetches by recreating the recorded checkout.
pub struct ReplayingRepoSource {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingRepoSource {
    /// Create a replaying source backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl RepoSource for ReplayingRepoSource {
    fn fetch<'a>(&'a self, _request: &'a FetchRequest, dest: &'a Path) -> FetchFuture<'a> {
        let output = next_output(&self.replayer, "source", "fetch");
        Box::pin(async move {
            let snapshot: CheckoutSnapshot = replay_result(output)?;
            snapshot.materialize(dest)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn replayer(output: serde_json::Value) -> CassetteReplayer {
        CassetteReplayer::new(&Cassette {
            name: "source".into(),
            recorded_at: Utc::now(),
            repository: String::new(),
            interactions: vec![Interaction {
                seq: 0,
                port: "source".into(),
                method: "fetch".into(),
                input: json!({"url": "https://github.com/acme/app", "branch": "main"}),
                output,
            }],
        })
    }

    fn request() -> FetchRequest {
        FetchRequest {
            url: "https://github.com/acme/app".into(),
            branch: "main".into(),
            access_token: None,
        }
    }

    #[tokio::test]
    async fn recreates_recorded_checkout() {
        let dest = std::env::temp_dir().join("repograph_replay_source_ok");
        let _ = std::fs::remove_dir_all(&dest);
        let source = ReplayingRepoSource::new(replayer(
            json!({"ok": {"files": {"index.js": "import './lib/a';", "lib/a.js": "export const a = 1;"}}}),
        ));

        source.fetch(&request(), &dest).await.unwrap();
        assert_eq!(std::fs::read_to_string(dest.join("lib/a.js")).unwrap(), "export const a = 1;");

        let _ = std::fs::remove_dir_all(&dest);
    }

    #[tokio::test]
    async fn replays_recorded_failure() {
        let dest = std::env::temp_dir().join("repograph_replay_source_err");
        let source = ReplayingRepoSource::new(replayer(json!({"err": "Remote branch nope not found"})));
        let err = source.fetch(&request(), &dest).await.unwrap_err();
        assert!(err.to_string().contains("nope"));
        assert!(!dest.exists());
    }

    #[test]
    fn snapshot_rejects_escaping_paths() {
        let dest = std::env::temp_dir().join("repograph_replay_source_escape");
        let mut snapshot = CheckoutSnapshot::default();
        snapshot.files.insert("../outside.js".into(), String::new());
        assert!(snapshot.materialize(&dest).is_err());
        let _ = std::fs::remove_dir_all(&dest);
    }
}
