//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitSource;
use crate::adapters::live::llm::LiveLlmClient;
use crate::adapters::recording::{RecordingClock, RecordingLlmClient, RecordingRepoSource};
use crate::adapters::replaying::{ReplayingClock, ReplayingLlmClient, ReplayingRepoSource};
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::Settings;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::llm::LlmClient;
use crate::ports::source::RepoSource;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Clock for obtaining the current time.
    pub clock: Box<dyn Clock>,
    /// Filesystem for file I/O.
    pub fs: Box<dyn FileSystem>,
    /// Repository host the checkout is fetched from.
    pub source: Box<dyn RepoSource>,
    /// LLM client for language-model completions.
    pub llm: Box<dyn LlmClient>,
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(
        clock: Box<dyn Clock>,
        fs: Box<dyn FileSystem>,
        source: Box<dyn RepoSource>,
        llm: Box<dyn LlmClient>,
    ) -> Self {
        Self { clock, fs, source, llm, recorder: None }
    }

    /// Creates a live context talking to git and the configured LLM endpoint.
    #[must_use]
    pub fn live(settings: &Settings) -> Self {
        Self::new(
            Box::new(LiveClock),
            Box::new(LiveFileSystem),
            Box::new(LiveGitSource),
            Box::new(LiveLlmClient::new(settings)),
        )
    }

    /// Creates a recording context around the live adapters.
    ///
    /// Clock, source and LLM interactions are captured; call
    /// [`ServiceContext::finish_recording`] to write the cassette to `path`.
    /// This is the developer-only mechanism behind `REPOGRAPH_RECORD`.
    #[must_use]
    pub fn recording(path: &Path, settings: &Settings) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "repograph-session")));
        Self {
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&recorder))),
            fs: Box::new(LiveFileSystem),
            source: Box::new(RecordingRepoSource::new(
                Box::new(LiveGitSource),
                Arc::clone(&recorder),
            )),
            llm: Box::new(RecordingLlmClient::new(
                Box::new(LiveLlmClient::new(settings)),
                Arc::clone(&recorder),
            )),
            recorder: Some(recorder),
        }
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// Clock, source and LLM are served from the cassette; the filesystem
    /// stays live so the replayed checkout is written to real disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;

        // Each port gets its own replayer so per-port cursors are independent.
        Ok(Self::new(
            Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            Box::new(LiveFileSystem),
            Box::new(ReplayingRepoSource::new(CassetteReplayer::new(&cassette))),
            Box::new(ReplayingLlmClient::new(CassetteReplayer::new(&cassette))),
        ))
    }

    /// Tags an in-progress recording with the repository under analysis.
    pub fn note_repository(&self, url: &str) {
        if let Some(recorder) = &self.recorder {
            recorder
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .set_repository(url);
        }
    }

    /// Writes the cassette if this context is recording.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish_recording(&self) -> Result<Option<PathBuf>, String> {
        let Some(recorder) = &self.recorder else { return Ok(None) };
        let guard = recorder.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .finish()
            .map(Some)
            .map_err(|e| format!("Failed to write cassette {}: {e}", guard.path().display()))
    }
}
