//! One analysis run: materialize, extract, synthesize, persist.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::error::AnalysisError;
use crate::extract::{self, SkippedFile};
use crate::graph::Graph;
use crate::materialize::{self, RepoStats};
use crate::ports::source::FetchRequest;
use crate::store::GraphStore;
use crate::synth::validate::AnalysisPayload;
use crate::synth::{SynthesisInput, Synthesizer};

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    /// Repository URL.
    pub url: String,
    /// Branch to analyze.
    pub branch: String,
    /// Token for private repositories.
    pub access_token: Option<String>,
    /// Store key; defaults to the repository name.
    pub project_id: Option<String>,
}

/// A completed, persisted analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    /// Store key.
    pub project_id: String,
    /// Repository name derived from the URL.
    pub name: String,
    /// Repository URL as requested.
    pub repository_url: String,
    /// Analyzed branch.
    pub branch: String,
    /// Completion time.
    pub analyzed_at: DateTime<Utc>,
    /// File and line counts.
    pub stats: RepoStats,
    /// Package names from `package.json`.
    pub dependencies: Vec<String>,
    /// Validated model analysis.
    pub payload: AnalysisPayload,
    /// The model-authored graph, authoritative for display. May be empty.
    pub graph: Graph,
    /// The statically extracted graph, kept alongside.
    pub static_graph: Graph,
    /// Exported names per scanned file.
    pub exports: BTreeMap<String, Vec<String>>,
    /// Source files the extractor could not scan.
    pub skipped_files: Vec<SkippedFile>,
    /// Whether the graph-only model retry was needed.
    pub graph_retried: bool,
}

/// Runs the full pipeline and stores the result under `settings.store_root`.
///
/// Only retrieval, workspace and store failures are errors; extraction and
/// model problems degrade the output instead.
///
/// # Errors
///
/// Returns an [`AnalysisError`] if the repository cannot be fetched or the
/// result cannot be stored.
pub async fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    request: &AnalyzeRequest,
) -> Result<Analysis, AnalysisError> {
    ctx.note_repository(&request.url);
    let name = materialize::repo_name(&request.url);
    let project_id = request.project_id.clone().unwrap_or_else(|| name.clone());

    let fetch = FetchRequest {
        url: request.url.clone(),
        branch: request.branch.clone(),
        access_token: request.access_token.clone(),
    };
    let checkout = materialize::fetch(ctx, settings, &fetch).await?;
    let fs = ctx.fs.as_ref();

    let extraction = extract::extract(fs, &checkout.root, &checkout.files, settings.max_file_bytes);
    info!(
        nodes = extraction.graph.nodes.len(),
        links = extraction.graph.links.len(),
        skipped = extraction.skipped.len(),
        "static extraction complete"
    );
    let stats = materialize::collect_stats(fs, &checkout.files);
    let dependencies = materialize::package_dependencies(fs, &checkout.root);
    let file_tree = materialize::file_tree(&checkout.root, &checkout.files);
    let key_files =
        materialize::key_file_contents(fs, &checkout.root, &checkout.files, settings.max_file_bytes);
    let fallback_main_files = materialize::main_files(&checkout.root, &checkout.files);
    materialize::cleanup(fs, &checkout);

    let synthesizer = Synthesizer::new(
        ctx.llm.as_ref(),
        settings.model.clone(),
        Duration::from_secs(settings.llm_timeout_secs),
    );
    let synthesis = synthesizer
        .synthesize(SynthesisInput { file_tree: &file_tree, key_files: &key_files })
        .await;
    let mut payload = synthesis.payload;
    if payload.main_files.is_empty() {
        info!(count = fallback_main_files.len(), "model named no main files, using file-name heuristic");
        payload.main_files = fallback_main_files;
    }

    let analysis = Analysis {
        project_id,
        name,
        repository_url: request.url.clone(),
        branch: request.branch.clone(),
        analyzed_at: ctx.clock.now(),
        stats,
        dependencies,
        payload,
        graph: synthesis.graph,
        static_graph: extraction.graph,
        exports: extraction.exports,
        skipped_files: extraction.skipped,
        graph_retried: synthesis.retried,
    };

    let path = GraphStore::new(fs, &settings.store_root).save(&analysis)?;
    info!(project = %analysis.project_id, path = %path.display(), "analysis stored");
    Ok(analysis)
}
