//! `repograph analyze` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::pipeline::{self, Analysis, AnalyzeRequest};

/// Execute the `analyze` command.
///
/// Runs one analysis pipeline on a single-threaded runtime, stores the
/// result, and prints a short report.
///
/// # Errors
///
/// Returns an error string if the runtime cannot start, the repository
/// cannot be fetched, or the result cannot be stored.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    url: &str,
    branch: &str,
    project: Option<&str>,
    access_token: Option<String>,
) -> Result<(), String> {
    let request = AnalyzeRequest {
        url: url.to_string(),
        branch: branch.to_string(),
        access_token,
        project_id: project.map(String::from),
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    let analysis = runtime
        .block_on(pipeline::run(ctx, settings, &request))
        .map_err(|e| format!("analysis of {url} failed: {e}"))?;
    print_report(&analysis);
    Ok(())
}

fn print_report(analysis: &Analysis) {
    println!("Project: {}", analysis.project_id);
    println!("Repository: {} ({})", analysis.repository_url, analysis.branch);
    println!(
        "Files: {} ({} source, {} json, {} markdown), {} lines",
        analysis.stats.file_count,
        analysis.stats.js_files,
        analysis.stats.json_files,
        analysis.stats.md_files,
        analysis.stats.total_lines
    );
    println!(
        "Graph: {} nodes, {} links{}",
        analysis.graph.nodes.len(),
        analysis.graph.links.len(),
        if analysis.graph_retried { " (after retry)" } else { "" }
    );
    println!(
        "Static graph: {} nodes, {} links",
        analysis.static_graph.nodes.len(),
        analysis.static_graph.links.len()
    );
    if !analysis.skipped_files.is_empty() {
        println!("Skipped files: {}", analysis.skipped_files.len());
    }
    println!("\nUse `repograph show {}` for the summary.", analysis.project_id);
}
