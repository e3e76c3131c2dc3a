//! `repograph show` command.

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::pipeline::Analysis;
use crate::store::GraphStore;

/// Execute the `show` command.
///
/// When `project` is provided, prints the stored analysis summary.
/// When no project is given, lists all stored project ids.
///
/// # Errors
///
/// Returns an error string if the store cannot be read.
pub fn run(ctx: &ServiceContext, settings: &Settings, project: Option<&str>) -> Result<(), String> {
    let store = GraphStore::new(ctx.fs.as_ref(), &settings.store_root);

    if let Some(id) = project {
        let analysis = store.load(id).map_err(|e| e.to_string())?;
        print_analysis(&analysis);
        return Ok(());
    }

    let ids = store.list().map_err(|e| e.to_string())?;
    if ids.is_empty() {
        println!("No projects found in store.");
    } else {
        println!("Stored projects:");
        for id in &ids {
            println!("  {id}");
        }
        println!("\nUse `repograph show <PROJECT>` to view details.");
    }
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let payload = &analysis.payload;
    println!("Project: {}", analysis.project_id);
    println!("Repository: {} ({})", analysis.repository_url, analysis.branch);
    println!("Analyzed: {}", analysis.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Type: {}", payload.project_type);
    println!(
        "Files: {} ({} source, {} json, {} markdown), {} lines",
        analysis.stats.file_count,
        analysis.stats.js_files,
        analysis.stats.json_files,
        analysis.stats.md_files,
        analysis.stats.total_lines
    );
    if !analysis.dependencies.is_empty() {
        println!("Dependencies: {}", analysis.dependencies.join(", "));
    }
    println!(
        "Graph: {} nodes, {} links (static: {} nodes, {} links)",
        analysis.graph.nodes.len(),
        analysis.graph.links.len(),
        analysis.static_graph.nodes.len(),
        analysis.static_graph.links.len()
    );

    println!("\nOverview: {}", payload.summary.overview);
    println!("Architecture: {}", payload.summary.architecture);
    println!("Testing: {}", payload.summary.testing_approach);
    println!("Code quality: {}", payload.summary.code_quality);

    if !payload.main_files.is_empty() {
        println!("\nMain files:");
        for file in &payload.main_files {
            println!("  {} ({:.2}): {}", file.path, file.confidence, file.description);
        }
    }

    let structure = &payload.suggested_structure;
    for (label, files) in [
        ("Entry points", &structure.entry_points),
        ("Config files", &structure.config_files),
        ("Test files", &structure.test_files),
        ("Asset files", &structure.asset_files),
    ] {
        if !files.is_empty() {
            println!("{label}: {}", files.join(", "));
        }
    }

    if !analysis.skipped_files.is_empty() {
        println!("\nSkipped files:");
        for skipped in &analysis.skipped_files {
            println!("  {}: {}", skipped.path, skipped.reason);
        }
    }
}
