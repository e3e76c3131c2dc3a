//! `repograph layout` command.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::debug;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::graph::Graph;
use crate::layout::{svg, GraphView, ViewType};
use crate::pipeline::Analysis;
use crate::store::GraphStore;
use crate::synth::validate::validate_graph;

/// Options for one layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Layout mode.
    pub view: ViewType,
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
    /// Frame limit for the force simulation; runs until settled when absent.
    pub ticks: Option<usize>,
    /// SVG output path; JSON goes to stdout when absent.
    pub svg: Option<PathBuf>,
    /// Lay out the static graph of a stored analysis.
    pub use_static: bool,
}

/// Execute the `layout` command.
///
/// `target` is a stored project id, or a path to a JSON file holding either
/// a bare graph or a full analysis.
///
/// # Errors
///
/// Returns an error string if the graph cannot be loaded, the viewport is
/// invalid, or the output cannot be written.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    target: &str,
    options: &LayoutOptions,
) -> Result<(), String> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(options.width) || !valid(options.height) {
        return Err(format!("invalid viewport {}x{}", options.width, options.height));
    }

    let graph = load_graph(ctx, settings, target, options.use_static)?.canonicalize();
    let mut view = GraphView::mount(graph, options.width, options.height, options.view);
    let frames = view.settle(options.ticks);
    debug!(frames, view = %options.view, "layout computed");
    let scene = view.scene();
    view.unmount();

    match &options.svg {
        Some(path) => {
            ctx.fs
                .write(path, &svg::render(&scene))
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            println!("Wrote {} view of {} nodes to {}", options.view, scene.nodes.len(), path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&scene)
                .map_err(|e| format!("failed to serialize scene: {e}"))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn load_graph(
    ctx: &ServiceContext,
    settings: &Settings,
    target: &str,
    use_static: bool,
) -> Result<Graph, String> {
    let path = Path::new(target);
    let is_file = path.extension().is_some_and(|ext| ext == "json") || ctx.fs.exists(path);
    if !is_file {
        let analysis = GraphStore::new(ctx.fs.as_ref(), &settings.store_root)
            .load(target)
            .map_err(|e| e.to_string())?;
        return Ok(pick(analysis, use_static));
    }

    let contents = ctx
        .fs
        .read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    if let Ok(analysis) = serde_json::from_str::<Analysis>(&contents) {
        return Ok(pick(analysis, use_static));
    }
    if use_static {
        return Err(format!("{} is a bare graph; --static needs a stored analysis", path.display()));
    }
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()))?;
    if value.get("nodes").is_none() {
        return Err(format!("{} is neither a graph nor an analysis", path.display()));
    }
    // Same normalization as model output.
    Ok(validate_graph(&json!({ "dependencyGraph": value })))
}

fn pick(analysis: Analysis, use_static: bool) -> Graph {
    if use_static {
        analysis.static_graph
    } else {
        analysis.graph
    }
}
