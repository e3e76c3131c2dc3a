//! `repograph scan` command.

use std::path::Path;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::extract::{self, EXCLUDED_DIRS};

/// Execute the `scan` command.
///
/// Walks `dir`, extracts its static dependency graph and prints the graph
/// as pretty JSON on stdout. Skipped files are reported on stderr.
///
/// # Errors
///
/// Returns an error string if the directory cannot be walked or the graph
/// cannot be serialized.
pub fn run(ctx: &ServiceContext, settings: &Settings, dir: &Path) -> Result<(), String> {
    let files = ctx
        .fs
        .walk_files(dir, &EXCLUDED_DIRS)
        .map_err(|e| format!("failed to list {}: {e}", dir.display()))?;
    let extraction = extract::extract(ctx.fs.as_ref(), dir, &files, settings.max_file_bytes);

    for skipped in &extraction.skipped {
        eprintln!("skipped {}: {}", skipped.path, skipped.reason);
    }
    let json = serde_json::to_string_pretty(&extraction.graph)
        .map_err(|e| format!("failed to serialize graph: {e}"))?;
    println!("{json}");
    Ok(())
}
