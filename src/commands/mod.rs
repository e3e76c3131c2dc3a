//! Command dispatch and handlers.

pub mod analyze;
pub mod layout;
pub mod scan;
pub mod show;

use std::env;
use std::path::PathBuf;

use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::logging;

/// Dispatch a parsed command to its handler.
///
/// When `REPOGRAPH_RECORD` is set to a file path, all port interactions are
/// recorded into one cassette at that path.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let settings = Settings::load();
    logging::init(&settings);

    let recording = env::var_os("REPOGRAPH_RECORD").map(PathBuf::from);
    let ctx = match &recording {
        Some(path) => ServiceContext::recording(path, &settings),
        None => ServiceContext::live(&settings),
    };

    let result = dispatch_with_context(command, &ctx, &settings);

    // Finish recording after command completes (even on error)
    if let Some(path) = ctx.finish_recording()? {
        eprintln!("Recording saved to: {}", path.display());
    }

    result
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Analyze { url, branch, project } => {
            let access_token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
            analyze::run(ctx, settings, url, branch, project.as_deref(), access_token)
        }
        Command::Scan { dir } => scan::run(ctx, settings, dir),
        Command::Layout { target, view, width, height, ticks, svg, use_static } => {
            let options = layout::LayoutOptions {
                view: *view,
                width: *width,
                height: *height,
                ticks: *ticks,
                svg: svg.clone(),
                use_static: *use_static,
            };
            layout::run(ctx, settings, target, &options)
        }
        Command::Show { project } => show::run(ctx, settings, project.as_deref()),
    }
}
