//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::layout::ViewType;

/// Top-level CLI parser for `repograph`.
#[derive(Debug, Parser)]
#[command(name = "repograph", version, about = "Map and lay out source dependency graphs")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clone a repository, analyze it, and store the result.
    Analyze {
        /// Repository URL.
        url: String,
        /// Branch to analyze.
        #[arg(long, default_value = "main")]
        branch: String,
        /// Store key (defaults to the repository name).
        #[arg(long)]
        project: Option<String>,
    },
    /// Extract the static dependency graph of a local directory as JSON.
    Scan {
        /// Directory to scan.
        dir: PathBuf,
    },
    /// Lay out a stored project or a graph JSON file.
    Layout {
        /// Project id, or path to a `.json` file holding a graph or analysis.
        target: String,
        /// Layout mode.
        #[arg(long, value_enum, default_value_t = ViewType::Force)]
        view: ViewType,
        /// Viewport width in pixels.
        #[arg(long, default_value_t = 960.0)]
        width: f64,
        /// Viewport height in pixels.
        #[arg(long, default_value_t = 600.0)]
        height: f64,
        /// Maximum simulation frames to run (force view only).
        #[arg(long)]
        ticks: Option<usize>,
        /// Write an SVG snapshot here instead of printing JSON.
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Use the statically extracted graph of a stored analysis.
        #[arg(long = "static")]
        use_static: bool,
    },
    /// List stored projects, or summarize one.
    Show {
        /// Project id.
        project: Option<String>,
    },
}
