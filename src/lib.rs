//! Core library entry for the `repograph` CLI.
//!
//! Turns a source repository into a dependency graph (static extraction
//! plus model-assisted synthesis), stores it, and lays it out as a force,
//! tree or circular scene.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod materialize;
pub mod pipeline;
pub mod ports;
pub mod store;
pub mod synth;

#[cfg(test)]
pub(crate) mod testing;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
