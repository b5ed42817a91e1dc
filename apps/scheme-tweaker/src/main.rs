//! Scheme Tweaker - apply color filters to editor color schemes.
//!
//! Features:
//! - One-shot filtering of a scheme file
//! - Persistent tweak sessions with undo/redo
//! - Step adjustments driven by settings
//! - Output in the current or legacy scheme format

mod cli;
mod state;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let settings = cli::load_settings(cli.config.as_deref())?;
    init_tracing(cli.verbose || settings.debug);
    cli::run(cli, &settings)
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();
}
