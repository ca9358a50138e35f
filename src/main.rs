//! cname-preflight CLI entry point.
//!
//! One-shot batch validator: runs validation over the registry in the
//! working directory, streams findings to the terminal, and exits 0 only
//! when the run produced no errors.

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cname_preflight::cli::args::Args;
use cname_preflight::cli::output::Renderer;
use cname_preflight::{run_validation, PreflightConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match PreflightConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let renderer = Renderer::from_args(&args);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let render_task = tokio::spawn(async move { renderer.render(events_rx).await });

    let summary = run_validation(config, events_tx).await;

    // Let the renderer drain the channel before deciding the exit code.
    let _ = render_task.await;

    if summary.errors > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
