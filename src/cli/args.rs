//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Validate a hostname-alias registry: key ordering, blocklist policy, and
/// target reachability.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cname-preflight",
    version = crate::version::get_build_info().to_string(),
    about
)]
pub struct Args {
    /// Path to the registry artifact
    #[arg(long, default_value = "cnames_active.js")]
    pub registry: PathBuf,

    /// Blocklist file, one expression per line; replaces the built-in list
    #[arg(long)]
    pub blocklist: Option<PathBuf>,

    /// Maximum number of concurrent reachability probes
    #[arg(long, default_value_t = 50)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout_secs: u64,

    /// Root domain the virtual-host header is derived from
    #[arg(long, default_value = "js.org")]
    pub root_domain: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppress status lines; warnings, errors, and the summary still print
    #[arg(long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable streaming output
    #[default]
    Text,
    /// Machine-readable JSON report, printed once at the end
    Json,
}
