//! cname-preflight library
//!
//! Batch validator for hostname-alias registries. A registry maps subdomain
//! keys to target URLs; each run validates the registry against three rule
//! classes:
//!
//! - key ordering (keys must be lexicographically sorted)
//! - blocklist policy (keys must not match any reserved-name expression)
//! - target reachability (each target host must answer over HTTP, or
//!   redirect to HTTPS on the same host and answer there)
//!
//! Ordering and blocklist violations are fatal; reachability failures are
//! warnings. The run produces a stream of [`engine::outcome::Event`]s for a
//! presentation layer and ends with a [`engine::outcome::Summary`].
//!
//! # Example
//!
//! ```no_run
//! use cname_preflight::{run_validation, PreflightConfig};
//!
//! # async fn demo() {
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let summary = run_validation(PreflightConfig::default(), tx).await;
//! assert_eq!(summary.success, summary.errors == 0);
//! # }
//! ```

pub mod checks;
pub mod cli;
pub mod engine;
pub mod registry;
pub mod version;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use cli::args::Args;
use engine::orchestrator::Validator;
use engine::outcome::{Event, Summary};

// Re-exports for public API
pub use engine::orchestrator::Validator as Orchestrator;
pub use engine::outcome::{Event as ValidationEvent, Summary as ValidationSummary};

/// One registry entry: a subdomain key mapped to a target URL or hostname.
///
/// Constructed once by the registry parser and immutable afterwards. The key
/// may be empty, which stands for the registry's root domain itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub target: String,
}

impl Record {
    pub fn new(key: impl Into<String>, target: impl Into<String>) -> Self {
        Record {
            key: key.into(),
            target: target.into(),
        }
    }
}

/// Error types for cname-preflight operations.
#[derive(Debug, Error)]
pub enum PreflightError {
    /// The registry artifact does not exist
    #[error("The file '{path}' does not exist.")]
    MissingArtifact { path: String },

    /// The registry artifact exists but could not be parsed
    #[error("An error occured while parsing '{path}': {message}")]
    ParseError { path: String, message: String },

    /// A blocklist file was given but could not be read
    #[error("Could not read blocklist '{path}': {message}")]
    BlocklistUnreadable { path: String, message: String },

    /// The HTTP client could not be constructed
    #[error("Could not build HTTP client: {message}")]
    ClientError { message: String },
}

/// Configuration for one validation run.
#[derive(Debug, Clone)]
pub struct PreflightConfig {
    /// Path to the registry artifact
    pub registry_path: PathBuf,
    /// Blocklist expressions (see [`checks::blocklist`])
    pub blocklist: Vec<String>,
    /// Root domain the virtual-host header is derived from
    pub root_domain: String,
    /// Maximum number of concurrent reachability probes
    pub concurrency: usize,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        PreflightConfig {
            registry_path: PathBuf::from("cnames_active.js"),
            blocklist: checks::blocklist::default_blocklist(),
            root_domain: "js.org".to_string(),
            concurrency: 50,
            timeout: Duration::from_secs(20),
        }
    }
}

impl PreflightConfig {
    /// Create configuration from command line arguments.
    ///
    /// Reading the optional blocklist file happens here so the orchestrator
    /// itself never touches the filesystem beyond the registry.
    pub fn from_args(args: &Args) -> Result<Self, PreflightError> {
        let blocklist = match &args.blocklist {
            Some(path) => checks::blocklist::load_blocklist(path)?,
            None => checks::blocklist::default_blocklist(),
        };

        Ok(PreflightConfig {
            registry_path: args.registry.clone(),
            blocklist,
            root_domain: args.root_domain.clone(),
            concurrency: args.concurrency.max(1),
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
        })
    }
}

/// Run a full validation pass.
///
/// This is the main entry point. Events are forwarded to `events` as the run
/// progresses; the returned [`Summary`] reflects the final tally. Exit-code
/// mapping from the summary is the caller's concern.
pub async fn run_validation(config: PreflightConfig, events: UnboundedSender<Event>) -> Summary {
    Validator::new(config, events).run().await
}
