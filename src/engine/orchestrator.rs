//! Validation run orchestrator.
//!
//! Drives the four run phases in order: load the registry, verify key
//! ordering, then the combined blocklist-and-probe pass, then the final
//! tally. Loading and ordering failures end the run before any network
//! traffic. The probe pass fans out over a bounded pool; each record's task
//! runs the blocklist check first, so a blocklisted key latches the run
//! fatal before its probe result could matter, and the driver loop stops
//! draining the pool as soon as the latch is set, dropping in-flight probes.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::{stream, StreamExt};
use tokio::sync::mpsc::UnboundedSender;

use crate::checks::reachability::{self, ProbeConfig, ProbeOutcome};
use crate::checks::{blocklist, ordering};
use crate::engine::outcome::{Event, Summary, ValidationOutcome};
use crate::{registry, PreflightConfig, Record};

/// One-shot validation run.
pub struct Validator {
    config: PreflightConfig,
    outcome: Arc<Mutex<ValidationOutcome>>,
}

impl Validator {
    pub fn new(config: PreflightConfig, events: UnboundedSender<Event>) -> Self {
        Validator {
            config,
            outcome: Arc::new(Mutex::new(ValidationOutcome::new(events))),
        }
    }

    /// Run all phases to completion and return the final tally.
    pub async fn run(&self) -> Summary {
        self.lock().set_status("Parsing registry...");

        let records = match registry::load(&self.config.registry_path) {
            Ok(records) => records,
            Err(e) => {
                let mut outcome = self.lock();
                outcome.fatal_error(e.to_string());
                return outcome.finish();
            }
        };

        tracing::info!(records = records.len(), "registry loaded");

        self.lock().set_status("Checking key order...");
        if !self.check_order(&records) {
            return self.lock().finish();
        }

        self.lock().set_status("Checking records...");
        self.check_records(&records).await;

        self.lock().finish()
    }

    /// Ordering phase. Returns false when the run must stop.
    ///
    /// All violations from the pass are reported together, then the run is
    /// latched fatal: a mis-sorted registry is a correctness failure, not a
    /// style warning, and probing an unsorted registry would waste traffic.
    fn check_order(&self, records: &[Record]) -> bool {
        let keys: Vec<String> = records.iter().map(|r| r.key.clone()).collect();
        let violations = ordering::violations(&keys);

        if violations.is_empty() {
            return true;
        }

        let mut outcome = self.lock();
        for violation in &violations {
            outcome.push_error(violation.to_string());
        }
        outcome.mark_fatal();
        false
    }

    /// Blocklist-and-probe phase over a bounded concurrent pool.
    async fn check_records(&self, records: &[Record]) {
        let probe_config = ProbeConfig {
            root_domain: self.config.root_domain.clone(),
            timeout: self.config.timeout,
            ..ProbeConfig::default()
        };

        let client = match reachability::build_client(&probe_config) {
            Ok(client) => client,
            Err(e) => {
                self.lock().fatal_error(e.to_string());
                return;
            }
        };

        let client = &client;
        let probe_config = &probe_config;
        let expressions = self.config.blocklist.as_slice();

        let mut checks = stream::iter(records.iter())
            .map(|record| {
                let outcome = Arc::clone(&self.outcome);
                async move {
                    Self::check_record(record, expressions, client, probe_config, outcome).await;
                }
            })
            .buffer_unordered(self.config.concurrency);

        while checks.next().await.is_some() {
            if self.lock().is_fatal() {
                break;
            }
        }
    }

    /// One record: blocklist first (fatal), then target validity (fatal),
    /// then the network probe (warnings only).
    async fn check_record(
        record: &Record,
        expressions: &[String],
        client: &reqwest::Client,
        probe_config: &ProbeConfig,
        outcome: Arc<Mutex<ValidationOutcome>>,
    ) {
        {
            let mut guard = lock(&outcome);
            if guard.is_fatal() {
                return;
            }

            if blocklist::first_match(&record.key, expressions).is_some() {
                guard.fatal_error(format!("CNAME is blocklisted: '{}'", record.key));
                return;
            }

            guard.set_status(format!("Pinging '{}'...", record.key));
        }

        match reachability::probe(client, record, probe_config).await {
            ProbeOutcome::Ok => {}
            ProbeOutcome::Warn(message) => lock(&outcome).push_warning(message),
            ProbeOutcome::InvalidTarget(message) => lock(&outcome).fatal_error(message),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ValidationOutcome> {
        lock(&self.outcome)
    }
}

/// Lock the outcome, recovering the data even if a task panicked while
/// holding the guard.
fn lock(outcome: &Mutex<ValidationOutcome>) -> MutexGuard<'_, ValidationOutcome> {
    outcome.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
