//! Run outcome aggregation and the presentation event stream.
//!
//! [`ValidationOutcome`] is the single aggregate a run mutates: ordered
//! error and warning lists plus a fatal latch. Every append is mirrored to
//! an event channel so a renderer can show progress live without sharing
//! mutable state with the run. Once the fatal latch is set, appends from
//! probe tasks still in flight are dropped; the first fatal write wins.
//!
//! Message order is append order. When probes run concurrently that is not
//! registry order; each message names its record, which is what matters.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Presentation feed: one entry per status change or appended message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Transient progress line ("Parsing...", "Pinging 'alpha'...")
    Status(String),
    /// Non-fatal finding, run continues
    Warning(String),
    /// Fatal finding
    Error(String),
    /// Terminal event with the final tally
    Done(Summary),
}

/// Final tally of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub success: bool,
}

/// Aggregate outcome of one validation run.
#[derive(Debug)]
pub struct ValidationOutcome {
    errors: Vec<String>,
    warnings: Vec<String>,
    fatal: bool,
    events: UnboundedSender<Event>,
}

impl ValidationOutcome {
    pub fn new(events: UnboundedSender<Event>) -> Self {
        ValidationOutcome {
            errors: Vec::new(),
            warnings: Vec::new(),
            fatal: false,
            events,
        }
    }

    /// Emit a progress status. Does not touch the tally.
    pub fn set_status(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(status = %message);
        let _ = self.events.send(Event::Status(message));
    }

    /// Append an error. Dropped when the fatal latch is already set.
    pub fn push_error(&mut self, message: impl Into<String>) {
        if self.fatal {
            return;
        }
        let message = message.into();
        self.errors.push(message.clone());
        let _ = self.events.send(Event::Error(message));
    }

    /// Append a warning. Dropped when the fatal latch is already set.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        if self.fatal {
            return;
        }
        let message = message.into();
        self.warnings.push(message.clone());
        let _ = self.events.send(Event::Warning(message));
    }

    /// Append an error and latch the run fatal in one step.
    pub fn fatal_error(&mut self, message: impl Into<String>) {
        self.push_error(message);
        self.fatal = true;
    }

    /// Latch the run fatal without appending (used after a batch of
    /// ordering errors has been pushed).
    pub fn mark_fatal(&mut self) {
        self.fatal = true;
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn summary(&self) -> Summary {
        Summary {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            success: self.errors.is_empty(),
        }
    }

    /// Close out the run: emit the terminal status and `Done` event.
    pub fn finish(&self) -> Summary {
        let summary = self.summary();
        self.set_status("Done.");
        let _ = self.events.send(Event::Done(summary));
        summary
    }
}
