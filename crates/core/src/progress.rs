//! Run progress reporting.
//!
//! The orchestrator drives a [`ProgressTracker`], which does the counting and
//! forwards what the configured display mode allows to a [`ProgressSink`].

use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::config::ProgressDisplay;

/// Message-less updates after which the last message is cleared.
pub const MESSAGE_CLEAR_AFTER: u32 = 200;

/// Receiver of progress updates (a dialog, a log, a status endpoint).
pub trait ProgressSink: Send + Sync {
    /// A run started.
    fn started(&self, heading: &str);

    fn update(&self, percent: u8, message: &str);

    /// A per-item problem the user should see.
    fn warning(&self, message: &str);

    /// The run's final summary. `notify` asks for a notification instead of a progress update.
    fn finished(&self, summary: &str, notify: bool);
}

/// Counts processed items for one run.
pub struct ProgressTracker {
    sink: Arc<dyn ProgressSink>,
    display: ProgressDisplay,
    final_notification: bool,
    total: usize,
    count: usize,
    quiet_updates: u32,
    message: String,
}

impl ProgressTracker {
    pub fn new(sink: Arc<dyn ProgressSink>, display: ProgressDisplay, final_notification: bool) -> Self {
        Self {
            sink,
            display,
            final_notification,
            total: 0,
            count: 0,
            quiet_updates: 0,
            message: String::new(),
        }
    }

    pub fn start(&mut self, heading: &str, total: usize) {
        self.total = total;
        self.count = 0;
        self.quiet_updates = 0;
        self.message.clear();
        if self.display == ProgressDisplay::Full {
            self.sink.started(heading);
        }
    }

    /// One more item done, optionally with a new message.
    pub fn advance(&mut self, message: Option<&str>) {
        self.count += 1;
        self.send(message);
    }

    /// `n` items skipped without processing.
    pub fn skip(&mut self, n: usize) {
        self.count += n;
        self.send(None);
    }

    pub fn warn(&self, message: &str) {
        if self.display != ProgressDisplay::None {
            self.sink.warning(message);
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.count * 100 / self.total).min(100) as u8
    }

    /// Sends the final summary when anything was updated or `always` is set.
    ///
    /// Returns true when the summary went out as a progress update that should
    /// stay on screen for a moment before the run ends.
    pub fn finish(&mut self, updated: usize, always: bool) -> bool {
        if updated == 0 && !always {
            return false;
        }
        let summary = final_summary(updated);
        if self.final_notification {
            self.sink.finished(&summary, true);
            return false;
        }
        if self.display == ProgressDisplay::Full {
            self.count = self.total;
            self.sink.finished(&summary, false);
            return true;
        }
        false
    }

    fn send(&mut self, message: Option<&str>) {
        match message {
            Some(message) => {
                self.quiet_updates = 0;
                self.message = message.to_string();
            }
            None => {
                self.quiet_updates += 1;
                if self.quiet_updates > MESSAGE_CLEAR_AFTER {
                    self.message.clear();
                }
            }
        }
        if self.display == ProgressDisplay::Full {
            self.sink.update(self.percent(), &self.message);
        }
    }
}

/// "N artwork updated" or "No artwork updated".
pub fn final_summary(updated: usize) -> String {
    if updated > 0 {
        format!("{} artwork updated", updated)
    } else {
        "No artwork updated".to_string()
    }
}

/// Last known progress, as served by the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub heading: String,
    pub percent: u8,
    pub message: String,
    pub warnings: u32,
    pub summary: Option<String>,
}

/// Sink that logs through `tracing` and keeps the latest snapshot.
#[derive(Debug, Default)]
pub struct TracingProgress {
    snapshot: RwLock<ProgressSnapshot>,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot.read().map(|s| s.clone()).unwrap_or_default()
    }

    fn modify(&self, f: impl FnOnce(&mut ProgressSnapshot)) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            f(&mut snapshot);
        }
    }
}

impl ProgressSink for TracingProgress {
    fn started(&self, heading: &str) {
        info!(heading = %heading, "Run started");
        self.modify(|s| {
            *s = ProgressSnapshot {
                heading: heading.to_string(),
                ..Default::default()
            }
        });
    }

    fn update(&self, percent: u8, message: &str) {
        self.modify(|s| {
            s.percent = percent;
            s.message = message.to_string();
        });
    }

    fn warning(&self, message: &str) {
        warn!(message = %message, "Item warning");
        self.modify(|s| s.warnings += 1);
    }

    fn finished(&self, summary: &str, notify: bool) {
        info!(summary = %summary, notify, "Run finished");
        self.modify(|s| {
            s.percent = 100;
            s.summary = Some(summary.to_string());
        });
    }
}
