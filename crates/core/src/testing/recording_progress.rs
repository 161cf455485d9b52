//! Progress sink that records everything it receives.

use std::sync::Mutex;

use crate::progress::ProgressSink;

/// One call received by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(String),
    Update(u8, String),
    Warning(String),
    Finished { summary: String, notify: bool },
}

/// Records progress calls for assertions.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Warning(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Final summaries with their notify flag.
    pub fn summaries(&self) -> Vec<(String, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Finished { summary, notify } => Some((summary, notify)),
                _ => None,
            })
            .collect()
    }

    pub fn last_update(&self) -> Option<(u8, String)> {
        self.events().into_iter().rev().find_map(|e| match e {
            ProgressEvent::Update(percent, message) => Some((percent, message)),
            _ => None,
        })
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressSink for RecordingProgress {
    fn started(&self, heading: &str) {
        self.push(ProgressEvent::Started(heading.to_string()));
    }

    fn update(&self, percent: u8, message: &str) {
        self.push(ProgressEvent::Update(percent, message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(ProgressEvent::Warning(message.to_string()));
    }

    fn finished(&self, summary: &str, notify: bool) {
        self.push(ProgressEvent::Finished {
            summary: summary.to_string(),
            notify,
        });
    }
}
