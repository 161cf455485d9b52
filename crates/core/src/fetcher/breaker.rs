//! Run-scoped failure counters.
//!
//! Both counters belong to one fetch engine and start at zero with each run.

use std::collections::HashMap;

/// Consecutive provider errors before a host is skipped for the rest of the run.
pub const PROVIDER_ERROR_LIMIT: u32 = 3;

/// Consecutive file write failures before the engine stops downloading.
pub const FILE_ERROR_LIMIT: u32 = 3;

/// Per-host circuit breakers.
#[derive(Debug, Clone)]
pub struct HostBreakers {
    limit: u32,
    errors: HashMap<String, u32>,
}

impl Default for HostBreakers {
    fn default() -> Self {
        Self::new(PROVIDER_ERROR_LIMIT)
    }
}

impl HostBreakers {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            errors: HashMap::new(),
        }
    }

    /// Whether the host has reached the error limit.
    pub fn is_open(&self, host: &str) -> bool {
        self.error_count(host) >= self.limit
    }

    pub fn error_count(&self, host: &str) -> u32 {
        self.errors.get(host).copied().unwrap_or(0)
    }

    /// Counts a failure and returns the host's new error count.
    pub fn record_failure(&mut self, host: &str) -> u32 {
        let count = self.errors.entry(host.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn record_success(&mut self, host: &str) {
        if let Some(count) = self.errors.get_mut(host) {
            *count = 0;
        }
    }

    /// Hosts currently skipped.
    pub fn open_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .errors
            .iter()
            .filter(|(_, count)| **count >= self.limit)
            .map(|(host, _)| host.clone())
            .collect();
        hosts.sort();
        hosts
    }
}

/// Consecutive local write failures across the whole run.
#[derive(Debug, Clone)]
pub struct FaultCounter {
    limit: u32,
    count: u32,
}

impl Default for FaultCounter {
    fn default() -> Self {
        Self::new(FILE_ERROR_LIMIT)
    }
}

impl FaultCounter {
    pub fn new(limit: u32) -> Self {
        Self { limit, count: 0 }
    }

    pub fn record_failure(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit_reached(&self) -> bool {
        self.count >= self.limit
    }
}
