//! Service loop configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the background service loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Run the background loop. When disabled, items can still be processed
    /// one at a time through the API.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often the loop looks for a pending signal (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Extra wait before a recently-added run starts, so bursts of
    /// additions land in one run (milliseconds).
    #[serde(default = "default_recent_settle")]
    pub recent_settle_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    5000 // 5 seconds
}

fn default_recent_settle() -> u64 {
    5000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval(),
            recent_settle_ms: default_recent_settle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert!(config.enabled);
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.recent_settle_ms, 5000);
    }

    #[test]
    fn test_service_config_partial() {
        let config: ServiceConfig = toml::from_str("poll_interval_ms = 250").unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert!(config.enabled);
    }
}
