use super::{types::Config, ConfigError, ExclusionKind};

/// Upper bound for extra fanart slots.
pub const MAX_MULTIPLE_FANART: u32 = 20;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Library URL is set
/// - Regex exclusions compile
/// - Multiple fanart count is at most 20
/// - At least one cache-priming worker
/// - Service poll interval is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.library.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "library.url cannot be empty".to_string(),
        ));
    }

    for (index, exclusion) in config.exclusions.iter().enumerate() {
        if exclusion.value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "exclusions[{}].value cannot be empty",
                index
            )));
        }
        if exclusion.kind == ExclusionKind::Regex {
            regex_lite::Regex::new(&exclusion.value).map_err(|e| {
                ConfigError::ValidationError(format!("exclusions[{}] is not a valid regex: {}", index, e))
            })?;
        }
    }

    if config.processing.max_multiple_fanart > MAX_MULTIPLE_FANART {
        return Err(ConfigError::ValidationError(format!(
            "processing.max_multiple_fanart cannot exceed {}",
            MAX_MULTIPLE_FANART
        )));
    }

    if config.processing.cache_workers == 0 {
        return Err(ConfigError::ValidationError(
            "processing.cache_workers must be at least 1".to_string(),
        ));
    }

    if config.service.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "service.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExclusionConfig, ServerConfig};

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_bad_regex_fails() {
        let mut config = Config::default();
        config.exclusions.push(ExclusionConfig {
            kind: ExclusionKind::Regex,
            value: "(unclosed".to_string(),
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("exclusions[0]"));
    }

    #[test]
    fn test_validate_fanart_limit() {
        let mut config = Config::default();
        config.processing.max_multiple_fanart = 21;
        assert!(validate_config(&config).is_err());
        config.processing.max_multiple_fanart = 20;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = Config::default();
        config.processing.cache_workers = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_poll_interval_fails() {
        let mut config = Config::default();
        config.service.poll_interval_ms = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("service.poll_interval_ms"));
    }
}
