//! Path exclusion rules.

use regex_lite::Regex;
use tracing::debug;

use crate::config::{ConfigError, ExclusionConfig, ExclusionKind};
use crate::paths::normalize;

/// A compiled exclusion rule.
#[derive(Debug, Clone)]
pub enum ExclusionRule {
    /// Path lies under this folder, compared after lexical normalization.
    Folder(String),
    Prefix(String),
    /// Anchored at the start of the path.
    Regex(Regex),
}

impl ExclusionRule {
    pub fn from_config(config: &ExclusionConfig) -> Result<Self, ConfigError> {
        Ok(match config.kind {
            ExclusionKind::Folder => ExclusionRule::Folder(normalize(&config.value)),
            ExclusionKind::Prefix => ExclusionRule::Prefix(config.value.clone()),
            ExclusionKind::Regex => {
                let regex = Regex::new(&format!("^(?:{})", config.value))
                    .map_err(|e| ConfigError::ValidationError(format!("bad exclusion regex: {}", e)))?;
                ExclusionRule::Regex(regex)
            }
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            ExclusionRule::Folder(folder) => {
                let path = normalize(path);
                match path.strip_prefix(folder.as_str()) {
                    Some(rest) => rest.is_empty() || rest.starts_with(['/', '\\']) || folder.ends_with(['/', '\\']),
                    None => false,
                }
            }
            ExclusionRule::Prefix(prefix) => path.starts_with(prefix.as_str()),
            ExclusionRule::Regex(regex) => regex.is_match(path),
        }
    }
}

/// Ordered set of exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    rules: Vec<ExclusionRule>,
}

impl Exclusions {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    pub fn from_config(configs: &[ExclusionConfig]) -> Result<Self, ConfigError> {
        let rules = configs
            .iter()
            .map(ExclusionRule::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Whether an item with this source path is excluded. Items without a path never are.
    pub fn is_excluded(&self, path: Option<&str>) -> bool {
        let Some(path) = path else {
            return false;
        };
        let excluded = self.rules.iter().any(|rule| rule.matches(path));
        if excluded {
            debug!(path = %path, "Path excluded by configuration");
        }
        excluded
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(specs: &[(ExclusionKind, &str)]) -> Exclusions {
        let configs: Vec<ExclusionConfig> = specs
            .iter()
            .map(|(kind, value)| ExclusionConfig {
                kind: *kind,
                value: value.to_string(),
            })
            .collect();
        Exclusions::from_config(&configs).unwrap()
    }

    #[test]
    fn test_folder_rule() {
        let exclusions = rules(&[(ExclusionKind::Folder, "/media/private/")]);
        assert!(exclusions.is_excluded(Some("/media/private/film.mkv")));
        assert!(exclusions.is_excluded(Some("/media/./private/sub/../film.mkv")));
        assert!(exclusions.is_excluded(Some("/media/private")));
        assert!(!exclusions.is_excluded(Some("/media/privateer/film.mkv")));
        assert!(!exclusions.is_excluded(Some("/media/public/film.mkv")));
    }

    #[test]
    fn test_prefix_rule() {
        let exclusions = rules(&[(ExclusionKind::Prefix, "smb://nas/kids")]);
        assert!(exclusions.is_excluded(Some("smb://nas/kids/show/e1.mkv")));
        assert!(exclusions.is_excluded(Some("smb://nas/kidsmovies/a.mkv")));
        assert!(!exclusions.is_excluded(Some("smb://nas/adults/a.mkv")));
    }

    #[test]
    fn test_regex_rule_is_anchored() {
        let exclusions = rules(&[(ExclusionKind::Regex, r".*/Extras/")]);
        assert!(exclusions.is_excluded(Some("/tv/Show/Extras/clip.mkv")));
        assert!(!exclusions.is_excluded(Some("/tv/Show/S01E01.mkv")));

        let anchored = rules(&[(ExclusionKind::Regex, r"Extras")]);
        assert!(!anchored.is_excluded(Some("/tv/Extras/clip.mkv")));
    }

    #[test]
    fn test_null_path_never_excluded() {
        let exclusions = rules(&[(ExclusionKind::Regex, ".*"), (ExclusionKind::Prefix, "")]);
        assert!(!exclusions.is_excluded(None));
        assert!(exclusions.is_excluded(Some("/anything")));
    }

    #[test]
    fn test_bad_regex_rejected() {
        let config = ExclusionConfig {
            kind: ExclusionKind::Regex,
            value: "([".to_string(),
        };
        assert!(ExclusionRule::from_config(&config).is_err());
    }
}
