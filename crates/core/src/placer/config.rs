//! Configuration for the placer module.

use serde::{Deserialize, Serialize};

/// Configuration for the file system placer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacerConfig {
    /// Write to a temporary file next to the target and rename it into place.
    #[serde(default = "default_true")]
    pub atomic_writes: bool,

    /// Permissions for created directories (Unix only, octal).
    #[serde(default = "default_dir_mode")]
    pub directory_mode: u32,
}

fn default_true() -> bool {
    true
}

fn default_dir_mode() -> u32 {
    0o755
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            atomic_writes: true,
            directory_mode: default_dir_mode(),
        }
    }
}

impl PlacerConfig {
    /// Disables temp-file writes.
    pub fn with_direct_writes(mut self) -> Self {
        self.atomic_writes = false;
        self
    }

    /// Sets the mode for created directories.
    pub fn with_directory_mode(mut self, mode: u32) -> Self {
        self.directory_mode = mode;
        self
    }
}
