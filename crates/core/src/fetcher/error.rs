//! Fetch engine errors.

use serde::Serialize;
use thiserror::Error;

use crate::placer::PlacerError;

/// Errors that stop a `download_for` call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Writing an artwork file failed. Remaining art types for the entry are skipped.
    #[error("Could not write artwork file {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: PlacerError,
    },
}

/// A provider problem recorded for an entry. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    /// Host of the failing provider.
    pub provider: String,
    pub message: String,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Provider error ({}): {}", self.provider, self.message)
    }
}
