//! Artwork fetching.
//!
//! A [`FetchEngine`] is built for each run. It downloads the missing artwork
//! of one entry at a time, keeping two run-scoped counters:
//!
//! - [`HostBreakers`]: consecutive provider errors per host. A host that
//!   reaches [`PROVIDER_ERROR_LIMIT`] is skipped for the rest of the run.
//! - [`FaultCounter`]: consecutive local write failures. Once it reaches
//!   [`FILE_ERROR_LIMIT`] the engine stops downloading altogether.

mod breaker;
mod engine;
mod error;
mod extension;

pub use breaker::{FaultCounter, HostBreakers, FILE_ERROR_LIMIT, PROVIDER_ERROR_LIMIT};
pub use engine::{DownloadOutcome, FetchEngine};
pub use error::{FetchError, ProviderFailure};
pub use extension::{file_extension, guess_extension, host_of, DEFAULT_EXTENSION};
