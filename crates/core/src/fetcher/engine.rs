//! Per-run fetch engine.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::breaker::{FaultCounter, HostBreakers, PROVIDER_ERROR_LIMIT};
use super::error::{FetchError, ProviderFailure};
use super::extension::{file_extension, guess_extension, host_of};
use crate::config::{DownloadConfig, ExistingFilePolicy};
use crate::media::{is_fetchable, MediaEntry};
use crate::metrics;
use crate::paths::dirname;
use crate::placer::{DirListing, Placer};
use crate::resolver::{ListingCache, Lookup, PathResolver};
use crate::transport::{ArtworkTransport, FetchResponse, GetOptions, TransportError};

/// Result of one `download_for` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// At least one provider returned an image body.
    pub contacted_provider: bool,
    /// Last provider problem seen for the entry.
    pub error: Option<ProviderFailure>,
    /// The run was cancelled before every art type was tried.
    pub cancelled: bool,
}

/// Downloads artwork for one entry at a time.
///
/// Built fresh for every run; its host breakers, fault counter and directory
/// listings live exactly as long as the run.
pub struct FetchEngine {
    transport: Arc<dyn ArtworkTransport>,
    placer: Arc<dyn Placer>,
    resolver: PathResolver,
    download: DownloadConfig,
    policy: ExistingFilePolicy,
    breakers: HostBreakers,
    faults: FaultCounter,
    listings: ListingCache,
    bytes_downloaded: u64,
}

impl FetchEngine {
    pub fn new(
        transport: Arc<dyn ArtworkTransport>,
        placer: Arc<dyn Placer>,
        resolver: PathResolver,
        download: DownloadConfig,
        policy: ExistingFilePolicy,
    ) -> Self {
        Self {
            transport,
            placer,
            resolver,
            download,
            policy,
            breakers: HostBreakers::default(),
            faults: FaultCounter::default(),
            listings: ListingCache::new(),
            bytes_downloaded: 0,
        }
    }

    pub fn breakers(&self) -> &HostBreakers {
        &self.breakers
    }

    pub fn faults(&self) -> &FaultCounter {
        &self.faults
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Art on the entry that points at a fetchable URL and is enabled for download.
    pub fn downloadable_art(&self, entry: &MediaEntry) -> Vec<(String, String)> {
        entry
            .art
            .iter()
            .filter(|(art_type, url)| {
                is_fetchable(url) && self.download.allows(entry.media_type(), art_type)
            })
            .map(|(art_type, url)| (art_type.clone(), url.clone()))
            .collect()
    }

    /// Downloads missing artwork for `entry`, recording new paths in `entry.updated_art`.
    ///
    /// Stops at the next art type once `cancel` fires; a provider read in
    /// flight is dropped and nothing more is fetched or written.
    pub async fn download_for(
        &mut self,
        entry: &mut MediaEntry,
        cancel: &CancellationToken,
    ) -> Result<DownloadOutcome, FetchError> {
        let mut outcome = DownloadOutcome::default();
        if self.faults.limit_reached() {
            debug!(label = %entry.label, "File write fault limit reached, not downloading");
            return Ok(outcome);
        }
        let shared: &MediaEntry = entry;
        if !self.resolve(|r, l| r.can_save(shared, l)).await {
            debug!(label = %entry.label, "No location to save artwork");
            return Ok(outcome);
        }
        let to_download = self.downloadable_art(entry);
        if to_download.is_empty() {
            return Ok(outcome);
        }

        for (art_type, url) in to_download {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            let host = host_of(&url);
            if self.breakers.is_open(&host) {
                debug!(host = %host, art_type = %art_type, "Provider disabled for this run");
                continue;
            }
            let shared: &MediaEntry = entry;
            let Some(base_path) = self.resolve(|r, l| r.resolve_base_path(shared, &art_type, l)).await else {
                continue;
            };
            if !self.placer.supports(&base_path) {
                debug!(path = %base_path, placer = self.placer.name(), "Location not writable by placer");
                continue;
            }

            if self.policy != ExistingFilePolicy::Overwrite {
                let existing = format!("{}.{}", base_path, guess_extension(&url));
                if self.placer.exists(&existing).await {
                    if self.policy == ExistingFilePolicy::UseExisting {
                        info!(path = %existing, art_type = %art_type, "Using existing file");
                        entry.updated_art.insert(art_type, existing);
                    } else {
                        info!(path = %existing, "Not overwriting existing file");
                    }
                    continue;
                }
            }

            let Some(result) = self.fetch(&url, cancel).await else {
                debug!(url = %url, "Fetch cancelled");
                outcome.cancelled = true;
                break;
            };
            let response = match result {
                Ok(Some(response)) => {
                    self.breakers.record_success(&host);
                    response
                }
                Ok(None) => {
                    self.breakers.record_success(&host);
                    continue;
                }
                Err(e) if e.is_forbidden() => {
                    debug!(url = %url, "Provider refused this image");
                    continue;
                }
                Err(e) => {
                    let count = self.breakers.record_failure(&host);
                    metrics::PROVIDER_ERRORS.with_label_values(&[host.as_str()]).inc();
                    if count == PROVIDER_ERROR_LIMIT {
                        warn!(host = %host, "Provider disabled for the rest of the run");
                        metrics::BREAKER_TRIPS.with_label_values(&[host.as_str()]).inc();
                    }
                    let message = if e.connection_error {
                        "Could not contact provider".to_string()
                    } else {
                        format!("Provider returned an error: {}\n{}", e.message, url)
                    };
                    warn!(host = %host, art_type = %art_type, error = %e, "Artwork fetch failed");
                    outcome.error = Some(ProviderFailure {
                        provider: host,
                        message,
                    });
                    continue;
                }
            };
            if response.body.is_empty() {
                continue;
            }

            outcome.contacted_provider = true;
            self.bytes_downloaded += response.content_length.unwrap_or(response.body.len() as u64);
            let Some(extension) = file_extension(response.content_type.as_deref(), &url) else {
                info!(url = %url, art_type = %art_type, "Can't determine extension");
                continue;
            };

            let path = format!("{}.{}", base_path, extension);
            self.write(&path, &response).await?;
            debug!(url = %url, path = %path, "Downloaded artwork");
            metrics::ARTWORK_WRITTEN
                .with_label_values(&[entry.media_type().as_str()])
                .inc();
            entry.updated_art.insert(art_type, path);
        }
        Ok(outcome)
    }

    /// GET with one retry over https for insecure URLs that came back empty or unreachable.
    ///
    /// `None` when `cancel` fired before the provider answered.
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Option<Result<Option<FetchResponse>, TransportError>> {
        let options = GetOptions::default();
        let result = self.get(url, &options, cancel).await?;
        let retry = match &result {
            Ok(None) => true,
            Err(e) => e.connection_error,
            Ok(Some(_)) => false,
        };
        let insecure = url
            .get(..7)
            .filter(|scheme| scheme.eq_ignore_ascii_case("http://"))
            .map(|_| &url[7..]);
        match insecure {
            Some(rest) if retry => {
                let secure = format!("https://{}", rest);
                debug!(url = %secure, "Retrying over https");
                self.get(&secure, &options, cancel).await
            }
            _ => Some(result),
        }
    }

    async fn get(
        &self,
        url: &str,
        options: &GetOptions,
        cancel: &CancellationToken,
    ) -> Option<Result<Option<FetchResponse>, TransportError>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.transport.get(url, options) => Some(result),
        }
    }

    async fn write(&mut self, path: &str, response: &FetchResponse) -> Result<(), FetchError> {
        let folder = dirname(path);
        let result = if !folder.is_empty() && !self.placer.exists(folder).await {
            self.placer.create_dir_all(folder).await
        } else {
            Ok(())
        };
        let result = match result {
            Ok(()) => self.placer.write_file(path, &response.body).await.map(|_| ()),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.faults.reset();
                Ok(())
            }
            Err(source) => {
                let count = self.faults.record_failure();
                metrics::FILE_WRITE_FAILURES.inc();
                warn!(path = %path, failures = count, "Artwork write failed");
                Err(FetchError::FileWrite {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    /// Runs a resolver step, listing directories it asks for until it can answer.
    async fn resolve<T>(&mut self, step: impl Fn(&PathResolver, &ListingCache) -> Lookup<T>) -> T {
        loop {
            match step(&self.resolver, &self.listings) {
                Lookup::Ready(value) => return value,
                Lookup::NeedsListing(path) => {
                    let listing = match self.placer.list_dir(&path).await {
                        Ok(listing) => listing,
                        Err(e) => {
                            warn!(path = %path, error = %e, "Could not list directory");
                            DirListing::default()
                        }
                    };
                    self.listings.insert(path, listing);
                }
            }
        }
    }
}
