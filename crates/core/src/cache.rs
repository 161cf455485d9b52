//! Local image cache reconciliation.
//!
//! After artwork is assigned, the host's image cache is primed with the local
//! files so the library does not have to load them on first display. Priming
//! is a plain GET against the host's `/image/` endpoint.

use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::library::{LibraryService, Texture};
use crate::media::{quote_image, unquote_image};
use crate::metrics;
use crate::transport::{ArtworkTransport, GetOptions};

/// Runs with more entries than this load the whole cache index once instead
/// of looking up each URL.
pub const BIG_RUN_THRESHOLD: usize = 100;

/// What the host can put in its cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCapabilities {
    /// The host extracts thumbnails from `image://video@` references.
    pub video_thumbnails: bool,
}

/// Primes the host image cache, remembering what is already there for one run.
pub struct CacheReconciler {
    library: Arc<dyn LibraryService>,
    transport: Arc<dyn ArtworkTransport>,
    capabilities: CacheCapabilities,
    workers: usize,
    timeout: Duration,
    big_run: bool,
    cache_base: Option<Option<String>>,
    full_index: Option<HashSet<String>>,
    warmed: HashSet<String>,
}

impl CacheReconciler {
    pub fn new(
        library: Arc<dyn LibraryService>,
        transport: Arc<dyn ArtworkTransport>,
        capabilities: CacheCapabilities,
        workers: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            library,
            transport,
            capabilities,
            workers: workers.max(1),
            timeout,
            big_run: false,
            cache_base: None,
            full_index: None,
            warmed: HashSet::new(),
        }
    }

    /// Use the full cache index instead of per-URL lookups.
    pub fn set_big_run(&mut self, big_run: bool) {
        self.big_run = big_run;
    }

    /// Whether a value can be primed into the cache.
    pub fn is_cacheable(&self, url: &str) -> bool {
        if url.is_empty() || url.starts_with("http") {
            return false;
        }
        if url.starts_with("image://video@") {
            return self.capabilities.video_thumbnails;
        }
        !url.starts_with("image")
    }

    /// Primes every cacheable URL not already cached. Returns how many were newly primed.
    pub async fn warm<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) -> usize {
        let candidates: BTreeSet<String> = urls
            .into_iter()
            .filter(|url| self.is_cacheable(url) && !self.warmed.contains(*url))
            .map(str::to_string)
            .collect();
        if candidates.is_empty() {
            return 0;
        }
        let Some(base) = self.cache_base().await else {
            return 0;
        };

        let looked_up = if self.big_run {
            self.load_full_index().await;
            None
        } else {
            Some(self.lookup_cached(&candidates).await)
        };
        let cached = looked_up.as_ref().or(self.full_index.as_ref());
        let mut to_prime = Vec::new();
        for path in candidates {
            if cached.is_some_and(|cached| cached.contains(&path)) {
                self.warmed.insert(path);
            } else {
                to_prime.push(path);
            }
        }
        if to_prime.is_empty() {
            return 0;
        }

        let options = GetOptions::default()
            .with_timeout(self.timeout)
            .discarding_body();
        let transport = self.transport.clone();
        let primed: Vec<String> = stream::iter(to_prime)
            .map(|path| {
                let transport = transport.clone();
                let options = options.clone();
                let url = format!("{}{}", base, urlencoding::encode(&quote_image(&path)));
                async move {
                    match transport.get(&url, &options).await {
                        Ok(Some(_)) => Some(path),
                        Ok(None) => None,
                        Err(e) => {
                            debug!(url = %url, error = %e, "Cache priming failed");
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.workers)
            .filter_map(|path| async move { path })
            .collect()
            .await;

        let count = primed.len();
        self.warmed.extend(primed);
        metrics::CACHE_WARMED.inc_by(count as u64);
        count
    }

    async fn cache_base(&mut self) -> Option<String> {
        if self.cache_base.is_none() {
            let base = match self.library.image_cache_base().await {
                Ok(base) => base,
                Err(e) => {
                    debug!(error = %e, "Image cache endpoint unavailable");
                    None
                }
            };
            self.cache_base = Some(base);
        }
        self.cache_base.clone().flatten()
    }

    async fn load_full_index(&mut self) {
        if self.full_index.is_some() {
            return;
        }
        let index = match self.library.textures(None).await {
            Ok(textures) => local_urls(textures),
            Err(e) => {
                debug!(error = %e, "Could not load texture index");
                HashSet::new()
            }
        };
        self.full_index = Some(index);
    }

    async fn lookup_cached(&self, candidates: &BTreeSet<String>) -> HashSet<String> {
        let mut cached = HashSet::new();
        for url in candidates {
            match self.library.textures(Some(url)).await {
                Ok(textures) => cached.extend(textures.into_iter().map(|t| unquote_image(&t.url))),
                Err(e) => debug!(url = %url, error = %e, "Texture lookup failed"),
            }
        }
        cached
    }
}

fn local_urls(textures: Vec<Texture>) -> HashSet<String> {
    textures
        .into_iter()
        .map(|t| unquote_image(&t.url))
        .filter(|url| !url.starts_with("http") && !url.starts_with("image"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockLibrary, MockTransport};

    const BASE: &str = "http://localhost:8080/image/";

    fn cache_url(path: &str) -> String {
        format!("{}{}", BASE, urlencoding::encode(&quote_image(path)))
    }

    fn reconciler(library: &Arc<MockLibrary>, transport: &Arc<MockTransport>, thumbs: bool) -> CacheReconciler {
        CacheReconciler::new(
            library.clone(),
            transport.clone(),
            CacheCapabilities {
                video_thumbnails: thumbs,
            },
            2,
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_cache_url_encoding() {
        assert_eq!(
            cache_url("/movies/A (1)/poster.jpg"),
            "http://localhost:8080/image/image%3A%2F%2F%252fmovies%252fA%2520%281%29%252fposter.jpg%2F"
        );
    }

    #[tokio::test]
    async fn test_warm_twice_primes_once() {
        let library = Arc::new(MockLibrary::new());
        let transport = Arc::new(MockTransport::new());
        for path in ["/m/a/poster.jpg", "/m/a/fanart.jpg"] {
            transport.set_image(&cache_url(path), "image/jpeg", b"x").await;
        }
        let mut reconciler = reconciler(&library, &transport, false);

        let urls = ["/m/a/poster.jpg", "/m/a/fanart.jpg", "/m/a/poster.jpg"];
        assert_eq!(reconciler.warm(urls).await, 2);
        assert_eq!(reconciler.warm(urls).await, 0);
        assert_eq!(transport.recorded_requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_skips_remote_and_already_cached() {
        let library = Arc::new(MockLibrary::new());
        library.add_texture(1, "/m/a/poster.jpg").await;
        let transport = Arc::new(MockTransport::new());
        transport.set_image(&cache_url("/m/a/fanart.jpg"), "image/jpeg", b"x").await;
        let mut reconciler = reconciler(&library, &transport, false);

        let count = reconciler
            .warm([
                "https://img.example/p.jpg",
                "image://music@%2fsong.mp3/",
                "/m/a/poster.jpg",
                "/m/a/fanart.jpg",
            ])
            .await;
        assert_eq!(count, 1);
        assert_eq!(transport.recorded_requests().await, vec![cache_url("/m/a/fanart.jpg")]);
        assert_eq!(library.call_count("textures").await, 2);
    }

    #[tokio::test]
    async fn test_video_thumbnails_need_capability() {
        let library = Arc::new(MockLibrary::new());
        let transport = Arc::new(MockTransport::new());
        let thumb = "image://video@%2fm%2fa.mkv/";
        transport.set_image(&cache_url(thumb), "image/jpeg", b"x").await;

        let mut without = reconciler(&library, &transport, false);
        assert_eq!(without.warm([thumb]).await, 0);

        let mut with = reconciler(&library, &transport, true);
        assert_eq!(with.warm([thumb]).await, 1);
    }

    #[tokio::test]
    async fn test_big_run_loads_index_once() {
        let library = Arc::new(MockLibrary::new());
        library.add_texture(1, "/m/a/poster.jpg").await;
        library.add_texture(2, "https://img.example/remote.jpg").await;
        let transport = Arc::new(MockTransport::new());
        transport.set_image(&cache_url("/m/b/poster.jpg"), "image/jpeg", b"x").await;
        let mut reconciler = reconciler(&library, &transport, false);
        reconciler.set_big_run(true);

        assert_eq!(reconciler.warm(["/m/a/poster.jpg"]).await, 0);
        assert_eq!(reconciler.warm(["/m/b/poster.jpg"]).await, 1);
        assert_eq!(library.call_count("textures").await, 1);
    }

    #[tokio::test]
    async fn test_big_run_index_consulted_on_every_warm() {
        let library = Arc::new(MockLibrary::new());
        library.add_texture(1, "/m/a/poster.jpg").await;
        library.add_texture(2, "/m/b/poster.jpg").await;
        let transport = Arc::new(MockTransport::new());
        transport.set_image(&cache_url("/m/c/poster.jpg"), "image/jpeg", b"x").await;
        let mut reconciler = reconciler(&library, &transport, false);
        reconciler.set_big_run(true);

        assert_eq!(reconciler.warm(["/m/a/poster.jpg"]).await, 0);
        assert_eq!(reconciler.warm(["/m/c/poster.jpg"]).await, 1);
        assert_eq!(reconciler.warm(["/m/b/poster.jpg"]).await, 0);
        assert_eq!(transport.recorded_requests().await, vec![cache_url("/m/c/poster.jpg")]);
        assert_eq!(library.call_count("textures").await, 1);
    }

    #[tokio::test]
    async fn test_no_cache_endpoint() {
        let library = Arc::new(MockLibrary::new());
        library.set_image_cache_base(None).await;
        let transport = Arc::new(MockTransport::new());
        let mut reconciler = reconciler(&library, &transport, false);

        assert_eq!(reconciler.warm(["/m/a/poster.jpg"]).await, 0);
        assert!(transport.recorded_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_priming_not_counted() {
        let library = Arc::new(MockLibrary::new());
        let transport = Arc::new(MockTransport::new());
        transport
            .set_error(
                &cache_url("/m/a/poster.jpg"),
                crate::transport::TransportError::connection("timed out"),
            )
            .await;
        let mut reconciler = reconciler(&library, &transport, false);

        assert_eq!(reconciler.warm(["/m/a/poster.jpg"]).await, 0);
    }
}
