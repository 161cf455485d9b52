//! Mock artwork transport for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::host_of;
use crate::transport::{ArtworkTransport, FetchResponse, GetOptions, TransportError};

type MockResult = Result<Option<FetchResponse>, TransportError>;

/// Mock implementation of the ArtworkTransport trait.
///
/// Responses are configured per URL or per host; anything unconfigured
/// answers like a 404. Every request is recorded in order.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Arc<RwLock<HashMap<String, MockResult>>>,
    host_errors: Arc<RwLock<HashMap<String, TransportError>>>,
    requests: Arc<RwLock<Vec<String>>>,
    /// Every request waits this long before answering.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an image at `url`.
    pub async fn set_image(&self, url: &str, content_type: &str, body: &[u8]) {
        self.responses.write().await.insert(
            url.to_string(),
            Ok(Some(FetchResponse::new(Some(content_type), body.to_vec()))),
        );
    }

    /// Set a raw response for `url`.
    pub async fn set_response(&self, url: &str, response: MockResult) {
        self.responses.write().await.insert(url.to_string(), response);
    }

    /// Fail `url` with `error`.
    pub async fn set_error(&self, url: &str, error: TransportError) {
        self.set_response(url, Err(error)).await;
    }

    /// Fail every URL on `host` that has no explicit response.
    pub async fn set_host_error(&self, host: &str, error: TransportError) {
        self.host_errors.write().await.insert(host.to_string(), error);
    }

    /// Make every request take `delay`, like a slow provider.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Get all requested URLs.
    pub async fn recorded_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of requests made to `host`.
    pub async fn request_count_for_host(&self, host: &str) -> usize {
        self.requests
            .read()
            .await
            .iter()
            .filter(|url| host_of(url) == host)
            .count()
    }
}

#[async_trait]
impl ArtworkTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get(&self, url: &str, options: &GetOptions) -> MockResult {
        self.requests.write().await.push(url.to_string());
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(response) = self.responses.read().await.get(url) {
            return match response {
                Ok(Some(r)) if options.discard_body => Ok(Some(FetchResponse {
                    body: Default::default(),
                    ..r.clone()
                })),
                other => other.clone(),
            };
        }
        if let Some(error) = self.host_errors.read().await.get(&host_of(url)) {
            return Err(error.clone());
        }
        Ok(None)
    }
}
