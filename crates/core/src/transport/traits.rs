//! Transport trait and its request/response types.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use super::error::TransportError;

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Overrides the transport's default timeout.
    pub timeout: Option<Duration>,
    /// Read the body to completion but do not keep it.
    pub discard_body: bool,
}

impl GetOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn discarding_body(mut self) -> Self {
        self.discard_body = true;
        self
    }
}

/// A successful response.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self {
            content_type: content_type.map(str::to_string),
            content_length: Some(body.len() as u64),
            body,
        }
    }
}

/// HTTP-like GET against remote providers.
#[async_trait]
pub trait ArtworkTransport: Send + Sync {
    /// Returns the name of this transport implementation.
    fn name(&self) -> &str;

    /// Fetches `url`.
    ///
    /// `Ok(None)` means the server had nothing at that address (404).
    async fn get(&self, url: &str, options: &GetOptions) -> Result<Option<FetchResponse>, TransportError>;
}
