//! `reqwest` backed transport.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::error::TransportError;
use super::traits::{ArtworkTransport, FetchResponse, GetOptions};
use crate::config::TransportConfig;

/// Transport over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn map_send_error(e: reqwest::Error) -> TransportError {
        if e.is_connect() || e.is_timeout() {
            TransportError::connection(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::status(status.as_u16(), e.to_string())
        } else {
            TransportError::other(e.to_string())
        }
    }
}

#[async_trait]
impl ArtworkTransport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn get(&self, url: &str, options: &GetOptions) -> Result<Option<FetchResponse>, TransportError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(url = %url, "Provider has nothing at this address");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TransportError::status(
                status.as_u16(),
                format!("HTTP {}", status),
            ));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase());
        let content_length = response.content_length();

        let body = if options.discard_body {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                chunk.map_err(Self::map_send_error)?;
            }
            Bytes::new()
        } else {
            response.bytes().await.map_err(Self::map_send_error)?
        };

        Ok(Some(FetchResponse {
            content_type,
            content_length,
            body,
        }))
    }
}
