//! HTTP transports for the catalog gateway.
//!
//! Both transports share request dispatch and error mapping, and differ
//! only in how a successful body is consumed.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{debug, instrument, warn};
use url::Url;

use super::gateway::CatalogGateway;
use super::request::CatalogRequest;
use super::{CatalogError, RemoteErrorBody};

/// Maximum number of body characters included in log records.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// StreamTransport
// =============================================================================

/// Transport that consumes the response body as a stream of chunks.
#[derive(Debug, Clone)]
pub struct StreamTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl StreamTransport {
    /// Create a transport reading from `base_url`.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl CatalogGateway for StreamTransport {
    #[instrument(skip(self), fields(transport = "stream", target = %request.path_and_query()))]
    async fn get(&self, request: &CatalogRequest) -> Result<Bytes, CatalogError> {
        let response = dispatch(&self.client, &self.base_url, request).await?;

        let mut body = BytesMut::new();
        let mut chunks = std::pin::pin!(response.bytes_stream());
        while let Some(chunk) = chunks.next().await {
            body.extend_from_slice(&chunk?);
        }

        debug!(bytes = body.len(), "Catalog response received");
        Ok(body.freeze())
    }
}

// =============================================================================
// FetchTransport
// =============================================================================

/// Transport that reads the response body with one buffered call.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl FetchTransport {
    /// Create a transport reading from `base_url`.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl CatalogGateway for FetchTransport {
    #[instrument(skip(self), fields(transport = "fetch", target = %request.path_and_query()))]
    async fn get(&self, request: &CatalogRequest) -> Result<Bytes, CatalogError> {
        let response = dispatch(&self.client, &self.base_url, request).await?;
        let body = response.bytes().await?;

        debug!(bytes = body.len(), "Catalog response received");
        Ok(body)
    }
}

// =============================================================================
// Shared dispatch
// =============================================================================

/// Send the request and turn non-success statuses into [`CatalogError::Remote`].
async fn dispatch(
    client: &reqwest::Client,
    base_url: &Url,
    request: &CatalogRequest,
) -> Result<reqwest::Response, CatalogError> {
    let url = request.url(base_url)?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(status = %status, error = %e, "Failed to read catalog error body");
            Bytes::new()
        }
    };
    let error = RemoteErrorBody::from_body(&body, status.canonical_reason().unwrap_or("Unknown"));

    tracing::error!(
        status = %status,
        body = %String::from_utf8_lossy(&body).chars().take(LOG_BODY_LIMIT).collect::<String>(),
        "Catalog API returned non-success status"
    );

    Err(CatalogError::Remote {
        status: status.as_u16(),
        error,
    })
}
