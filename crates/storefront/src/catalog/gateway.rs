//! Network gateway abstraction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::StoreConfig;

use super::CatalogError;
use super::request::CatalogRequest;
use super::transport::{FetchTransport, StreamTransport};

/// Performs parameterized reads against the catalog API.
///
/// Implementations return the raw body of a successful response and map
/// every failure onto [`CatalogError`]: connection problems to
/// [`CatalogError::Network`], non-success statuses to
/// [`CatalogError::Remote`]. Decoding is left to the caller.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Issue a `GET` for `request` and return the response body.
    async fn get(&self, request: &CatalogRequest) -> Result<Bytes, CatalogError>;
}

/// Which transport backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Body consumed as a stream of chunks.
    #[default]
    Stream,
    /// Body read with a single buffered call.
    Fetch,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stream => "stream",
            Self::Fetch => "fetch",
        })
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" => Ok(Self::Stream),
            "fetch" => Ok(Self::Fetch),
            other => Err(format!("unknown transport '{other}' (expected stream or fetch)")),
        }
    }
}

/// Build the gateway selected by `config.transport`.
///
/// # Errors
///
/// Returns [`CatalogError::Network`] if the HTTP client cannot be created.
pub fn build_gateway(config: &StoreConfig) -> Result<Arc<dyn CatalogGateway>, CatalogError> {
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    tracing::debug!(transport = %config.transport, api_url = %config.api_url, "Building catalog gateway");

    Ok(match config.transport {
        TransportKind::Stream => Arc::new(StreamTransport::new(client, config.api_url.clone())),
        TransportKind::Fetch => Arc::new(FetchTransport::new(client, config.api_url.clone())),
    })
}
