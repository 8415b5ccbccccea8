//! Catalog API client.
//!
//! # Architecture
//!
//! - [`CatalogGateway`] performs parameterized reads and returns raw bodies
//! - Two interchangeable transports implement it: [`StreamTransport`] reads
//!   the body as a chunk stream, [`FetchTransport`] reads it in one call
//! - [`CatalogService`] builds requests, decodes payloads and optionally
//!   caches responses via `moka`
//! - The remote API is the source of truth: failures are surfaced to the
//!   caller unchanged, with no retry
//!
//! # Endpoints
//!
//! - `GET /api/v1/categories`
//! - `GET /api/v1/products[?categoryId=][&categorySlug=]`
//! - `GET /api/v1/products/{id}`
//! - `GET /api/v1/products/slug/{slug}`
//! - `GET /api/v1/products/slug/{slug}/related`
//!
//! # Example
//!
//! ```rust,ignore
//! use ng_store_storefront::catalog::{CatalogService, ProductFilter, build_gateway};
//!
//! let catalog = CatalogService::new(build_gateway(&config)?, None);
//!
//! let product = catalog.get_one_by_slug("my-product").await?;
//! let shoes = catalog
//!     .get_products(&ProductFilter::by_category_slug("shoes"))
//!     .await?;
//! ```

mod cache;
mod gateway;
mod request;
mod service;
mod transport;

pub use gateway::{CatalogGateway, TransportKind, build_gateway};
pub use request::{API_PREFIX, CatalogRequest, ProductFilter};
pub use service::CatalogService;
pub use transport::{FetchTransport, StreamTransport};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading from the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure; no status code is available.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Catalog API returned {status}: {}", .error.message)]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Body returned by the server.
        error: RemoteErrorBody,
    },

    /// The payload did not match the expected shape.
    #[error("Malformed catalog payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request URL could not be built from the base URL.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    /// HTTP status of a [`CatalogError::Remote`] failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided error body of a [`CatalogError::Remote`] failure.
    #[must_use]
    pub const fn remote_error(&self) -> Option<&RemoteErrorBody> {
        match self {
            Self::Remote { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether the server reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// Error body returned by the catalog API.
///
/// The API normally answers `{ "message": "..." }`. Bodies that are not
/// JSON are kept verbatim as the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorBody {
    /// Human-readable message.
    pub message: String,
    /// The full JSON body, when the server sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RemoteErrorBody {
    /// Build an error body from raw response bytes.
    ///
    /// `reason` is used when the body carries no message at all.
    #[must_use]
    pub fn from_body(body: &[u8], reason: &str) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Null) => Self::from_reason(reason),
            Ok(value) => {
                let message = match value.get("message") {
                    Some(serde_json::Value::String(message)) => message.clone(),
                    Some(serde_json::Value::Null) => reason.to_string(),
                    Some(other) => other.to_string(),
                    None => match &value {
                        serde_json::Value::String(message) => message.clone(),
                        _ => reason.to_string(),
                    },
                };
                Self {
                    message,
                    details: Some(value),
                }
            }
            Err(_) => {
                let text = String::from_utf8_lossy(body);
                let text = text.trim();
                if text.is_empty() {
                    Self::from_reason(reason)
                } else {
                    Self {
                        message: text.to_string(),
                        details: None,
                    }
                }
            }
        }
    }

    fn from_reason(reason: &str) -> Self {
        Self {
            message: reason.to_string(),
            details: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = CatalogError::Remote {
            status: 404,
            error: RemoteErrorBody::from_body(br#"{"message":"Producto no encontrado"}"#, "Not Found"),
        };
        assert_eq!(
            err.to_string(),
            "Catalog API returned 404: Producto no encontrado"
        );
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_body_plain_text() {
        let body = RemoteErrorBody::from_body(b"No se encontraron productos", "Not Found");
        assert_eq!(body.message, "No se encontraron productos");
        assert_eq!(body.details, None);
    }

    #[test]
    fn test_error_body_empty_falls_back_to_reason() {
        let body = RemoteErrorBody::from_body(b"", "Internal Server Error");
        assert_eq!(body.message, "Internal Server Error");

        let body = RemoteErrorBody::from_body(b"null", "Internal Server Error");
        assert_eq!(body.message, "Internal Server Error");
    }

    #[test]
    fn test_error_body_null_message_falls_back_to_reason() {
        let body = RemoteErrorBody::from_body(
            br#"{"message":null,"statusCode":500}"#,
            "Internal Server Error",
        );
        assert_eq!(body.message, "Internal Server Error");
        assert!(body.details.is_some());
    }

    #[test]
    fn test_error_body_non_string_message() {
        let body = RemoteErrorBody::from_body(
            br#"{"message":["price must be positive"],"statusCode":400}"#,
            "Bad Request",
        );
        assert_eq!(body.message, r#"["price must be positive"]"#);
        assert!(body.details.is_some());
    }

    #[test]
    fn test_decode_error_has_no_status() {
        let parse_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = CatalogError::from(parse_err);
        assert_eq!(err.status(), None);
        assert!(err.remote_error().is_none());
    }
}
