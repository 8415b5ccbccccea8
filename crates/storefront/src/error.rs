//! Unified error handling.
//!
//! Front ends map every failure onto [`AppError`] and use
//! [`AppError::is_reportable`] to decide whether it goes to error tracking.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::meta::MetaSinkError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(Arc<CatalogError>),

    /// Page metadata could not be published.
    #[error("Metadata error: {0}")]
    Meta(#[from] MetaSinkError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(Arc::new(err))
    }
}

impl From<Arc<CatalogError>> for AppError {
    fn from(err: Arc<CatalogError>) -> Self {
        Self::Catalog(err)
    }
}

impl AppError {
    /// Whether the error points at a fault worth sending to error tracking.
    ///
    /// Client-side statuses from the catalog API and bad user input are not.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Catalog(err) => err.status().is_none_or(|status| status >= 500),
            Self::Meta(_) => true,
            Self::Config(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }
}
