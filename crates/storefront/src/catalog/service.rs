//! Catalog query service.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use ng_store_core::{Category, Product};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::cache::{CacheValue, Cached};
use super::gateway::CatalogGateway;
use super::request::{CatalogRequest, ProductFilter};
use super::CatalogError;

/// Maximum number of cached responses.
const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// CatalogService
// =============================================================================

/// Reads products and categories from the catalog API.
///
/// Every call is a single attempt: failures are returned to the caller
/// unchanged. When constructed with a TTL, categories, product lists and
/// single products are cached per request URL.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    gateway: Arc<dyn CatalogGateway>,
    cache: Option<Cache<String, CacheValue>>,
}

impl CatalogService {
    /// Create a service reading through `gateway`.
    ///
    /// Caching is enabled only when `cache_ttl` is `Some`.
    #[must_use]
    pub fn new(gateway: Arc<dyn CatalogGateway>, cache_ttl: Option<Duration>) -> Self {
        let cache = cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });

        Self {
            inner: Arc::new(CatalogServiceInner { gateway, cache }),
        }
    }

    /// Whether responses are cached.
    #[must_use]
    pub fn is_caching(&self) -> bool {
        self.inner.cache.is_some()
    }

    /// Issue a request and decode its JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: &CatalogRequest) -> Result<T, CatalogError> {
        let body = self.inner.gateway.get(request).await?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                target = %request.path_and_query(),
                body = %String::from_utf8_lossy(&body).chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Decode(e)
        })
    }

    /// [`fetch`](Self::fetch) through the response cache, when enabled.
    async fn fetch_cached<T>(&self, request: &CatalogRequest) -> Result<T, CatalogError>
    where
        T: DeserializeOwned + Cached + Clone,
    {
        let Some(cache) = &self.inner.cache else {
            return self.fetch(request).await;
        };

        let cache_key = request.path_and_query();
        if let Some(value) = cache.get(&cache_key).await.and_then(T::from_cache) {
            debug!(key = %cache_key, "Cache hit for catalog response");
            return Ok(value);
        }

        let value: T = self.fetch(request).await?;
        cache.insert(cache_key, value.clone().into_cache()).await;
        Ok(value)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn get_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        self.fetch_cached(&CatalogRequest::products(filter)).await
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Remote`] with status 404 if the id does not
    /// resolve, or another error if the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_one(&self, id: &str) -> Result<Product, CatalogError> {
        self.fetch_cached(&CatalogRequest::product(id)).await
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Remote`] with status 404 if the slug does not
    /// resolve, or another error if the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_one_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        self.fetch_cached(&CatalogRequest::product_by_slug(slug)).await
    }

    /// Get the products related to the product with `slug`.
    ///
    /// The slug is not validated: an empty slug still issues a request and
    /// the server decides the outcome. Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_related_products(&self, slug: &str) -> Result<Vec<Product>, CatalogError> {
        self.fetch(&CatalogRequest::related_products(slug)).await
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn get_all_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.fetch_cached(&CatalogRequest::categories()).await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached responses.
    pub async fn invalidate_all(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}
