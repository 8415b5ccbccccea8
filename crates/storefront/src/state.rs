//! Application state shared by the page controllers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::{CatalogError, CatalogGateway, CatalogService, build_gateway};
use crate::config::StoreConfig;
use crate::meta::{MetaTagSink, MetaTagsService};
use crate::pages::{ProductDetail, ProductListing};

/// Application state shared across all pages.
///
/// This struct is cheaply cloneable via `Arc`. It is the composition root:
/// the catalog, the cart and the metadata service are built once here and
/// injected into every page.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    catalog: CatalogService,
    cart: CartStore,
    meta: MetaTagsService,
}

impl AppState {
    /// Create a new application state with the configured transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StoreConfig, sink: Arc<dyn MetaTagSink>) -> Result<Self, CatalogError> {
        let gateway = build_gateway(&config)?;
        Ok(Self::with_gateway(config, gateway, sink))
    }

    /// Create a new application state over an existing gateway.
    #[must_use]
    pub fn with_gateway(
        config: StoreConfig,
        gateway: Arc<dyn CatalogGateway>,
        sink: Arc<dyn MetaTagSink>,
    ) -> Self {
        let catalog = CatalogService::new(gateway, config.cache_ttl);
        let meta = MetaTagsService::new(sink, config.domain.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart: CartStore::new(),
                meta,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get a reference to the shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the metadata service.
    #[must_use]
    pub fn meta(&self) -> &MetaTagsService {
        &self.inner.meta
    }

    /// A product detail page wired to the shared services.
    #[must_use]
    pub fn product_detail(&self) -> ProductDetail {
        ProductDetail::new(
            self.inner.catalog.clone(),
            self.inner.cart.clone(),
            self.inner.meta.clone(),
        )
    }

    /// A product listing page wired to the shared services.
    #[must_use]
    pub fn product_listing(&self) -> ProductListing {
        ProductListing::new(self.inner.catalog.clone(), self.inner.cart.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRequest;
    use crate::testing::{FakeGateway, RecordingSink, fake_product};
    use url::Url;

    #[tokio::test]
    async fn test_pages_share_one_cart() {
        let gateway = Arc::new(FakeGateway::new());
        let product = fake_product().slug("p").build();
        gateway.respond_json(&CatalogRequest::product_by_slug("p"), &product);
        let config = StoreConfig::new(
            Url::parse("http://localhost:3000").unwrap(),
            "https://ng-store.example",
        );
        let state = AppState::with_gateway(config, gateway, Arc::new(RecordingSink::new()));

        let detail = state.product_detail();
        detail.navigate("p").await;
        detail.add_to_cart();

        assert_eq!(state.cart().count(), 1);
        assert_eq!(state.product_listing().cart().total(), product.price);
        assert_eq!(state.meta().domain(), "https://ng-store.example");
        assert!(!state.catalog().is_caching());
    }
}
