//! Product listing page state with category filtering.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ng_store_core::{Category, Product};
use tracing::{debug, instrument};

use crate::cart::CartStore;
use crate::catalog::{CatalogError, CatalogService, ProductFilter};
use crate::ticket::{Commit, RequestTracker};

/// Listing state for the current filter.
#[derive(Debug, Clone, Default)]
pub enum ListingState {
    #[default]
    Idle,
    Loading {
        filter: ProductFilter,
    },
    Loaded {
        filter: ProductFilter,
        products: Vec<Arc<Product>>,
    },
    Failed {
        filter: ProductFilter,
        error: Arc<CatalogError>,
    },
}

/// Drives the product listing page.
#[derive(Clone)]
pub struct ProductListing {
    inner: Arc<ProductListingInner>,
}

struct ProductListingInner {
    catalog: CatalogService,
    cart: CartStore,
    model: Mutex<ListingModel>,
}

#[derive(Default)]
struct ListingModel {
    tracker: RequestTracker<ProductFilter>,
    categories: Option<Vec<Category>>,
    state: ListingState,
}

impl ProductListing {
    #[must_use]
    pub fn new(catalog: CatalogService, cart: CartStore) -> Self {
        Self {
            inner: Arc::new(ProductListingInner {
                catalog,
                cart,
                model: Mutex::new(ListingModel::default()),
            }),
        }
    }

    fn model(&self) -> MutexGuard<'_, ListingModel> {
        self.inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the category list for the filter menu.
    ///
    /// Only the first successful call reaches the catalog.
    ///
    /// # Errors
    ///
    /// Returns the catalog error; the list stays unloaded so a later call
    /// can try again.
    #[instrument(skip(self))]
    pub async fn load_categories(&self) -> Result<(), CatalogError> {
        if self.model().categories.is_some() {
            return Ok(());
        }

        let categories = self.inner.catalog.get_all_categories().await?;
        debug!(count = categories.len(), "Categories loaded");
        let mut model = self.model();
        if model.categories.is_none() {
            model.categories = Some(categories);
        }
        Ok(())
    }

    /// Show the products matching `filter`.
    #[instrument(skip(self))]
    pub async fn apply_filter(&self, filter: ProductFilter) -> Commit {
        let ticket = {
            let mut model = self.model();
            model.state = ListingState::Loading {
                filter: filter.clone(),
            };
            model.tracker.issue(filter.clone())
        };

        let result = self.inner.catalog.get_products(&filter).await;

        let mut model = self.model();
        if !model.tracker.is_current(&ticket) {
            debug!(filter = ?ticket.key(), "Discarding stale product list");
            return Commit::Stale;
        }

        model.state = match result {
            Ok(products) => ListingState::Loaded {
                filter,
                products: products.into_iter().map(Arc::new).collect(),
            },
            Err(error) => ListingState::Failed {
                filter,
                error: Arc::new(error),
            },
        };
        Commit::Applied
    }

    /// Add the listed product at `index` to the cart.
    ///
    /// Returns `false` when nothing is listed at `index`.
    pub fn add_to_cart(&self, index: usize) -> bool {
        let product = match &self.model().state {
            ListingState::Loaded { products, .. } => products.get(index).cloned(),
            _ => None,
        };
        let Some(product) = product else {
            return false;
        };
        self.inner.cart.add_to_cart(product);
        true
    }

    /// Current page state.
    #[must_use]
    pub fn state(&self) -> ListingState {
        self.model().state.clone()
    }

    /// Listed products, empty unless loaded.
    #[must_use]
    pub fn products(&self) -> Vec<Arc<Product>> {
        match &self.model().state {
            ListingState::Loaded { products, .. } => products.clone(),
            _ => Vec::new(),
        }
    }

    /// Loaded categories, empty until [`load_categories`](Self::load_categories) succeeds.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.model().categories.clone().unwrap_or_default()
    }

    /// The shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRequest;
    use crate::testing::{FakeGateway, fake_category, fake_product};
    use ng_store_core::Price;

    fn listing(gateway: &Arc<FakeGateway>) -> ProductListing {
        ProductListing::new(CatalogService::new(gateway.clone(), None), CartStore::new())
    }

    #[tokio::test]
    async fn test_load_categories_once() {
        let gateway = Arc::new(FakeGateway::new());
        let categories = vec![fake_category(), fake_category()];
        gateway.respond_json(&CatalogRequest::categories(), &categories);
        let page = listing(&gateway);

        page.load_categories().await.unwrap();
        page.load_categories().await.unwrap();

        assert_eq!(page.categories(), categories);
        assert_eq!(gateway.requests(), vec!["/api/v1/categories"]);
    }

    #[tokio::test]
    async fn test_load_categories_failure_can_retry() {
        let gateway = Arc::new(FakeGateway::new());
        let page = listing(&gateway);

        assert!(page.load_categories().await.is_err());
        assert!(page.categories().is_empty());

        gateway.respond_raw(&CatalogRequest::categories(), "[]");
        page.load_categories().await.unwrap();
        assert_eq!(gateway.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_filter_loads_products() {
        let gateway = Arc::new(FakeGateway::new());
        let filter = ProductFilter::by_category_slug("electronica");
        let products = vec![fake_product().build(), fake_product().build()];
        gateway.respond_json(&CatalogRequest::products(&filter), &products);
        let page = listing(&gateway);

        assert_eq!(page.apply_filter(filter).await, Commit::Applied);

        assert_eq!(page.products().len(), 2);
        assert_eq!(
            gateway.requests(),
            vec!["/api/v1/products?categorySlug=electronica"]
        );
    }

    #[tokio::test]
    async fn test_apply_filter_failure() {
        let gateway = Arc::new(FakeGateway::new());
        let page = listing(&gateway);

        page.apply_filter(ProductFilter::by_category_id("9")).await;

        let ListingState::Failed { error, .. } = page.state() else {
            panic!("expected failed state");
        };
        assert!(error.is_not_found());
        assert!(page.products().is_empty());
    }

    #[tokio::test]
    async fn test_stale_filter_is_discarded() {
        let gateway = Arc::new(FakeGateway::new());
        let shoes = ProductFilter::by_category_slug("shoes");
        let hats = ProductFilter::by_category_slug("hats");
        let held = gateway.hold(&CatalogRequest::products(&shoes));
        let hat = fake_product().slug("hat").build();
        gateway.respond_json(&CatalogRequest::products(&hats), &vec![hat]);
        let page = listing(&gateway);

        let (first, second) = tokio::join!(page.apply_filter(shoes), async {
            let commit = page.apply_filter(hats.clone()).await;
            held.resolve_json(&vec![fake_product().slug("shoe").build()]);
            commit
        });

        assert_eq!(first, Commit::Stale);
        assert_eq!(second, Commit::Applied);
        let ListingState::Loaded { filter, products } = page.state() else {
            panic!("expected loaded state");
        };
        assert_eq!(filter, hats);
        assert_eq!(products[0].slug, "hat");
    }

    #[tokio::test]
    async fn test_add_to_cart_by_index() {
        let gateway = Arc::new(FakeGateway::new());
        let products = vec![
            fake_product().price(Price::from_units(10)).build(),
            fake_product().price(Price::from_units(20)).build(),
        ];
        gateway.respond_json(&CatalogRequest::products(&ProductFilter::default()), &products);
        let page = listing(&gateway);

        assert!(!page.add_to_cart(0));

        page.apply_filter(ProductFilter::default()).await;
        assert!(page.add_to_cart(1));
        assert!(!page.add_to_cart(2));

        assert_eq!(page.cart().count(), 1);
        assert_eq!(page.cart().total(), Price::from_units(20));
    }
}
