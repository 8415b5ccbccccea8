//! Product detail page state.
//!
//! ```text
//! Idle ─navigate─▶ Loading(slug) ─┬─▶ Loaded(product)
//!                                 └─▶ Failed(error)
//!
//! Loaded: Deferred ─reveal_related─▶ Pending ─┬─▶ Ready(related)
//!                                             └─▶ Failed(error)
//! ```
//!
//! Every `navigate` supersedes the previous one. Responses are committed
//! only while their request is still the latest; late ones are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ng_store_core::Product;
use tracing::{debug, instrument, warn};

use crate::cart::CartStore;
use crate::catalog::{CatalogError, CatalogService};
use crate::meta::{MetaTagsService, PageMetadata};
use crate::ticket::{Commit, RequestTracker, Ticket};

/// Main product state.
#[derive(Debug, Clone, Default)]
pub enum DetailState {
    /// No slug received yet.
    #[default]
    Idle,
    /// Waiting for the product.
    Loading { slug: String },
    /// Product resolved.
    Loaded(LoadedProduct),
    /// Product lookup failed. Only a new `navigate` leaves this state.
    Failed {
        slug: String,
        error: Arc<CatalogError>,
    },
}

/// A resolved product with its view state.
#[derive(Debug, Clone)]
pub struct LoadedProduct {
    /// The product as returned by the catalog.
    pub product: Arc<Product>,
    /// Displayed cover image; starts as the first image.
    pub cover: Option<String>,
    /// Related products block.
    pub related: RelatedState,
}

/// Related products state, independent of the main product state.
#[derive(Debug, Clone, Default)]
pub enum RelatedState {
    /// Not requested until the block becomes eligible to render.
    #[default]
    Deferred,
    Pending,
    Ready(Vec<Product>),
    Failed(Arc<CatalogError>),
}

/// Drives the product detail page.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ProductDetail {
    inner: Arc<ProductDetailInner>,
}

struct ProductDetailInner {
    catalog: CatalogService,
    cart: CartStore,
    meta: MetaTagsService,
    model: Mutex<DetailModel>,
}

#[derive(Default)]
struct DetailModel {
    tracker: RequestTracker<String>,
    /// Ticket of the request that produced the loaded product.
    loaded: Option<Ticket<String>>,
    state: DetailState,
}

impl ProductDetail {
    #[must_use]
    pub fn new(catalog: CatalogService, cart: CartStore, meta: MetaTagsService) -> Self {
        Self {
            inner: Arc::new(ProductDetailInner {
                catalog,
                cart,
                meta,
                model: Mutex::new(DetailModel::default()),
            }),
        }
    }

    fn model(&self) -> MutexGuard<'_, DetailModel> {
        self.inner
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the product for `slug`, discarding any previous product.
    ///
    /// Returns [`Commit::Stale`] when a later `navigate` superseded this
    /// one before its response arrived.
    #[instrument(skip(self))]
    pub async fn navigate(&self, slug: &str) -> Commit {
        let ticket = {
            let mut model = self.model();
            model.loaded = None;
            model.state = DetailState::Loading {
                slug: slug.to_string(),
            };
            model.tracker.issue(slug.to_string())
        };

        let result = self.inner.catalog.get_one_by_slug(slug).await;

        let mut model = self.model();
        if !model.tracker.is_current(&ticket) {
            debug!(
                slug = %ticket.key(),
                current = ?model.tracker.current(),
                "Discarding stale product response"
            );
            return Commit::Stale;
        }

        match result {
            Ok(product) => {
                let metadata = PageMetadata::for_product(&product, self.inner.meta.domain());
                model.state = DetailState::Loaded(LoadedProduct {
                    cover: product.first_image().map(str::to_string),
                    product: Arc::new(product),
                    related: RelatedState::Deferred,
                });
                model.loaded = Some(ticket);

                // Published under the lock so a newer navigate cannot interleave.
                if let Err(e) = self.inner.meta.update_meta_tags(&metadata) {
                    warn!(error = %e, "Failed to publish product metadata");
                }
            }
            Err(error) => {
                debug!(error = %error, "Product lookup failed");
                model.state = DetailState::Failed {
                    slug: slug.to_string(),
                    error: Arc::new(error),
                };
            }
        }
        Commit::Applied
    }

    /// Signal that the related products block may render.
    ///
    /// Fetches related products once per loaded product. Does nothing
    /// before a product is loaded or after the first call.
    #[instrument(skip(self))]
    pub async fn reveal_related(&self) -> Commit {
        let ticket = {
            let mut model = self.model();
            let Some(ticket) = model.loaded.clone() else {
                return Commit::Skipped;
            };
            match &mut model.state {
                DetailState::Loaded(loaded) if matches!(loaded.related, RelatedState::Deferred) => {
                    loaded.related = RelatedState::Pending;
                }
                _ => return Commit::Skipped,
            }
            ticket
        };

        let result = self.inner.catalog.get_related_products(ticket.key()).await;

        let mut model = self.model();
        if !model.tracker.is_current(&ticket) {
            debug!(slug = %ticket.key(), "Discarding stale related products response");
            return Commit::Stale;
        }
        let DetailState::Loaded(loaded) = &mut model.state else {
            return Commit::Stale;
        };

        loaded.related = match result {
            Ok(related) => RelatedState::Ready(related),
            Err(error) => {
                debug!(error = %error, "Related products lookup failed");
                RelatedState::Failed(Arc::new(error))
            }
        };
        Commit::Applied
    }

    /// Show the image at `index` as the cover.
    ///
    /// Returns `false` and leaves the cover unchanged when no product is
    /// loaded or `index` is out of range.
    pub fn select_image(&self, index: usize) -> bool {
        let mut model = self.model();
        let DetailState::Loaded(loaded) = &mut model.state else {
            return false;
        };
        let Some(image) = loaded.product.image(index) else {
            return false;
        };
        loaded.cover = Some(image.to_string());
        true
    }

    /// Add the loaded product to the cart. Returns `false` if none is loaded.
    pub fn add_to_cart(&self) -> bool {
        let Some(product) = self.product() else {
            return false;
        };
        self.inner.cart.add_to_cart(product);
        true
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Current page state.
    #[must_use]
    pub fn state(&self) -> DetailState {
        self.model().state.clone()
    }

    /// The loaded product, if any.
    #[must_use]
    pub fn product(&self) -> Option<Arc<Product>> {
        match &self.model().state {
            DetailState::Loaded(loaded) => Some(Arc::clone(&loaded.product)),
            _ => None,
        }
    }

    /// The selected cover image, if a product is loaded.
    #[must_use]
    pub fn cover(&self) -> Option<String> {
        match &self.model().state {
            DetailState::Loaded(loaded) => loaded.cover.clone(),
            _ => None,
        }
    }

    /// The related block, if a product is loaded.
    #[must_use]
    pub fn related(&self) -> Option<RelatedState> {
        match &self.model().state {
            DetailState::Loaded(loaded) => Some(loaded.related.clone()),
            _ => None,
        }
    }

    /// The shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}
