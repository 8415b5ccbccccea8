//! Catalog listing commands.
//!
//! # Usage
//!
//! ```bash
//! ng-store products --category-id 1
//! ng-store product-id 42
//! ng-store related producto-prueba
//! ng-store categories
//! ```

use std::sync::Arc;

use ng_store_core::Product;
use ng_store_storefront::catalog::ProductFilter;
use ng_store_storefront::error::AppError;
use ng_store_storefront::pages::ListingState;
use ng_store_storefront::state::AppState;

use super::print_json;
use crate::CliError;

/// List products through the listing page.
///
/// Empty filter values are treated as absent.
pub async fn products(
    state: &AppState,
    category_id: Option<String>,
    category_slug: Option<String>,
) -> Result<(), CliError> {
    let listing = state.product_listing();
    let filter = ProductFilter {
        category_id,
        category_slug,
    };

    listing.apply_filter(filter).await;
    if let ListingState::Failed { error, .. } = listing.state() {
        return Err(AppError::from(error).into());
    }

    let products = listing.products();
    tracing::info!(count = products.len(), "Products listed");
    print_json(&products.iter().map(Arc::as_ref).collect::<Vec<&Product>>())
}

/// Print a single product by id.
pub async fn product_by_id(state: &AppState, id: &str) -> Result<(), CliError> {
    let product = state.catalog().get_one(id).await.map_err(AppError::from)?;
    print_json(&product)
}

/// Print the products related to `slug`.
pub async fn related(state: &AppState, slug: &str) -> Result<(), CliError> {
    let products = state
        .catalog()
        .get_related_products(slug)
        .await
        .map_err(AppError::from)?;
    print_json(&products)
}

/// Print every category.
pub async fn categories(state: &AppState) -> Result<(), CliError> {
    let listing = state.product_listing();
    listing.load_categories().await.map_err(AppError::from)?;
    print_json(&listing.categories())
}
