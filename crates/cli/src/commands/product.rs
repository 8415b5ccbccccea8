//! Product detail command.
//!
//! Drives a [`ProductDetail`] page the way a browser session would: load
//! the slug, then apply the requested user actions in order (select an
//! image, reveal related products, add to cart).

use ng_store_core::Product;
use ng_store_storefront::cart::CartSnapshot;
use ng_store_storefront::error::AppError;
use ng_store_storefront::meta::HeadTagsSink;
use ng_store_storefront::pages::{DetailState, ProductDetail, RelatedState};
use ng_store_storefront::state::AppState;
use serde::Serialize;

use super::print_json;
use crate::CliError;

/// User actions to apply after the product loads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailOptions {
    pub related: bool,
    pub image: Option<usize>,
    pub add_to_cart: bool,
}

#[derive(Serialize)]
struct DetailView<'a> {
    product: &'a Product,
    cover: Option<String>,
    related: RelatedView,
    head: String,
    cart: CartSnapshot,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RelatedView {
    Deferred,
    Pending,
    Ready { products: Vec<Product> },
    Failed { code: Option<u16>, message: String },
}

impl From<RelatedState> for RelatedView {
    fn from(state: RelatedState) -> Self {
        match state {
            RelatedState::Deferred => Self::Deferred,
            RelatedState::Pending => Self::Pending,
            RelatedState::Ready(products) => Self::Ready { products },
            RelatedState::Failed(error) => Self::Failed {
                code: error.status(),
                message: error
                    .remote_error()
                    .map_or_else(|| error.to_string(), |body| body.message.clone()),
            },
        }
    }
}

/// Load the product page for `slug` and print its snapshot.
pub async fn show(
    state: &AppState,
    head: &HeadTagsSink,
    slug: &str,
    options: DetailOptions,
) -> Result<(), CliError> {
    let detail = state.product_detail();
    detail.navigate(slug).await;

    let loaded = match detail.state() {
        DetailState::Loaded(loaded) => loaded,
        DetailState::Failed { error, .. } => return Err(AppError::from(error).into()),
        DetailState::Idle | DetailState::Loading { .. } => {
            return Err(AppError::NotFound(slug.to_string()).into());
        }
    };

    if let Some(index) = options.image
        && !detail.select_image(index)
    {
        return Err(AppError::BadRequest(format!(
            "image index {index} out of range ({} images)",
            loaded.product.images.len()
        ))
        .into());
    }
    if options.related {
        detail.reveal_related().await;
    }
    if options.add_to_cart {
        add_to_cart(&detail);
    }

    print_json(&DetailView {
        product: &loaded.product,
        cover: detail.cover(),
        related: detail.related().unwrap_or_default().into(),
        head: head.render(),
        cart: state.cart().snapshot(),
    })
}

fn add_to_cart(detail: &ProductDetail) {
    if detail.add_to_cart() {
        tracing::info!(
            count = detail.cart().count(),
            total = %detail.cart().total(),
            "Added to cart"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use ng_store_storefront::catalog::{CatalogError, CatalogRequest, RemoteErrorBody};
    use ng_store_storefront::config::StoreConfig;
    use ng_store_storefront::testing::{FakeGateway, fake_product};

    use super::*;

    fn app(gateway: Arc<FakeGateway>, head: Arc<HeadTagsSink>) -> AppState {
        let config = StoreConfig::new(
            "http://localhost:3000".parse().unwrap(),
            "https://ng-store.example",
        );
        AppState::with_gateway(config, gateway, head)
    }

    #[test]
    fn test_related_view_statuses() {
        let product = fake_product().build();

        let ready = serde_json::to_value(RelatedView::from(RelatedState::Ready(vec![
            product.clone(),
        ])))
        .unwrap();
        assert_eq!(ready["status"], "ready");
        assert_eq!(ready["products"][0]["slug"], product.slug.as_str());

        let deferred = serde_json::to_value(RelatedView::from(RelatedState::Deferred)).unwrap();
        assert_eq!(deferred, serde_json::json!({ "status": "deferred" }));
    }

    #[test]
    fn test_related_view_failure_keeps_remote_message() {
        let error = CatalogError::Remote {
            status: 404,
            error: RemoteErrorBody::from_body(br#"{"message":"Sin relacionados"}"#, "Not Found"),
        };

        let view = serde_json::to_value(RelatedView::from(RelatedState::Failed(Arc::new(error))))
            .unwrap();

        assert_eq!(
            view,
            serde_json::json!({ "status": "failed", "code": 404, "message": "Sin relacionados" })
        );
    }

    #[tokio::test]
    async fn test_image_out_of_range_is_bad_request() {
        let gateway = Arc::new(FakeGateway::new());
        let product = fake_product()
            .slug("producto-prueba")
            .images(["a.jpg", "b.jpg"])
            .build();
        gateway.respond_json(&CatalogRequest::product_by_slug("producto-prueba"), &product);
        let head = Arc::new(HeadTagsSink::new());
        let state = app(gateway, Arc::clone(&head));

        let options = DetailOptions {
            image: Some(2),
            add_to_cart: true,
            ..DetailOptions::default()
        };
        let err = show(&state, &head, "producto-prueba", options)
            .await
            .unwrap_err();

        let CliError::App(AppError::BadRequest(message)) = &err else {
            panic!("expected bad request, got {err}");
        };
        assert_eq!(message, "image index 2 out of range (2 images)");
        assert!(state.cart().is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_is_catalog_error() {
        let gateway = Arc::new(FakeGateway::new());
        let head = Arc::new(HeadTagsSink::new());
        let state = app(gateway, Arc::clone(&head));

        let err = show(&state, &head, "missing", DetailOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(&err, CliError::App(AppError::Catalog(e)) if e.is_not_found()));
        assert!(!err.is_reportable());
    }
}
