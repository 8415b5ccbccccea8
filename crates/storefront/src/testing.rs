//! Test doubles and fixtures.
//!
//! Available to this crate's unit tests and, through the `testing`
//! feature, to the integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, TimeDelta, Utc};
use ng_store_core::{Category, CategoryId, Price, Product, ProductId};
use rand::Rng;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::catalog::{CatalogError, CatalogGateway, CatalogRequest, RemoteErrorBody};
use crate::meta::{MetaSinkError, MetaTag, MetaTagSink};

// =============================================================================
// FakeGateway
// =============================================================================

type Reply = Result<Bytes, (u16, Bytes)>;

/// In-memory [`CatalogGateway`] with scripted responses.
///
/// Routes are matched on [`CatalogRequest::path_and_query`]. Unknown
/// routes answer `404 {"message":"Not Found"}`. Every request is recorded,
/// including those that fail.
#[derive(Debug, Default)]
pub struct FakeGateway {
    routes: Mutex<HashMap<String, Reply>>,
    held: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Reply>>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `request` with `value` serialized as JSON.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized.
    #[allow(clippy::expect_used)]
    pub fn respond_json<T: Serialize + ?Sized>(&self, request: &CatalogRequest, value: &T) {
        let body = serde_json::to_vec(value).expect("fixture serializes");
        self.route(request, Ok(Bytes::from(body)));
    }

    /// Answer `request` with a raw successful body.
    pub fn respond_raw(&self, request: &CatalogRequest, body: &str) {
        self.route(request, Ok(Bytes::copy_from_slice(body.as_bytes())));
    }

    /// Answer `request` with a non-success status and body.
    pub fn respond_error(&self, request: &CatalogRequest, status: u16, body: &str) {
        self.route(request, Err((status, Bytes::copy_from_slice(body.as_bytes()))));
    }

    /// Hold the next call for `request` until the returned handle resolves it.
    ///
    /// Held calls take priority over scripted routes and are consumed in
    /// the order they were registered.
    pub fn hold(&self, request: &CatalogRequest) -> HeldResponse {
        let (tx, rx) = oneshot::channel();
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(request.path_and_query())
            .or_default()
            .push_back(rx);
        HeldResponse { tx }
    }

    /// Every request seen so far, as path and query.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn route(&self, request: &CatalogRequest, reply: Reply) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request.path_and_query(), reply);
    }
}

#[async_trait]
impl CatalogGateway for FakeGateway {
    async fn get(&self, request: &CatalogRequest) -> Result<Bytes, CatalogError> {
        let key = request.path_and_query();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.clone());

        let held = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        let reply = match held {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err((503, Bytes::from_static(b"held response dropped")))),
            None => self
                .routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Err((404, Bytes::from_static(br#"{"message":"Not Found"}"#)))),
        };

        reply.map_err(|(status, body)| CatalogError::Remote {
            status,
            error: RemoteErrorBody::from_body(&body, "Error"),
        })
    }
}

/// Completes a call parked by [`FakeGateway::hold`].
#[derive(Debug)]
pub struct HeldResponse {
    tx: oneshot::Sender<Reply>,
}

impl HeldResponse {
    /// Release the call with `value` serialized as JSON.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized.
    #[allow(clippy::expect_used)]
    pub fn resolve_json<T: Serialize + ?Sized>(self, value: &T) {
        let body = serde_json::to_vec(value).expect("fixture serializes");
        let _ = self.tx.send(Ok(Bytes::from(body)));
    }

    /// Release the call with a non-success status.
    pub fn fail(self, status: u16, body: &str) {
        let _ = self
            .tx
            .send(Err((status, Bytes::copy_from_slice(body.as_bytes()))));
    }
}

// =============================================================================
// Fixtures
// =============================================================================

const TITLES: [&str; 6] = [
    "Camiseta",
    "Zapatillas",
    "Mochila",
    "Auriculares",
    "Lámpara",
    "Taza",
];

/// A random category.
#[must_use]
pub fn fake_category() -> Category {
    let mut rng = rand::rng();
    let n: i64 = rng.random_range(1..=10_000);
    Category {
        id: CategoryId::new(n),
        name: format!("Category {n}"),
        image: format!("https://placehold.co/600x400?text=category-{n}"),
        slug: format!("category-{n}"),
    }
}

/// Start building a random product.
#[must_use]
pub fn fake_product() -> ProductBuilder {
    let mut rng = rand::rng();
    let n: i64 = rng.random_range(1..=1_000_000);
    let title = TITLES
        .get(rng.random_range(0..TITLES.len()))
        .copied()
        .unwrap_or("Producto");

    ProductBuilder {
        product: Product {
            id: ProductId::new(n),
            title: format!("{title} {n}"),
            price: Price::from_units(rng.random_range(1..=1_000)),
            description: format!("Description for {title} {n}"),
            category: fake_category(),
            images: vec![
                format!("https://placehold.co/600x400?text={n}-1"),
                format!("https://placehold.co/600x400?text={n}-2"),
            ],
            creation_at: (Utc::now() - TimeDelta::days(rng.random_range(0..365)))
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            slug: format!("product-{n}"),
        },
    }
}

/// Builder returned by [`fake_product`].
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.product.id = ProductId::new(id);
        self
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.product.title = title.to_string();
        self
    }

    #[must_use]
    pub fn price(mut self, price: Price) -> Self {
        self.product.price = price;
        self
    }

    #[must_use]
    pub fn slug(mut self, slug: &str) -> Self {
        self.product.slug = slug.to_string();
        self
    }

    #[must_use]
    pub fn images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.product.images = images.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn build(self) -> Product {
        self.product
    }
}

// =============================================================================
// RecordingSink
// =============================================================================

/// A call received by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Title(String),
    Tag(MetaTag),
}

/// [`MetaTagSink`] that records every call, optionally failing tag updates.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failure: Option<String>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose tag updates fail with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::default(),
            failure: Some(message.to_string()),
        }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The last title set, if any.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|call| match call {
            SinkCall::Title(title) => Some(title),
            SinkCall::Tag(_) => None,
        })
    }

    /// Tag updates in the order received.
    #[must_use]
    pub fn tags(&self) -> Vec<MetaTag> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Tag(tag) => Some(tag),
                SinkCall::Title(_) => None,
            })
            .collect()
    }

    fn record(&self, call: SinkCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl MetaTagSink for RecordingSink {
    fn set_title(&self, title: &str) -> Result<(), MetaSinkError> {
        self.record(SinkCall::Title(title.to_string()));
        Ok(())
    }

    fn update_tag(&self, tag: &MetaTag) -> Result<(), MetaSinkError> {
        if let Some(message) = &self.failure {
            return Err(MetaSinkError(message.clone()));
        }
        self.record(SinkCall::Tag(tag.clone()));
        Ok(())
    }
}
