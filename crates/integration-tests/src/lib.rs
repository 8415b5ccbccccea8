//! Integration tests for Ng Store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ng-store-integration-tests
//! ```
//!
//! Tests run against [`FakeCatalogServer`], an `axum` server bound to an
//! ephemeral local port that serves canned catalog responses and records
//! every request target. No external services are needed.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use futures::stream;
use ng_store_storefront::catalog::{CatalogGateway, CatalogRequest, CatalogService, TransportKind, build_gateway};
use ng_store_storefront::config::StoreConfig;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Public domain used by test configurations.
pub const TEST_DOMAIN: &str = "https://ng-store.test";

#[derive(Clone)]
enum Canned {
    Body(StatusCode, String),
    /// Sends a partial body, then drops the connection.
    Truncated(StatusCode),
}

#[derive(Default)]
struct ServerState {
    routes: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<String>>,
}

/// A local catalog API with scripted responses.
///
/// Routes are matched on the full request target (path and query).
/// Unknown targets answer `404 {"message":"Not Found"}`.
pub struct FakeCatalogServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl FakeCatalogServer {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .fallback(serve_canned)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake catalog server");
        let addr = listener.local_addr().expect("Listener has no local address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the server.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Bound address is a valid URL")
    }

    /// Configuration pointing at this server.
    #[must_use]
    pub fn config(&self, transport: TransportKind) -> StoreConfig {
        let mut config = StoreConfig::new(self.base_url(), TEST_DOMAIN);
        config.transport = transport;
        config
    }

    /// A real HTTP gateway using `transport`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn gateway(&self, transport: TransportKind) -> Arc<dyn CatalogGateway> {
        build_gateway(&self.config(transport)).expect("Failed to build gateway")
    }

    /// An uncached catalog service using `transport`.
    #[must_use]
    pub fn catalog(&self, transport: TransportKind) -> CatalogService {
        CatalogService::new(self.gateway(transport), None)
    }

    /// Answer `request` with `value` as JSON.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized.
    pub fn respond_json<T: Serialize + ?Sized>(&self, request: &CatalogRequest, value: &T) {
        let body = serde_json::to_string(value).expect("Fixture serializes");
        self.respond(request, 200, &body);
    }

    /// Answer `request` with `status` and a raw body.
    ///
    /// # Panics
    ///
    /// Panics if `status` is not a valid HTTP status code.
    pub fn respond(&self, request: &CatalogRequest, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("Valid status code");
        self.route(request, Canned::Body(status, body.to_string()));
    }

    /// Answer `request` with `status` and a body that breaks off midway.
    ///
    /// # Panics
    ///
    /// Panics if `status` is not a valid HTTP status code.
    pub fn respond_truncated(&self, request: &CatalogRequest, status: u16) {
        let status = StatusCode::from_u16(status).expect("Valid status code");
        self.route(request, Canned::Truncated(status));
    }

    /// Request targets received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn route(&self, request: &CatalogRequest, canned: Canned) {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request.path_and_query(), canned);
    }
}

impl Drop for FakeCatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_canned(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(target.clone());

    let canned = state
        .routes
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&target)
        .cloned()
        .unwrap_or_else(|| Canned::Body(StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#.to_string()));

    match canned {
        Canned::Body(status, body) => {
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Canned::Truncated(status) => {
            let chunks = stream::iter([
                Ok(Bytes::from_static(br#"{"message":"#)),
                Err(io::Error::other("connection reset")),
            ]);
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                Body::from_stream(chunks),
            )
                .into_response()
        }
    }
}

/// An address with nothing listening on it.
///
/// # Panics
///
/// Panics if no ephemeral port can be bound.
pub async fn refused_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let addr = listener.local_addr().expect("Listener has no local address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("Bound address is a valid URL")
}
