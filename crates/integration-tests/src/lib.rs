//! Integration tests for Snake Shop.
//!
//! The tests in `tests/` build the real axum router around a fresh
//! [`AppState`] and drive it in-process with `tower::ServiceExt::oneshot`, so
//! no port is bound and every test starts from the initial player state.
//!
//! ```bash
//! cargo test -p snake-shop-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use snake_shop_server::{
    catalog::Catalog,
    config::ServerConfig,
    services::{PaymentGateway, StubGateway},
    state::AppState,
};
use tower::ServiceExt;

/// A router plus handles on the pieces tests want to inspect.
pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<StubGateway>,
    router: Router,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

impl TestApp {
    /// App with the default catalog and a gateway that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_gateway(StubGateway::new())
    }

    #[must_use]
    pub fn with_gateway(gateway: StubGateway) -> Self {
        let gateway = Arc::new(gateway);
        let shared: Arc<dyn PaymentGateway> = gateway.clone();
        let state = AppState::with_gateway(ServerConfig::default(), Catalog::default(), shared);
        let router = snake_shop_server::app(state.clone());
        Self {
            state,
            gateway,
            router,
        }
    }

    /// Send a request with an optional JSON body and extra headers.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::expect_used)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None, &[]).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body), &[]).await
    }

    /// Add an item through the cart API and return the new cart.
    pub async fn add_to_cart(&self, item_id: &str) -> Value {
        self.post("/api/user/cart/items", &serde_json::json!({ "itemId": item_id }))
            .await
            .json()
    }

    /// `POST /api/checkout` with optional idempotency key and extra headers.
    pub async fn checkout(&self, key: Option<&str>, extra: &[(&str, &str)]) -> TestResponse {
        let mut headers: Vec<(&str, &str)> = extra.to_vec();
        if let Some(key) = key {
            headers.push(("Idempotency-Key", key));
        }
        self.send(Method::POST, "/api/checkout", None, &headers).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
