//! HTTP middleware stack for the shop API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. CORS (answers preflight requests from the game frontend)
//! 3. `TraceLayer` (one `http_request` span per request)
//! 4. Request ID (recorded in the span, echoed in the response)

pub mod request_id;

use std::time::Duration;

use axum::http::{HeaderName, Method, Request, Response, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{
    DefaultOnRequest, DefaultOnResponse, HttpMakeClassifier, MakeSpan, OnResponse, TraceLayer,
};
use tracing::Span;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

use crate::routes::checkout::{IDEMPOTENCY_KEY_HEADER, SIMULATE_TIMEOUT_HEADER};

/// CORS policy for the browser game: any origin, the API's methods, and the
/// headers checkout understands.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
            HeaderName::from_static(SIMULATE_TIMEOUT_HEADER),
        ])
}

/// Span factory for [`trace_layer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSpan;

impl<B> MakeSpan<B> for HttpSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}

/// Records status and latency on the request span.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordResponse;

impl<B> OnResponse<B> for RecordResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        span.record("status", response.status().as_u16());
        span.record(
            "latency_ms",
            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        );
        DefaultOnResponse::default().on_response(response, latency, span);
    }
}

/// Request tracing layer.
#[must_use]
pub fn trace_layer() -> TraceLayer<HttpMakeClassifier, HttpSpan, DefaultOnRequest, RecordResponse> {
    TraceLayer::new_for_http()
        .make_span_with(HttpSpan)
        .on_response(RecordResponse)
}
