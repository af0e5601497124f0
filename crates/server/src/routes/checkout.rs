//! Checkout route handler.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::services::StubGateway;
use crate::state::AppState;

/// Client token that makes a checkout safe to resend.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// When `true`, the payment gateway times out on every attempt.
pub const SIMULATE_TIMEOUT_HEADER: &str = "x-simulate-payment-timeout";

/// Pay for the cart.
///
/// The body is written exactly as the checkout produced it so that a replay
/// under the same `Idempotency-Key` is byte-identical.
#[instrument(skip(state, headers))]
pub async fn checkout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    let simulate_timeout = headers
        .get(SIMULATE_TIMEOUT_HEADER)
        .is_some_and(|v| v.as_bytes() == b"true");

    let response = if simulate_timeout {
        let gateway = StubGateway::timing_out();
        state.checkout().checkout(key, &gateway).await
    } else {
        state.checkout().checkout(key, state.gateway()).await
    };

    (
        response.status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        response.body,
    )
        .into_response()
}
