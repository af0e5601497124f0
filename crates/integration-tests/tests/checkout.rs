//! Integration tests for `POST /api/checkout`.
//!
//! These drive the full router: headers in, raw body bytes out.

use axum::http::StatusCode;
use serde_json::json;
use snake_shop_integration_tests::TestApp;
use snake_shop_core::Coins;
use snake_shop_server::services::{RecordedCharge, StubGateway};

// =============================================================================
// Validation Failures
// =============================================================================

#[tokio::test]
async fn test_checkout_empty_cart() {
    let app = TestApp::new();

    let response = app.checkout(None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"Status": "Fail", "Message": "Cart is empty"})
    );
    assert_eq!(app.get("/api/player").await.json()["Balance"], 200);
    assert_eq!(app.gateway.charge_attempts(), 0);
}

#[tokio::test]
async fn test_checkout_insufficient_balance() {
    let app = TestApp::new();
    app.add_to_cart("skin_gold").await;
    app.add_to_cart("skin_fire").await;
    app.add_to_cart("extra_life").await;

    let response = app.checkout(None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({"Status": "Fail", "Message": "Not enough coins", "Balance": 200})
    );
    assert_eq!(app.get("/api/player").await.json()["Balance"], 200);
    assert_eq!(app.get("/api/user/cart").await.json()["total"], 250);
}

// =============================================================================
// Successful Purchase
// =============================================================================

#[tokio::test]
async fn test_checkout_success_updates_player() {
    let app = TestApp::new();
    app.add_to_cart("skin_rainbow").await;
    app.add_to_cart("extra_life").await;

    let response = app.checkout(None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers["content-type"],
        "application/json"
    );
    assert_eq!(
        response.json(),
        json!({
            "Status": "Success",
            "Message": "Purchase complete!",
            "Balance": 50,
            "OwnedSkins": ["default", "skin_rainbow"],
            "EquippedSkin": "skin_rainbow",
            "ExtraLives": 1,
        })
    );
    assert_eq!(
        app.get("/api/user/cart").await.json(),
        json!({"items": [], "total": 0})
    );
}

#[tokio::test]
async fn test_checkout_skips_owned_skin() {
    let app = TestApp::new();
    app.add_to_cart("skin_ice").await;
    assert_eq!(app.checkout(None, &[]).await.status, StatusCode::OK);

    // Buying the same skin again alongside a consumable only charges the consumable.
    app.add_to_cart("skin_ice").await;
    app.add_to_cart("shield").await;
    let body = app.checkout(None, &[]).await.json();

    assert_eq!(body["Status"], "Success");
    assert_eq!(body["Balance"], 60);
    assert_eq!(body["OwnedSkins"], json!(["default", "skin_ice"]));
    let amounts: Vec<_> = app.gateway.charges().iter().map(|c| c.amount).collect();
    assert_eq!(amounts, [Coins::new(100), Coins::new(40)]);
}

// =============================================================================
// Payment Failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_checkout_gateway_timeout_exhausts_retries() {
    let app = TestApp::with_gateway(StubGateway::timing_out());
    app.add_to_cart("skin_gold").await;

    let response = app.checkout(None, &[]).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json(),
        json!({
            "Status": "Fail",
            "Message": "Payment temporarily unavailable. Please try again.",
        })
    );
    assert_eq!(app.gateway.charge_attempts(), 5);
    assert_eq!(app.get("/api/player").await.json()["Balance"], 200);
    assert_eq!(
        app.get("/api/user/cart").await.json()["items"]
            .as_array()
            .map(Vec::len),
        Some(1)
    );
}

#[tokio::test(start_paused = true)]
async fn test_simulate_timeout_header() {
    let app = TestApp::new();
    app.add_to_cart("speed_boost").await;

    let response = app
        .checkout(None, &[("X-Simulate-Payment-Timeout", "true")])
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    // The simulated gateway stands in for the configured one.
    assert_eq!(app.gateway.charge_attempts(), 0);
    assert_eq!(app.get("/api/player").await.json()["Balance"], 200);
}

// =============================================================================
// Idempotency
// =============================================================================

#[tokio::test]
async fn test_replay_is_byte_identical() {
    let app = TestApp::new();
    app.add_to_cart("skin_gold").await;

    let first = app.checkout(Some("checkout-abc"), &[]).await;
    let second = app.checkout(Some("checkout-abc"), &[]).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, first.status);
    assert_eq!(second.body, first.body);
    assert_eq!(
        app.gateway.charges(),
        [RecordedCharge {
            amount: Coins::new(100),
            idempotency_key: Some("checkout-abc".to_string()),
        }]
    );
    assert_eq!(app.get("/api/player").await.json()["Balance"], 100);
}

#[tokio::test(start_paused = true)]
async fn test_resend_during_retries_is_answered_once() {
    let app = TestApp::with_gateway(StubGateway::new().timeouts_before_success(2));
    app.add_to_cart("extra_life").await;

    let (first, second) = tokio::join!(app.checkout(Some("order-1"), &[]), async {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        app.checkout(Some("order-1"), &[]).await
    });

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.body, first.body);
    assert_eq!(first.json()["Balance"], 150);
    assert_eq!(app.gateway.charge_attempts(), 3);
    let player = app.get("/api/player").await.json();
    assert_eq!(player["Balance"], 150);
    assert_eq!(player["ExtraLives"], 1);
}

#[tokio::test]
async fn test_distinct_keys_run_separately() {
    let app = TestApp::new();
    app.add_to_cart("skin_gold").await;

    let first = app.checkout(Some("key-1"), &[]).await;
    let second = app.checkout(Some("key-2"), &[]).await;

    assert_eq!(first.json()["Status"], "Success");
    assert_eq!(
        second.json(),
        json!({"Status": "Fail", "Message": "Cart is empty"})
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_payment_is_replayed() {
    let app = TestApp::new();
    app.add_to_cart("skin_gold").await;

    let first = app
        .checkout(Some("flaky"), &[("X-Simulate-Payment-Timeout", "true")])
        .await;
    let second = app.checkout(Some("flaky"), &[]).await;

    assert_eq!(first.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(second.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(second.body, first.body);
    assert_eq!(app.gateway.charge_attempts(), 0);
}

#[tokio::test]
async fn test_cors_preflight_allows_checkout_headers() {
    let app = TestApp::new();

    let response = app
        .send(
            axum::http::Method::OPTIONS,
            "/api/checkout",
            None,
            &[
                ("Origin", "http://localhost:5173"),
                ("Access-Control-Request-Method", "POST"),
                ("Access-Control-Request-Headers", "idempotency-key"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers["access-control-allow-origin"], "*");
    let allowed = response.headers["access-control-allow-headers"]
        .to_str()
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains("idempotency-key"));
    assert!(allowed.contains("x-simulate-payment-timeout"));
}
