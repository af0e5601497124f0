//! Integration tests for the cart API, current and legacy paths.

use axum::http::{Method, StatusCode};
use serde_json::json;
use snake_shop_integration_tests::TestApp;

fn line_id(cart: &serde_json::Value, index: usize) -> String {
    cart["items"][index]["id"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_default()
}

#[tokio::test]
async fn test_add_item_returns_created_cart() {
    let app = TestApp::new();

    let response = app
        .post("/api/user/cart/items", &json!({"itemId": "extra_life"}))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let cart = response.json();
    assert_eq!(cart["total"], 50);
    assert_eq!(cart["items"][0]["itemId"], "extra_life");
    assert_eq!(cart["items"][0]["name"], "Extra Life");
    assert_eq!(cart["items"][0]["price"], 50);
    assert_eq!(cart["items"][0]["quantity"], 1);
    assert_eq!(line_id(&cart, 0).len(), 16);
}

#[tokio::test]
async fn test_add_same_item_accumulates() {
    let app = TestApp::new();
    app.add_to_cart("shield").await;
    let cart = app.add_to_cart("shield").await;

    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["total"], 80);
}

#[tokio::test]
async fn test_add_rejects_bad_items() {
    let app = TestApp::new();

    let unknown = app
        .post("/api/user/cart/items", &json!({"itemId": "skin_plaid"}))
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.json(), json!({"error": "unknown item"}));

    let default_skin = app
        .post("/api/user/cart/items", &json!({"itemId": "default"}))
        .await;
    assert_eq!(default_skin.status, StatusCode::BAD_REQUEST);

    let missing = app.post("/api/user/cart/items", &json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json(), json!({"error": "invalid itemId"}));
}

#[tokio::test]
async fn test_patch_quantity() {
    let app = TestApp::new();
    let cart = app.add_to_cart("speed_boost").await;
    let id = line_id(&cart, 0);
    let uri = format!("/api/user/cart/items/{id}");

    let response = app
        .send(Method::PATCH, &uri, Some(&json!({"quantity": 4})), &[])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["total"], 120);

    let response = app
        .send(Method::PATCH, &uri, Some(&json!({"quantity": 0})), &[])
        .await;
    assert_eq!(response.json(), json!({"items": [], "total": 0}));

    let response = app
        .send(Method::PATCH, &uri, Some(&json!({"quantity": 2})), &[])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({"error": "cart item not found"}));
}

#[tokio::test]
async fn test_patch_requires_quantity() {
    let app = TestApp::new();
    let cart = app.add_to_cart("speed_boost").await;
    let uri = format!("/api/user/cart/items/{}", line_id(&cart, 0));

    let response = app.send(Method::PATCH, &uri, Some(&json!({})), &[]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({"error": "quantity required"}));
}

#[tokio::test]
async fn test_delete_line() {
    let app = TestApp::new();
    app.add_to_cart("skin_gold").await;
    let cart = app.add_to_cart("shield").await;
    let uri = format!("/api/user/cart/items/{}", line_id(&cart, 0));

    let response = app.send(Method::DELETE, &uri, None, &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    let cart = response.json();
    assert_eq!(cart["items"][0]["itemId"], "shield");
    assert_eq!(cart["total"], 40);

    let again = app.send(Method::DELETE, &uri, None, &[]).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legacy_add_and_remove() {
    let app = TestApp::new();

    let added = app.post("/api/cart", &json!({"itemId": "extra_life"})).await;
    assert_eq!(added.status, StatusCode::OK);
    app.post("/api/cart", &json!({"itemId": "extra_life"})).await;

    let removed = app
        .post("/api/cart/remove", &json!({"itemId": "extra_life"}))
        .await;
    assert_eq!(removed.json()["items"][0]["quantity"], 1);

    let removed = app
        .post("/api/cart/remove", &json!({"itemId": "extra_life"}))
        .await;
    assert_eq!(removed.json(), json!({"items": [], "total": 0}));

    // Removing something that is not in the cart is not an error.
    let noop = app
        .post("/api/cart/remove", &json!({"itemId": "shield"}))
        .await;
    assert_eq!(noop.status, StatusCode::OK);
}
