//! HTTP route handlers for the shop API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Health check
//!
//! # Player
//! GET    /api/player                - Player snapshot
//! POST   /api/earn                  - Earn coins for a score
//! POST   /api/equip                 - Equip an owned skin
//!
//! # Catalog
//! GET    /api/catalog               - Skins and consumables for sale
//!
//! # Cart
//! GET    /api/user/cart             - View cart
//! POST   /api/user/cart/items       - Add an item (201)
//! PATCH  /api/user/cart/items/{id}  - Change a line's quantity
//! DELETE /api/user/cart/items/{id}  - Remove a line
//!
//! # Legacy cart (older frontend builds)
//! POST   /api/cart                  - Add an item (200)
//! POST   /api/cart/remove           - Remove one unit of an item
//!
//! # Checkout
//! POST   /api/checkout              - Pay for the cart
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod player;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    routing::{get, patch, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the player routes router.
pub fn player_routes() -> Router<AppState> {
    Router::new()
        .route("/player", get(player::show))
        .route("/earn", post(player::earn))
        .route("/equip", post(player::equip))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
}

/// Create the legacy cart routes router.
pub fn legacy_cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::legacy_add))
        .route("/remove", post(cart::legacy_remove))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(player_routes())
        .route("/catalog", get(catalog::index))
        .nest("/user/cart", cart_routes())
        .nest("/cart", legacy_cart_routes())
        .route("/checkout", post(checkout::checkout))
}

/// Unwrap a JSON body, turning any rejection into a 400 with `message`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected request body");
        AppError::BadRequest(message.to_string())
    })
}
