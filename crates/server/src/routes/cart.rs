//! Cart route handlers.
//!
//! Every mutation answers with the whole cart so the frontend can redraw it
//! from one response.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use snake_shop_core::Coins;
use tracing::instrument;

use super::json_body;
use crate::error::{AppError, Result};
use crate::models::{Cart, CartLine};
use crate::state::AppState;

/// Cart as sent to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Coins,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let total = cart.total();
        Self {
            items: cart.lines().to_vec(),
            total,
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    #[serde(default)]
    pub item_id: String,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: Option<i64>,
}

fn item_id(payload: std::result::Result<Json<ItemRequest>, JsonRejection>) -> Result<String> {
    let request = json_body(payload, "invalid itemId")?;
    if request.item_id.is_empty() {
        return Err(AppError::BadRequest("invalid itemId".to_string()));
    }
    Ok(request.item_id)
}

/// View the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(state.shop().cart().await.into())
}

/// Add one unit of an item.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartView>)> {
    let item_id = item_id(payload)?;
    let cart = state.shop().add_to_cart(&item_id).await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// Change a line's quantity. Zero or less removes the line.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let quantity = json_body(payload, "quantity required")?
        .quantity
        .ok_or_else(|| AppError::BadRequest("quantity required".to_string()))?;

    let cart = state.shop().update_cart_line(&id, quantity).await?;
    Ok(Json(cart.into()))
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let cart = state.shop().remove_cart_line(&id).await?;
    Ok(Json(cart.into()))
}

/// Add one unit of an item (older frontend builds, answers 200).
#[instrument(skip(state, payload))]
pub async fn legacy_add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let item_id = item_id(payload)?;
    let cart = state.shop().add_to_cart(&item_id).await?;
    Ok(Json(cart.into()))
}

/// Remove one unit of an item by item id.
#[instrument(skip(state, payload))]
pub async fn legacy_remove(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<CartView>> {
    let item_id = item_id(payload)?;
    Ok(Json(state.shop().remove_one_from_cart(&item_id).await.into()))
}
