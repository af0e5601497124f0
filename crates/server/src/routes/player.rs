//! Player route handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use snake_shop_core::{Coins, ItemId};
use tracing::instrument;

use super::json_body;
use crate::error::{AppError, Result};
use crate::models::Player;
use crate::state::AppState;

/// Earn request body.
#[derive(Debug, Deserialize)]
pub struct EarnRequest {
    pub score: i64,
}

/// Coins credited and the resulting balance.
#[derive(Debug, Serialize)]
pub struct EarnResponse {
    pub earned: Coins,
    pub balance: Coins,
}

/// Equip request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipRequest {
    #[serde(default)]
    pub skin_id: String,
}

#[derive(Debug, Serialize)]
pub struct EquipResponse {
    pub equipped: ItemId,
}

/// Current player snapshot.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<Player> {
    Json(state.shop().player().await)
}

/// Credit coins for a finished game.
#[instrument(skip(state, payload))]
pub async fn earn(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EarnRequest>, JsonRejection>,
) -> Result<Json<EarnResponse>> {
    let request = json_body(payload, "invalid score")?;
    let score = u64::try_from(request.score)
        .map_err(|_| AppError::BadRequest("invalid score".to_string()))?;

    let (earned, balance) = state
        .shop()
        .earn(score)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(EarnResponse { earned, balance }))
}

/// Equip an owned skin.
#[instrument(skip(state, payload))]
pub async fn equip(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EquipRequest>, JsonRejection>,
) -> Result<Json<EquipResponse>> {
    let request = json_body(payload, "invalid skinId")?;
    if request.skin_id.is_empty() {
        return Err(AppError::BadRequest("invalid skinId".to_string()));
    }

    state.shop().equip(&request.skin_id).await?;
    Ok(Json(EquipResponse {
        equipped: ItemId::new(request.skin_id),
    }))
}
