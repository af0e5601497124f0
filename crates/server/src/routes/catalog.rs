//! Catalog route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use snake_shop_core::CatalogItem;

use crate::state::AppState;

/// Items for sale, grouped the way the shop screen shows them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub skins: Vec<CatalogItem>,
    pub life_items: Vec<CatalogItem>,
}

/// List the catalog, sorted by item id within each group.
pub async fn index(State(state): State<AppState>) -> Json<CatalogView> {
    let catalog = state.shop().catalog();
    Json(CatalogView {
        skins: catalog.skins().cloned().collect(),
        life_items: catalog.consumables().cloned().collect(),
    })
}
