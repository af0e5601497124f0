//! Purchasable items.

use serde::{Deserialize, Serialize};

use super::coins::Coins;
use super::id::ItemId;

/// The kind of a purchasable item.
///
/// Skins are cosmetic: once owned they are never charged for again.
/// Consumables are not tracked as owned; their effect accumulates with quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Skin,
    Consumable,
}

impl ItemKind {
    /// Returns `true` for cosmetic items.
    #[must_use]
    pub const fn is_skin(self) -> bool {
        matches!(self, Self::Skin)
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub price: Coins,
    pub kind: ItemKind,
    /// Extra lives granted per unit purchased.
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub extra_lives: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes by reference
const fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl CatalogItem {
    /// Create a skin entry.
    #[must_use]
    pub fn skin(id: &str, name: &str, price: u64) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.to_owned(),
            price: Coins::new(price),
            kind: ItemKind::Skin,
            extra_lives: 0,
        }
    }

    /// Create a consumable entry.
    #[must_use]
    pub fn consumable(id: &str, name: &str, price: u64, extra_lives: u32) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.to_owned(),
            price: Coins::new(price),
            kind: ItemKind::Consumable,
            extra_lives,
        }
    }
}
