//! Static catalog of purchasable items.
//!
//! The catalog is read-only after startup, so it is shared without locking.

use std::collections::BTreeMap;

use snake_shop_core::{CatalogItem, ItemId, ItemKind};

/// Lookup table of everything the shop sells.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: BTreeMap<ItemId, CatalogItem>,
}

impl Catalog {
    /// Build a catalog from a list of items. Later duplicates replace earlier ones.
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
        }
    }

    /// Look up an item by id. `None` signals an unknown item.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&CatalogItem> {
        self.items.get(&ItemId::new(id))
    }

    /// All skins, ordered by id.
    pub fn skins(&self) -> impl Iterator<Item = &CatalogItem> {
        self.of_kind(ItemKind::Skin)
    }

    /// All consumables, ordered by id.
    pub fn consumables(&self) -> impl Iterator<Item = &CatalogItem> {
        self.of_kind(ItemKind::Consumable)
    }

    fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &CatalogItem> {
        self.items.values().filter(move |item| item.kind == kind)
    }
}

impl Default for Catalog {
    /// The game's built-in catalog.
    fn default() -> Self {
        Self::new([
            CatalogItem::skin(ItemId::DEFAULT_SKIN, "Default", 0),
            CatalogItem::skin("skin_gold", "Gold", 100),
            CatalogItem::skin("skin_rainbow", "Rainbow", 100),
            CatalogItem::skin("skin_ice", "Ice", 100),
            CatalogItem::skin("skin_fire", "Fire", 100),
            CatalogItem::consumable("extra_life", "Extra Life", 50, 1),
            CatalogItem::consumable("speed_boost", "Speed Boost", 30, 0),
            CatalogItem::consumable("shield", "Shield", 40, 0),
            CatalogItem::consumable("score_multiplier", "Score Multiplier", 35, 0),
        ])
    }
}
