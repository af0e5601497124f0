//! Shopping cart domain type.

use rand::RngCore;
use serde::Serialize;
use snake_shop_core::{CartLineId, CatalogItem, Coins, ItemId, ItemKind};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("unknown item")]
    UnknownItem,
    #[error("default skin cannot be purchased")]
    DefaultSkin,
    #[error("cart item not found")]
    LineNotFound,
    #[error("quantity out of range")]
    InvalidQuantity,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartLineId,
    pub item_id: ItemId,
    pub name: String,
    pub price: Coins,
    pub quantity: u32,
    #[serde(skip)]
    pub kind: ItemKind,
    #[serde(skip)]
    pub extra_lives: u32,
}

impl CartLine {
    /// Price times quantity.
    #[must_use]
    pub const fn line_total(&self) -> Coins {
        self.price.times(self.quantity)
    }
}

/// The player's cart.
///
/// Holds at most one line per item id; adding an item that is already in the
/// cart bumps that line's quantity instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of price times quantity over every line.
    #[must_use]
    pub fn total(&self) -> Coins {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add one unit of a catalog item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DefaultSkin`] for the free starter skin.
    pub fn add(&mut self, item: &CatalogItem) -> Result<(), CartError> {
        if item.id.is_default_skin() && item.price.is_zero() {
            return Err(CartError::DefaultSkin);
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return Ok(());
        }
        self.lines.push(CartLine {
            id: new_line_id(),
            item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: 1,
            kind: item.kind,
            extra_lives: item.extra_lives,
        });
        Ok(())
    }

    /// Set the quantity of a line. A quantity below 1 removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id, or
    /// [`CartError::InvalidQuantity`] if the quantity does not fit.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            return if self.remove_line(id) {
                Ok(())
            } else {
                Err(CartError::LineNotFound)
            };
        }
        let quantity = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity)?;
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id.as_str() == id)
            .ok_or(CartError::LineNotFound)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line by id. Returns `false` if there was no such line.
    pub fn remove_line(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id.as_str() != id);
        self.lines.len() != before
    }

    /// Remove one unit of an item, dropping the line when it reaches zero.
    /// Returns `false` if the item is not in the cart.
    pub fn remove_one(&mut self, item_id: &str) -> bool {
        let Some(pos) = self.lines.iter().position(|l| l.item_id.as_str() == item_id) else {
            return false;
        };
        match self.lines.get_mut(pos) {
            Some(line) if line.quantity > 1 => line.quantity -= 1,
            _ => {
                self.lines.remove(pos);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Random 16-hex-character line id.
fn new_line_id() -> CartLineId {
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);
    CartLineId::new(hex::encode(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn gold() -> CatalogItem {
        CatalogItem::skin("skin_gold", "Gold", 100)
    }

    fn life() -> CatalogItem {
        CatalogItem::consumable("extra_life", "Extra Life", 50, 1)
    }

    #[test]
    fn test_add_accumulates_quantity() {
        let mut cart = Cart::default();
        cart.add(&life()).unwrap();
        cart.add(&gold()).unwrap();
        cart.add(&life()).unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].item_id.as_str(), "extra_life");
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total(), Coins::new(200));
    }

    #[test]
    fn test_add_rejects_default_skin() {
        let mut cart = Cart::default();
        let result = cart.add(&CatalogItem::skin("default", "Default", 0));
        assert_eq!(result, Err(CartError::DefaultSkin));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_ids_are_unique_hex() {
        let mut cart = Cart::default();
        cart.add(&life()).unwrap();
        cart.add(&gold()).unwrap();

        let a = &cart.lines()[0].id;
        let b = &cart.lines()[1].id;
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 16);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::default();
        cart.add(&life()).unwrap();
        let id = cart.lines()[0].id.clone();

        cart.update_quantity(id.as_str(), 4).unwrap();
        assert_eq!(cart.lines()[0].quantity, 4);

        cart.update_quantity(id.as_str(), 0).unwrap();
        assert!(cart.is_empty());

        assert_eq!(
            cart.update_quantity(id.as_str(), 2),
            Err(CartError::LineNotFound)
        );
        assert_eq!(
            cart.update_quantity("missing", -1),
            Err(CartError::LineNotFound)
        );
    }

    #[test]
    fn test_update_quantity_out_of_range() {
        let mut cart = Cart::default();
        cart.add(&life()).unwrap();
        let id = cart.lines()[0].id.clone();
        assert_eq!(
            cart.update_quantity(id.as_str(), i64::MAX),
            Err(CartError::InvalidQuantity)
        );
    }

    #[test]
    fn test_remove_one_decrements_then_drops() {
        let mut cart = Cart::default();
        cart.add(&life()).unwrap();
        cart.add(&life()).unwrap();

        assert!(cart.remove_one("extra_life"));
        assert_eq!(cart.lines()[0].quantity, 1);
        assert!(cart.remove_one("extra_life"));
        assert!(cart.is_empty());
        assert!(!cart.remove_one("extra_life"));
    }

    #[test]
    fn test_line_wire_format() {
        let mut cart = Cart::default();
        cart.add(&gold()).unwrap();
        let json = serde_json::to_value(&cart.lines()[0]).unwrap();
        assert_eq!(json["itemId"], "skin_gold");
        assert_eq!(json["name"], "Gold");
        assert_eq!(json["price"], 100);
        assert_eq!(json["quantity"], 1);
        assert!(json.get("kind").is_none());
    }
}
