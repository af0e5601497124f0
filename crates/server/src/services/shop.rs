//! Owner of the player and cart state.
//!
//! There is one player and one cart per process. Both live behind a single
//! reader/writer lock so that checkout can read and mutate them together as one
//! critical section. Every other component goes through this service; nothing
//! else holds a reference to the live state.

use std::sync::Arc;

use snake_shop_core::{Coins, CoinsError};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{info, instrument};

use crate::catalog::Catalog;
use crate::models::{Cart, CartError, EquipError, Player};

/// The mutable game-economy state.
#[derive(Debug, Clone)]
pub struct ShopState {
    pub player: Player,
    pub cart: Cart,
}

/// Shared handle to the shop state.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct ShopService {
    inner: Arc<ShopServiceInner>,
}

struct ShopServiceInner {
    catalog: Catalog,
    state: RwLock<ShopState>,
}

impl ShopService {
    #[must_use]
    pub fn new(catalog: Catalog, starting_balance: Coins) -> Self {
        Self::with_state(
            catalog,
            ShopState {
                player: Player::new(starting_balance),
                cart: Cart::default(),
            },
        )
    }

    /// Start from an existing state, e.g. a test fixture.
    #[must_use]
    pub fn with_state(catalog: Catalog, state: ShopState) -> Self {
        Self {
            inner: Arc::new(ShopServiceInner {
                catalog,
                state: RwLock::new(state),
            }),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Snapshot of the player.
    pub async fn player(&self) -> Player {
        self.inner.state.read().await.player.clone()
    }

    /// Snapshot of the cart.
    pub async fn cart(&self) -> Cart {
        self.inner.state.read().await.cart.clone()
    }

    /// Exclusive access to player and cart together.
    ///
    /// Must not be held across a call to an external dependency.
    pub(crate) async fn exclusive(&self) -> RwLockWriteGuard<'_, ShopState> {
        self.inner.state.write().await
    }

    /// Credit coins for a game score. Returns `(earned, new_balance)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinsError::Overflow`] if the balance would overflow.
    #[instrument(skip(self))]
    pub async fn earn(&self, score: u64) -> Result<(Coins, Coins), CoinsError> {
        let mut state = self.exclusive().await;
        let earned = state.player.earn_from_score(score)?;
        info!(earned = %earned, balance = %state.player.balance(), "Coins earned");
        Ok((earned, state.player.balance()))
    }

    /// Equip an owned skin.
    ///
    /// # Errors
    ///
    /// Returns [`EquipError::NotOwned`] if the player does not own it.
    #[instrument(skip(self))]
    pub async fn equip(&self, skin_id: &str) -> Result<(), EquipError> {
        self.exclusive().await.player.equip(skin_id)
    }

    /// Add one unit of a catalog item to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownItem`] for ids not in the catalog and
    /// [`CartError::DefaultSkin`] for the free starter skin.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, item_id: &str) -> Result<Cart, CartError> {
        let item = self
            .inner
            .catalog
            .item(item_id)
            .ok_or(CartError::UnknownItem)?;
        let mut state = self.exclusive().await;
        state.cart.add(item)?;
        Ok(state.cart.clone())
    }

    /// Set a line's quantity; below 1 removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for unknown line ids.
    #[instrument(skip(self))]
    pub async fn update_cart_line(&self, line_id: &str, quantity: i64) -> Result<Cart, CartError> {
        let mut state = self.exclusive().await;
        state.cart.update_quantity(line_id, quantity)?;
        Ok(state.cart.clone())
    }

    /// Remove a line by id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for unknown line ids.
    #[instrument(skip(self))]
    pub async fn remove_cart_line(&self, line_id: &str) -> Result<Cart, CartError> {
        let mut state = self.exclusive().await;
        if !state.cart.remove_line(line_id) {
            return Err(CartError::LineNotFound);
        }
        Ok(state.cart.clone())
    }

    /// Remove one unit of an item. Unknown items leave the cart unchanged.
    #[instrument(skip(self))]
    pub async fn remove_one_from_cart(&self, item_id: &str) -> Cart {
        let mut state = self.exclusive().await;
        state.cart.remove_one(item_id);
        state.cart.clone()
    }
}
