//! Domain models for the game economy.
//!
//! These are plain values with no locking; the shop service owns the single
//! live instance of each and serializes access to them.

pub mod cart;
pub mod player;

pub use cart::{Cart, CartError, CartLine};
pub use player::{EquipError, Player};
