//! Core types for Snake Shop.
//!
//! This module provides type-safe wrappers for the game economy's domain concepts.

pub mod coins;
pub mod id;
pub mod item;
pub mod status;

pub use coins::{Coins, CoinsError};
pub use id::*;
pub use item::{CatalogItem, ItemKind};
pub use status::*;
