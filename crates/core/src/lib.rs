//! Snake Shop Core - Shared domain types.
//!
//! This crate provides the types shared by the Snake Shop components:
//! - `server` - Game economy backend (player, cart, checkout)
//! - `integration-tests` - HTTP-level tests for the server
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no locking, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, coin amounts, items and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
