//! MartAfrica Core - shared types and the cart store.
//!
//! # Architecture
//!
//! The core crate contains only types and pure state logic - no HTTP, no
//! database. The storefront binary wires these to sessions and the remote
//! MartAfrica API.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, products, emails, wishlist entries
//! - [`cart`] - Cart lines, the cart store, and its persisted record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartLine, CartStorage, CartStore, MemoryStorage, ProductSnapshot, StorageError};
pub use types::*;
