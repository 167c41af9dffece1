//! Session models for the storefront.
//!
//! Domain types (products, carts, wishlists) live in `martafrica-core`; these
//! are the pieces of per-visitor state kept in the session.

pub mod session;

pub use session::{CurrentAdmin, CurrentCustomer, Flash, FlashKind, keys as session_keys};
