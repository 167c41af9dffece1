//! Domain types for MartAfrica.
//!
//! Type-safe wrappers for the entities the storefront reads from the
//! MartAfrica API.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod wishlist;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{Category, CategoryRef, Product, ProductImage};
pub use wishlist::{PendingRemoval, Wishlist, WishlistEntry};
