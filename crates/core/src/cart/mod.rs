//! Client-local shopping cart.
//!
//! The cart lives entirely with the visitor: the MartAfrica API has no cart
//! endpoint, and the only server-side step is the order submission that
//! empties it.
//!
//! - [`Cart`] is the pure line collection and its transition rules.
//! - [`CartStore`] owns a cart plus a [`CartStorage`] backend and re-persists
//!   after every mutation.
//! - [`record`] is the persisted JSON format.
//!
//! # Invariants
//!
//! - At most one line per product id.
//! - Every line has `quantity >= 1`; a line reaching zero is removed.
//! - Lines keep insertion order.

pub mod record;
mod store;

pub use store::{CART_RECORD_KEY, CartStorage, CartStore, MemoryStorage, StorageError};

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// The product fields a cart line needs for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub primary_image: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            primary_image: product.primary_image_src().map(str::to_owned),
        }
    }
}

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub primary_image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    fn new(product: ProductSnapshot) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            primary_image: product.primary_image,
            quantity: 1,
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from arbitrary lines, enforcing the invariants.
    ///
    /// Lines with quantity zero are dropped. A repeated product id is merged
    /// into the first line for that id.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match cart.line_mut(line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Increment the product's line, or append a new line with quantity 1.
    pub fn add(&mut self, product: ProductSnapshot) {
        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::new(product)),
        }
    }

    /// Remove the product's line. Absent ids are a no-op.
    pub fn remove(&mut self, id: ProductId) {
        self.lines.retain(|l| l.id != id);
    }

    /// Set the product's quantity; zero or negative removes the line.
    ///
    /// Does nothing when the product is not in the cart.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.line_mut(id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `price * quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}
