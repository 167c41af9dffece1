//! Cart store: the single mutation surface for a visitor's cart.

use thiserror::Error;

use super::{Cart, ProductSnapshot, record};
use crate::types::{Price, ProductId};

/// Key under which the cart record is persisted.
pub const CART_RECORD_KEY: &str = "cart";

/// Errors raised by a [`CartStorage`] backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The record does not fit in the backend.
    #[error("cart record of {size} bytes exceeds the {limit} byte quota")]
    QuotaExceeded { size: usize, limit: usize },

    /// The backend could not be read or written.
    #[error("cart storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable keyed-record storage for a serialized cart.
///
/// Implementations are synchronous; the store calls `save` after every
/// mutation.
pub trait CartStorage {
    /// Read the stored record, `None` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record cannot be written.
    fn save(&mut self, record: &str) -> Result<(), StorageError>;
}

/// In-process record slot with an optional byte quota.
///
/// Tracks whether a save happened since construction so callers backed by a
/// slower store can flush only when needed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    record: Option<String>,
    quota: Option<usize>,
    dirty: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing record.
    #[must_use]
    pub fn with_record(record: Option<String>) -> Self {
        Self {
            record,
            ..Self::default()
        }
    }

    /// Reject saves larger than `bytes`.
    #[must_use]
    pub const fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// The current record.
    #[must_use]
    pub fn record(&self) -> Option<&str> {
        self.record.as_deref()
    }

    /// Whether a save succeeded since construction.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.record.clone())
    }

    fn save(&mut self, record: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota
            && record.len() > limit
        {
            return Err(StorageError::QuotaExceeded {
                size: record.len(),
                limit,
            });
        }
        self.record = Some(record.to_owned());
        self.dirty = true;
        Ok(())
    }
}

/// A cart bound to its storage backend.
///
/// Every operation is total: nothing here returns an error. Storage failures
/// are logged and the in-memory cart stays authoritative.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Restore the cart from `storage`.
    ///
    /// A missing, unreadable, or unparseable record yields an empty cart.
    pub fn restore(storage: S) -> Self {
        let cart = match storage.load() {
            Ok(Some(raw)) => record::decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unparseable cart record");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cart record, starting empty");
                Cart::new()
            }
        };
        Self { cart, storage }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store, returning the cart and its storage.
    pub fn into_parts(self) -> (Cart, S) {
        (self.cart, self.storage)
    }

    /// Increment the product's quantity, or add it with quantity 1.
    pub fn add_item(&mut self, product: ProductSnapshot) {
        self.cart.add(product);
        self.persist();
    }

    /// Remove the product's line; absent ids are a no-op.
    pub fn remove_item(&mut self, id: ProductId) {
        self.cart.remove(id);
        self.persist();
    }

    /// Set the product's quantity; `quantity <= 0` removes the line.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        self.cart.set_quantity(id, quantity);
        self.persist();
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist();
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    fn persist(&mut self) {
        let raw = match record::encode(&self.cart) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.save(&raw) {
            tracing::warn!(error = %e, lines = self.cart.lines().len(), "Failed to persist cart");
        }
    }
}
