//! Session-backed cart persistence.
//!
//! The visitor's session record plays the role of durable local storage: the
//! serialized cart lives under [`CART_RECORD_KEY`] as a JSON string. Each
//! request restores a [`CartStore`] from it, mutates, and commits the latest
//! record back.
//!
//! Reads and writes never fail the request. A record that cannot be read or
//! parsed restores as an empty cart, and a record that cannot be written is
//! logged while the response still renders the in-memory cart.

use martafrica_core::cart::CART_RECORD_KEY;
use martafrica_core::{Cart, CartStore, MemoryStorage};
use tower_sessions::Session;

/// Largest cart record the session will hold.
pub const CART_RECORD_QUOTA: usize = 16 * 1024;

/// A visitor's cart for the duration of one request.
pub struct SessionCart {
    session: Session,
    store: CartStore<MemoryStorage>,
}

impl SessionCart {
    /// Restore the cart from the session.
    pub async fn load(session: Session) -> Self {
        let record = match session.get::<String>(CART_RECORD_KEY).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cart from session, starting empty");
                None
            }
        };
        let storage = MemoryStorage::with_record(record).with_quota(CART_RECORD_QUOTA);
        Self {
            session,
            store: CartStore::restore(storage),
        }
    }

    /// The store, for mutations.
    pub fn store(&mut self) -> &mut CartStore<MemoryStorage> {
        &mut self.store
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Write the latest record back to the session and return the cart.
    ///
    /// Does nothing if no mutation was persisted. Write failures are logged.
    pub async fn commit(self) -> Cart {
        let (cart, storage) = self.store.into_parts();
        if storage.is_dirty()
            && let Some(record) = storage.record()
            && let Err(e) = self.session.insert(CART_RECORD_KEY, record).await
        {
            tracing::warn!(error = %e, "Failed to persist cart to session");
        }
        cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use martafrica_core::{Price, ProductId, ProductSnapshot};
    use tower_sessions::MemoryStore;

    use super::*;

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: i64, price: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Price::parse_lenient(price),
            primary_image: None,
        }
    }

    #[tokio::test]
    async fn test_commit_then_load_restores_cart() {
        let session = new_session();

        let mut cart = SessionCart::load(session.clone()).await;
        cart.store().add_item(product(1, "10.00"));
        cart.store().add_item(product(1, "10.00"));
        cart.store().add_item(product(2, "1.50"));
        let committed = cart.commit().await;

        let restored = SessionCart::load(session).await;
        assert_eq!(restored.cart(), &committed);
        assert_eq!(restored.cart().total_items(), 3);
        assert_eq!(restored.cart().total_price(), Price::from_cents(2150));
    }

    #[tokio::test]
    async fn test_garbage_record_loads_empty() {
        let session = new_session();
        session.insert(CART_RECORD_KEY, "not json").await.unwrap();

        let cart = SessionCart::load(session).await;
        assert!(cart.cart().is_empty());
    }

    #[tokio::test]
    async fn test_wrongly_typed_record_loads_empty() {
        let session = new_session();
        session.insert(CART_RECORD_KEY, 42).await.unwrap();

        let cart = SessionCart::load(session).await;
        assert!(cart.cart().is_empty());
    }

    #[tokio::test]
    async fn test_read_only_request_does_not_write() {
        let session = new_session();
        let cart = SessionCart::load(session.clone()).await;
        cart.commit().await;
        assert!(session.get::<String>(CART_RECORD_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_cart_keeps_last_good_record() {
        let session = new_session();

        let mut cart = SessionCart::load(session.clone()).await;
        cart.store().add_item(product(1, "1"));
        cart.commit().await;
        let good = session.get::<String>(CART_RECORD_KEY).await.unwrap();

        let mut cart = SessionCart::load(session.clone()).await;
        cart.store().add_item(ProductSnapshot {
            name: "x".repeat(CART_RECORD_QUOTA),
            ..product(2, "1")
        });
        let in_memory = cart.commit().await;

        assert_eq!(in_memory.lines().len(), 2);
        assert_eq!(session.get::<String>(CART_RECORD_KEY).await.unwrap(), good);
    }
}
