//! Wishlist entries and optimistic removal.
//!
//! Wishlists are owned by the MartAfrica API. The storefront keeps a local
//! copy for rendering and removes entries before the API confirms, restoring
//! the previous list if the delete fails:
//!
//! ```
//! # use martafrica_core::{Wishlist, WishlistEntryId};
//! # let mut wishlist = Wishlist::default();
//! # let delete_succeeded = false;
//! if let Some(pending) = wishlist.begin_remove(WishlistEntryId::new(4)) {
//!     if delete_succeeded {
//!         let _removed = pending.commit();
//!     } else {
//!         pending.rollback(&mut wishlist);
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::id::WishlistEntryId;
use super::product::Product;

/// One saved product. `id` is the entry id, not the product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub product: Product,
}

/// A visitor's wishlist as last fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    entries: Vec<WishlistEntry>,
}

impl Wishlist {
    #[must_use]
    pub const fn new(entries: Vec<WishlistEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: WishlistEntryId) -> Option<&WishlistEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove an entry locally, keeping a snapshot for rollback.
    ///
    /// Returns `None` when the entry is not present; the list is untouched.
    #[must_use = "the removal must be committed or rolled back"]
    pub fn begin_remove(&mut self, id: WishlistEntryId) -> Option<PendingRemoval> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let snapshot = self.entries.clone();
        let entry = self.entries.remove(index);
        Some(PendingRemoval { snapshot, entry })
    }
}

/// A local removal awaiting confirmation from the API.
#[derive(Debug)]
pub struct PendingRemoval {
    snapshot: Vec<WishlistEntry>,
    entry: WishlistEntry,
}

impl PendingRemoval {
    /// The entry that was removed.
    #[must_use]
    pub const fn entry(&self) -> &WishlistEntry {
        &self.entry
    }

    /// Accept the removal, returning the removed entry.
    #[must_use]
    pub fn commit(self) -> WishlistEntry {
        self.entry
    }

    /// Restore the wishlist to exactly its state before the removal.
    pub fn rollback(self, wishlist: &mut Wishlist) {
        wishlist.entries = self.snapshot;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wishlist() -> Wishlist {
        let json = r#"[
            {"id": 10, "product": {"id": 1, "name": "Kente", "price": "25.00", "primary_image": "k.jpg"}},
            {"id": 11, "product": {"id": 2, "name": "Shea", "price": "8.00", "primary_image": null}},
            {"id": 12, "product": {"id": 3, "name": "Basket", "price": 14}}
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_begin_remove_applies_locally() {
        let mut list = wishlist();
        let pending = list.begin_remove(WishlistEntryId::new(11)).unwrap();
        assert_eq!(pending.entry().product.name, "Shea");
        assert_eq!(list.entries().len(), 2);
        assert!(list.get(WishlistEntryId::new(11)).is_none());

        let removed = pending.commit();
        assert_eq!(removed.id, WishlistEntryId::new(11));
        assert_eq!(list.entries().len(), 2);
    }

    #[test]
    fn test_rollback_restores_order() {
        let original = wishlist();
        let mut list = original.clone();
        let pending = list.begin_remove(WishlistEntryId::new(10)).unwrap();
        pending.rollback(&mut list);
        assert_eq!(list, original);
    }

    #[test]
    fn test_begin_remove_missing_entry() {
        let mut list = wishlist();
        assert!(list.begin_remove(WishlistEntryId::new(99)).is_none());
        assert_eq!(list, wishlist());
    }
}
