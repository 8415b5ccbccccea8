//! In-memory shopping cart.
//!
//! A cart entry is a product occupying one slot; adding the same product
//! twice takes two slots. The total is computed from the entries on every
//! read and never stored.

use std::sync::Arc;

use ng_store_core::{Price, Product};
use serde::Serialize;
use tokio::sync::watch;

/// Shared cart store.
///
/// Clones share the same entries. Writers replace or extend the sequence
/// in one step, so readers always see a complete sequence.
#[derive(Debug, Clone)]
pub struct CartStore {
    entries: Arc<watch::Sender<Vec<Arc<Product>>>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            entries: Arc::new(tx),
        }
    }

    /// Current entries in insertion order.
    #[must_use]
    pub fn cart(&self) -> Vec<Arc<Product>> {
        self.entries.borrow().clone()
    }

    /// Append `product` to the end of the cart.
    ///
    /// The store keeps the caller's instance; nothing is copied.
    pub fn add_to_cart(&self, product: impl Into<Arc<Product>>) {
        let product = product.into();
        tracing::debug!(slug = %product.slug, price = %product.price, "Adding product to cart");
        self.entries.send_modify(|entries| entries.push(product));
    }

    /// Sum of the entry prices; zero when empty.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries.borrow().iter().map(|p| p.price).sum()
    }

    /// Number of entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Replace every entry at once.
    pub fn set(&self, entries: Vec<Arc<Product>>) {
        self.entries.send_replace(entries);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.set(Vec::new());
    }

    /// Watch the entries; the receiver is notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Arc<Product>>> {
        self.entries.subscribe()
    }

    /// Entries and total read together.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_entries(&self.entries.borrow())
    }
}

/// A point-in-time view of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub entries: Vec<Product>,
    pub count: usize,
    pub total: Price,
}

impl CartSnapshot {
    /// Build a snapshot from cart entries.
    #[must_use]
    pub fn from_entries(entries: &[Arc<Product>]) -> Self {
        Self {
            entries: entries.iter().map(|p| Product::clone(p)).collect(),
            count: entries.len(),
            total: entries.iter().map(|p| p.price).sum(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::fake_product;

    fn priced(units: u32) -> Arc<Product> {
        Arc::new(fake_product().price(Price::from_units(units)).build())
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartStore::new();

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_total_follows_adds() {
        let cart = CartStore::new();

        cart.add_to_cart(priced(100));
        assert_eq!(cart.total(), Price::from_units(100));

        cart.add_to_cart(priced(200));
        assert_eq!(cart.total(), Price::from_units(300));
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_zero_price_product() {
        let cart = CartStore::new();
        cart.add_to_cart(priced(0));

        assert_eq!(cart.count(), 1);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_same_instance_twice_takes_two_slots() {
        let cart = CartStore::new();
        let product = priced(50);

        cart.add_to_cart(product.clone());
        cart.add_to_cart(product.clone());

        let entries = cart.cart();
        assert_eq!(entries.len(), 2);
        assert!(Arc::ptr_eq(&entries[0], &product));
        assert!(Arc::ptr_eq(&entries[1], &product));
        assert_eq!(cart.total(), Price::from_units(100));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let cart = CartStore::new();
        let slugs = ["c", "a", "b"];
        for slug in slugs {
            cart.add_to_cart(fake_product().slug(slug).build());
        }

        let order: Vec<_> = cart.cart().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(order, slugs);
    }

    #[test]
    fn test_set_replaces_entries() {
        let cart = CartStore::new();
        cart.add_to_cart(priced(10));

        cart.set(vec![priced(7), priced(8)]);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Price::from_units(15));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);

        cart.add_to_cart(priced(3));
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let cart = CartStore::new();
        let header = cart.clone();

        cart.add_to_cart(priced(42));

        assert_eq!(header.count(), 1);
        assert_eq!(header.total(), Price::from_units(42));
    }

    #[test]
    fn test_snapshot() {
        let cart = CartStore::new();
        cart.add_to_cart(priced(1));
        cart.add_to_cart(priced(2));

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.total, Price::from_units(3));
        assert_eq!(snapshot.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_change() {
        let cart = CartStore::new();
        let mut rx = cart.subscribe();

        cart.add_to_cart(priced(5));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        cart.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u32),
        Clear,
    }

    fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![
                9 => (0..100_000u32).prop_map(Op::Add),
                1 => Just(Op::Clear),
            ],
            0..64,
        )
    }

    proptest! {
        /// Total and count always match the entries added since the last reset.
        #[test]
        fn prop_total_matches_entries(ops in arb_ops()) {
            let cart = CartStore::new();
            let mut expected_cents = 0u32;
            let mut expected_count = 0usize;

            for op in ops {
                match op {
                    Op::Add(cents) => {
                        cart.add_to_cart(fake_product().price(Price::from_cents(cents)).build());
                        expected_cents += cents;
                        expected_count += 1;
                    }
                    Op::Clear => {
                        cart.set(Vec::new());
                        expected_cents = 0;
                        expected_count = 0;
                    }
                }

                prop_assert_eq!(cart.count(), expected_count);
                prop_assert_eq!(cart.total(), Price::from_cents(expected_cents));
            }
        }
    }
}
