//! # Cart
//!
//! The cart state machine: validation, storage delegation, pricing, and
//! observer notification for one shopping session.
//!
//! ## Operation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Every Public Operation                              │
//! │                                                                         │
//! │  caller ──► start timer                                                 │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           validate input ── invalid ──► on_error(op, err, elapsed)     │
//! │                │                              │                         │
//! │                ▼                              ▼                         │
//! │           CartStore read/mutate          error returned UNCHANGED       │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           PriceCatalog lookup (Total only)                              │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           stop timer ──► on_<success>(payload, elapsed)                 │
//! │                │                                                        │
//! │                ▼                                                        │
//! │           result returned to caller                                     │
//! │                                                                         │
//! │  The wrapper is identical across AddItem/RemoveItem/Total/Items and    │
//! │  never swallows or alters the original error.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Note
//! A cart is a synchronous, call-and-return value. The item mapping is not
//! internally synchronized; one cart instance assumes single-threaded
//! access (wrap it yourself if you need sharing). Only the observer list
//! carries a lock. For remote-backed carts the read-modify-write sequence
//! is not atomic against concurrent writers to the same cart id.

use std::sync::Arc;
use std::time::Instant;

use crate::catalog::PriceCatalog;
use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::observer::{CartObserver, CartOperation, ObserverRegistry};
use crate::store::{CartItems, CartStore};

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart composed over a storage strategy and a price catalog.
///
/// One concrete type, no subclassing: the backend is a [`CartStore`] value
/// and the pricing source a shared [`PriceCatalog`], both injected at
/// construction.
///
/// ## Usage
/// ```rust
/// use std::sync::Arc;
/// use tally_core::cart::Cart;
/// use tally_core::catalog::StaticCatalog;
/// use tally_core::store::MemoryCartStore;
///
/// let mut cart = Cart::new(
///     "session-1",
///     Box::new(MemoryCartStore::new()),
///     Arc::new(StaticCatalog::with_defaults()),
/// );
///
/// cart.add_item("Apple", 2)?;
/// cart.add_item(" apple ", 3)?; // same product, accumulates
///
/// assert_eq!(cart.items()?.get("apple"), Some(&5));
/// assert_eq!(cart.total()?.cents(), 250); // 5 × $0.50
/// # Ok::<(), tally_core::error::CartError>(())
/// ```
pub struct Cart {
    cart_id: String,
    store: Box<dyn CartStore>,
    catalog: Arc<dyn PriceCatalog>,
    observers: ObserverRegistry,
}

impl Cart {
    /// Creates a cart over the given store and catalog.
    ///
    /// Both collaborators are owned values; there is no unconfigured or
    /// half-constructed cart state.
    pub fn new(
        cart_id: impl Into<String>,
        store: Box<dyn CartStore>,
        catalog: Arc<dyn PriceCatalog>,
    ) -> Self {
        Cart {
            cart_id: cart_id.into(),
            store,
            catalog,
            observers: ObserverRegistry::new(),
        }
    }

    /// The identifier of this cart (part of the storage key for
    /// remote-backed carts).
    pub fn cart_id(&self) -> &str {
        &self.cart_id
    }

    // -------------------------------------------------------------------------
    // Observer subscription
    // -------------------------------------------------------------------------

    /// Subscribes an observer; subscribing the same observer twice is a
    /// no-op (it receives each event exactly once).
    pub fn subscribe(&self, observer: Arc<dyn CartObserver>) -> bool {
        self.observers.subscribe(observer)
    }

    /// Unsubscribes an observer; removing an absent observer is a no-op.
    pub fn unsubscribe(&self, observer: &Arc<dyn CartObserver>) -> bool {
        self.observers.unsubscribe(observer)
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Adds `quantity` of a product, accumulating with any existing
    /// quantity. Returns the new accumulated quantity.
    ///
    /// ## Errors
    /// - `InvalidArgument` for an empty/whitespace id, a non-positive
    ///   quantity, or a product the catalog does not know
    /// - `Storage` if the backend read or write fails
    ///
    /// Validation happens before any mutation: an invalid call never
    /// leaves a partial write.
    pub fn add_item(&mut self, product_id: &str, quantity: i64) -> CartResult<i64> {
        let started = Instant::now();
        match self.add_item_inner(product_id, quantity) {
            Ok((id, new_quantity)) => {
                let elapsed = started.elapsed();
                self.observers
                    .notify(|o| o.on_item_added(&id, new_quantity, elapsed));
                Ok(new_quantity)
            }
            Err(err) => {
                let elapsed = started.elapsed();
                self.observers
                    .notify(|o| o.on_error(CartOperation::AddItem, &err, elapsed));
                Err(err)
            }
        }
    }

    /// Removes a product entirely. Removing a product that is not in the
    /// cart succeeds silently.
    ///
    /// ## Errors
    /// - `InvalidArgument` for an empty/whitespace id
    /// - `Storage` if the backend read or write fails
    pub fn remove_item(&mut self, product_id: &str) -> CartResult<()> {
        let started = Instant::now();
        match self.remove_item_inner(product_id) {
            Ok(id) => {
                let elapsed = started.elapsed();
                self.observers.notify(|o| o.on_item_removed(&id, elapsed));
                Ok(())
            }
            Err(err) => {
                let elapsed = started.elapsed();
                self.observers
                    .notify(|o| o.on_error(CartOperation::RemoveItem, &err, elapsed));
                Err(err)
            }
        }
    }

    /// Computes the cart total: Σ price × quantity over all entries.
    /// An empty cart totals exactly zero. Never mutates state.
    ///
    /// ## Errors
    /// - `NotFound` if a stored product has since left the catalog
    /// - `Storage` if the backend read fails
    pub fn total(&mut self) -> CartResult<Money> {
        let started = Instant::now();
        match self.total_inner() {
            Ok(total) => {
                let elapsed = started.elapsed();
                self.observers.notify(|o| o.on_total(total, elapsed));
                Ok(total)
            }
            Err(err) => {
                let elapsed = started.elapsed();
                self.observers
                    .notify(|o| o.on_error(CartOperation::Total, &err, elapsed));
                Err(err)
            }
        }
    }

    /// Returns an independent snapshot of the item mapping. Mutating the
    /// returned map never affects cart state, and vice versa.
    ///
    /// ## Errors
    /// - `Storage` if the backend read fails
    pub fn items(&mut self) -> CartResult<CartItems> {
        let started = Instant::now();
        match self.items_inner() {
            Ok(items) => {
                let elapsed = started.elapsed();
                self.observers.notify(|o| o.on_items(items.len(), elapsed));
                Ok(items)
            }
            Err(err) => {
                let elapsed = started.elapsed();
                self.observers
                    .notify(|o| o.on_error(CartOperation::Items, &err, elapsed));
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Core logic (unwrapped)
    // -------------------------------------------------------------------------

    fn add_item_inner(&mut self, product_id: &str, quantity: i64) -> CartResult<(String, i64)> {
        crate::validation::validate_quantity(quantity)?;
        let id = crate::validation::normalize_product_id(product_id)?;

        if !self.catalog.exists(&id)? {
            return Err(CartError::invalid_argument(
                "productId",
                format!("unknown product '{id}'"),
            ));
        }

        // Read-modify-write; not atomic against concurrent writers to the
        // same cart id on a remote backend
        let mut items = self.store.get()?;
        let entry = items.entry(id.clone()).or_insert(0);
        *entry += quantity;
        let new_quantity = *entry;
        self.store.set(&items)?;

        Ok((id, new_quantity))
    }

    fn remove_item_inner(&mut self, product_id: &str) -> CartResult<String> {
        let id = crate::validation::normalize_product_id(product_id)?;

        let mut items = self.store.get()?;
        if items.remove(&id).is_some() {
            // An empty map deletes the record on remote backends
            self.store.set(&items)?;
        }

        Ok(id)
    }

    fn total_inner(&mut self) -> CartResult<Money> {
        let items = self.store.get()?;

        let mut total = Money::zero();
        for (id, quantity) in &items {
            total += self.catalog.price(id)?.multiply_quantity(*quantity);
        }

        Ok(total)
    }

    fn items_inner(&mut self) -> CartResult<CartItems> {
        // The store already hands back an owned copy
        self.store.get()
    }
}

impl std::fmt::Debug for Cart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("cart_id", &self.cart_id)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::error::ObserverError;
    use crate::store::MemoryCartStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn test_cart() -> Cart {
        Cart::new(
            "test-cart",
            Box::new(MemoryCartStore::new()),
            Arc::new(StaticCatalog::with_defaults()),
        )
    }

    #[test]
    fn test_add_item_accumulates() {
        let mut cart = test_cart();

        assert_eq!(cart.add_item("apple", 2).unwrap(), 2);
        assert_eq!(cart.add_item("apple", 3).unwrap(), 5);

        let items = cart.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.get("apple"), Some(&5));
    }

    #[test]
    fn test_add_item_normalizes_id() {
        let mut cart = test_cart();

        cart.add_item("Apple", 1).unwrap();
        cart.add_item(" apple ", 1).unwrap();
        cart.add_item("APPLE", 1).unwrap();

        let items = cart.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.get("apple"), Some(&3));
    }

    #[test]
    fn test_add_item_rejects_bad_input() {
        let mut cart = test_cart();

        assert!(cart.add_item("", 1).unwrap_err().is_invalid_argument());
        assert!(cart.add_item("   ", 1).unwrap_err().is_invalid_argument());
        assert!(cart.add_item("apple", 0).unwrap_err().is_invalid_argument());
        assert!(cart.add_item("apple", -2).unwrap_err().is_invalid_argument());

        // No mutation happened
        assert!(cart.items().unwrap().is_empty());
    }

    #[test]
    fn test_add_item_rejects_unknown_product() {
        let mut cart = test_cart();

        let err = cart.add_item("dragonfruit", 1).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(cart.items().unwrap().is_empty());
    }

    #[test]
    fn test_remove_item_absent_is_noop() {
        let mut cart = test_cart();
        cart.add_item("apple", 2).unwrap();

        cart.remove_item("banana").unwrap();

        let items = cart.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.get("apple"), Some(&2));
    }

    #[test]
    fn test_remove_item_deletes_entry() {
        let mut cart = test_cart();
        cart.add_item("apple", 2).unwrap();
        cart.add_item("bread", 1).unwrap();

        cart.remove_item(" APPLE ").unwrap();

        let items = cart.items().unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items.contains_key("apple"));
    }

    #[test]
    fn test_remove_item_rejects_blank_id() {
        let mut cart = test_cart();
        assert!(cart.remove_item("  ").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_total_empty_cart_is_zero() {
        let mut cart = test_cart();
        assert_eq!(cart.total().unwrap(), Money::zero());
    }

    #[test]
    fn test_total_is_exact() {
        let mut cart = test_cart();

        // apple $0.50×2 + banana $0.30×3 + bread $2.50×1 = $4.40 exactly
        cart.add_item("apple", 2).unwrap();
        cart.add_item("banana", 3).unwrap();
        cart.add_item("bread", 1).unwrap();

        assert_eq!(cart.total().unwrap().cents(), 440);
    }

    #[test]
    fn test_total_does_not_mutate() {
        let mut cart = test_cart();
        cart.add_item("milk", 2).unwrap();

        let before = cart.items().unwrap();
        cart.total().unwrap();
        assert_eq!(cart.items().unwrap(), before);
    }

    #[test]
    fn test_total_propagates_catalog_miss() {
        /// Catalog whose entries can be removed mid-test.
        struct ShrinkingCatalog {
            prices: Mutex<HashMap<String, Money>>,
        }

        impl PriceCatalog for ShrinkingCatalog {
            fn price(&self, product_id: &str) -> CartResult<Money> {
                let key = crate::validation::normalize_product_id(product_id)?;
                self.prices
                    .lock()
                    .unwrap()
                    .get(&key)
                    .copied()
                    .ok_or(CartError::NotFound(key))
            }

            fn exists(&self, product_id: &str) -> CartResult<bool> {
                let key = crate::validation::normalize_product_id(product_id)?;
                Ok(self.prices.lock().unwrap().contains_key(&key))
            }

            fn all(&self) -> CartResult<HashMap<String, Money>> {
                Ok(self.prices.lock().unwrap().clone())
            }
        }

        let catalog = Arc::new(ShrinkingCatalog {
            prices: Mutex::new(HashMap::from([(
                "apple".to_string(),
                Money::from_cents(50),
            )])),
        });

        let mut cart = Cart::new(
            "shrinking",
            Box::new(MemoryCartStore::new()),
            catalog.clone(),
        );
        cart.add_item("apple", 1).unwrap();

        // Product leaves the catalog after add-time
        catalog.prices.lock().unwrap().remove("apple");

        assert!(cart.total().unwrap_err().is_not_found());
    }

    #[test]
    fn test_items_is_a_defensive_copy() {
        let mut cart = test_cart();
        cart.add_item("apple", 2).unwrap();

        let mut snapshot = cart.items().unwrap();
        snapshot.insert("banana".to_string(), 99);
        snapshot.remove("apple");

        let fresh = cart.items().unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh.get("apple"), Some(&2));
    }

    // -------------------------------------------------------------------------
    // Observer wiring
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingObserver {
        added: AtomicUsize,
        removed: AtomicUsize,
        totals: AtomicUsize,
        items: AtomicUsize,
        errors: AtomicUsize,
    }

    impl CartObserver for RecordingObserver {
        fn on_item_added(
            &self,
            _product_id: &str,
            _quantity: i64,
            _elapsed: Duration,
        ) -> Result<(), ObserverError> {
            self.added.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_item_removed(
            &self,
            _product_id: &str,
            _elapsed: Duration,
        ) -> Result<(), ObserverError> {
            self.removed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_total(&self, _total: Money, _elapsed: Duration) -> Result<(), ObserverError> {
            self.totals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_items(&self, _item_count: usize, _elapsed: Duration) -> Result<(), ObserverError> {
            self.items.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_error(
            &self,
            _operation: CartOperation,
            _error: &CartError,
            _elapsed: Duration,
        ) -> Result<(), ObserverError> {
            self.errors.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails on every callback it implements.
    struct ExplodingObserver;

    impl CartObserver for ExplodingObserver {
        fn on_item_added(
            &self,
            _product_id: &str,
            _quantity: i64,
            _elapsed: Duration,
        ) -> Result<(), ObserverError> {
            Err(ObserverError::new("boom"))
        }

        fn on_item_removed(
            &self,
            _product_id: &str,
            _elapsed: Duration,
        ) -> Result<(), ObserverError> {
            Err(ObserverError::new("boom"))
        }

        fn on_total(&self, _total: Money, _elapsed: Duration) -> Result<(), ObserverError> {
            Err(ObserverError::new("boom"))
        }

        fn on_items(&self, _item_count: usize, _elapsed: Duration) -> Result<(), ObserverError> {
            Err(ObserverError::new("boom"))
        }

        fn on_error(
            &self,
            _operation: CartOperation,
            _error: &CartError,
            _elapsed: Duration,
        ) -> Result<(), ObserverError> {
            Err(ObserverError::new("boom"))
        }
    }

    #[test]
    fn test_success_notifications_fire() {
        let mut cart = test_cart();
        let recorder = Arc::new(RecordingObserver::default());
        cart.subscribe(recorder.clone() as Arc<dyn CartObserver>);

        cart.add_item("apple", 1).unwrap();
        cart.remove_item("apple").unwrap();
        cart.total().unwrap();
        cart.items().unwrap();

        assert_eq!(recorder.added.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.removed.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.totals.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.items.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_notification_carries_operation() {
        let mut cart = test_cart();
        let recorder = Arc::new(RecordingObserver::default());
        cart.subscribe(recorder.clone() as Arc<dyn CartObserver>);

        assert!(cart.add_item("", 1).is_err());
        assert_eq!(recorder.errors.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.added.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exploding_observer_never_breaks_operations() {
        let mut cart = test_cart();
        let recorder = Arc::new(RecordingObserver::default());
        cart.subscribe(Arc::new(ExplodingObserver));
        cart.subscribe(recorder.clone() as Arc<dyn CartObserver>);

        assert_eq!(cart.add_item("apple", 2).unwrap(), 2);
        cart.remove_item("banana").unwrap();
        assert_eq!(cart.total().unwrap().cents(), 100);
        assert_eq!(cart.items().unwrap().len(), 1);

        // The well-behaved observer still saw everything
        assert_eq!(recorder.added.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.removed.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.totals.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.items.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_twice_notifies_once() {
        let mut cart = test_cart();
        let recorder = Arc::new(RecordingObserver::default());
        let as_dyn: Arc<dyn CartObserver> = recorder.clone();

        assert!(cart.subscribe(Arc::clone(&as_dyn)));
        assert!(!cart.subscribe(Arc::clone(&as_dyn)));
        assert_eq!(cart.observer_count(), 1);

        cart.add_item("apple", 1).unwrap();
        assert_eq!(recorder.added.load(Ordering::SeqCst), 1);

        assert!(cart.unsubscribe(&as_dyn));
        cart.add_item("apple", 1).unwrap();
        assert_eq!(recorder.added.load(Ordering::SeqCst), 1);
    }
}
