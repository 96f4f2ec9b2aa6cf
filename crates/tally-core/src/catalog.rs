//! # Price Catalog
//!
//! The lookup service mapping product identifiers to prices.
//!
//! ## Role in the System
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Lookup Flow                                 │
//! │                                                                         │
//! │  Cart.add_item("Apple", 2)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize("Apple") → "apple"                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog.exists("apple")? ── false ──► InvalidArgument (no mutation)   │
//! │       │ true                                                            │
//! │       ▼                                                                 │
//! │  store mutation proceeds                                               │
//! │                                                                         │
//! │  Cart.total() ──► catalog.price(id) per entry ──► Σ price × quantity   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations: [`StaticCatalog`] here (fixed in-process map), and a
//! Redis-backed catalog in the `tally-redis` crate.

use std::collections::HashMap;

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::validation::normalize_product_id;

// =============================================================================
// PriceCatalog Trait
// =============================================================================

/// Price lookup capability required by the cart.
///
/// ## Contract
/// - Lookups are case-insensitive: implementations normalize the id
///   (trim + lowercase) before resolving it
/// - `price` on an unknown id is `CartError::NotFound`, never a default
/// - `all` returns a defensive copy; callers may mutate it freely
pub trait PriceCatalog: Send + Sync {
    /// Returns the price for a product, or NotFound.
    fn price(&self, product_id: &str) -> CartResult<Money>;

    /// Checks whether a product exists in the catalog.
    fn exists(&self, product_id: &str) -> CartResult<bool>;

    /// Returns a snapshot of every product id → price entry.
    fn all(&self) -> CartResult<HashMap<String, Money>>;
}

// =============================================================================
// StaticCatalog
// =============================================================================

/// A fixed, in-process price catalog.
///
/// Entries are normalized at construction, so lookups with any casing or
/// surrounding whitespace resolve to the same product.
///
/// ## Usage
/// ```rust
/// use tally_core::catalog::{PriceCatalog, StaticCatalog};
/// use tally_core::money::Money;
///
/// let catalog = StaticCatalog::new([("Apple", Money::from_cents(50))]);
/// assert_eq!(catalog.price(" APPLE ").unwrap().cents(), 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    prices: HashMap<String, Money>,
}

impl StaticCatalog {
    /// Creates a catalog from id → price entries.
    ///
    /// Ids that normalize to the empty string are skipped rather than
    /// stored under an unreachable key.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Money)>,
        S: AsRef<str>,
    {
        let prices = entries
            .into_iter()
            .filter_map(|(id, price)| {
                normalize_product_id(id.as_ref())
                    .ok()
                    .map(|key| (key, price))
            })
            .collect();
        StaticCatalog { prices }
    }

    /// Creates a catalog seeded with the default demo products.
    ///
    /// ## Products
    /// | id     | price |
    /// |--------|-------|
    /// | apple  | $0.50 |
    /// | banana | $0.30 |
    /// | bread  | $2.50 |
    /// | milk   | $3.25 |
    pub fn with_defaults() -> Self {
        StaticCatalog::new([
            ("apple", Money::from_cents(50)),
            ("banana", Money::from_cents(30)),
            ("bread", Money::from_cents(250)),
            ("milk", Money::from_cents(325)),
        ])
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// True when the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceCatalog for StaticCatalog {
    fn price(&self, product_id: &str) -> CartResult<Money> {
        let key = normalize_product_id(product_id)?;
        self.prices
            .get(&key)
            .copied()
            .ok_or(CartError::NotFound(key))
    }

    fn exists(&self, product_id: &str) -> CartResult<bool> {
        let key = normalize_product_id(product_id)?;
        Ok(self.prices.contains_key(&key))
    }

    fn all(&self) -> CartResult<HashMap<String, Money>> {
        // Clone is the defensive copy: callers never see our map
        Ok(self.prices.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
