//! # Redis Catalog
//!
//! The remote `PriceCatalog` variant: one JSON record per product,
//! enumerable by key-pattern scan.
//!
//! ## Record Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Key:   product:<productId>                                             │
//! │                                                                         │
//! │  Value (JSON, camelCase):                                               │
//! │  {                                                                      │
//! │    "id": "apple",                                                       │
//! │    "price": 50,              ← cents, exact integer arithmetic          │
//! │    "name": "Apple",          ← optional                                 │
//! │    "description": "...",     ← optional                                 │
//! │    "lastUpdated": "2026-08-23T10:15:00Z"                                │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutation operations (`add_or_update`, `remove`, `clear`,
//! `initialize_defaults`) serve catalog management and the factory's
//! bootstrap path; the cart itself only uses the `PriceCatalog` contract.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use redis::Commands;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tally_core::{
    validation::normalize_product_id, CartError, CartResult, Money, PriceCatalog,
};

use crate::error::{StoreError, StoreResult};
use crate::keys::{catalog_key, catalog_pattern, DEFAULT_CATALOG_PREFIX};

// =============================================================================
// Catalog Record
// =============================================================================

/// Persisted form of one catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Normalized product id (also the key suffix).
    pub id: String,
    /// Price in cents.
    pub price: i64,
    /// Display name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When this record was last written.
    pub last_updated: DateTime<Utc>,
}

impl CatalogRecord {
    /// The record's price as Money.
    pub fn price(&self) -> Money {
        Money::from_cents(self.price)
    }
}

// =============================================================================
// RedisCatalog
// =============================================================================

/// Redis-backed price catalog.
///
/// ## Thread Safety
/// `PriceCatalog` takes `&self`, so the connection sits behind a Mutex.
/// Lookups are short single commands; contention is negligible.
///
/// ## Usage
/// ```rust,no_run
/// use tally_core::PriceCatalog;
/// use tally_redis::RedisCatalog;
///
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let catalog = RedisCatalog::connect(&client)?;
/// catalog.initialize_defaults()?;
///
/// assert_eq!(catalog.price("Apple")?.cents(), 50);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RedisCatalog {
    conn: Mutex<redis::Connection>,
    prefix: String,
}

impl RedisCatalog {
    /// Opens a connection with the default `product` key prefix.
    pub fn connect(client: &redis::Client) -> StoreResult<Self> {
        RedisCatalog::connect_with_prefix(client, DEFAULT_CATALOG_PREFIX)
    }

    /// Opens a connection with a custom key prefix.
    pub fn connect_with_prefix(client: &redis::Client, prefix: &str) -> StoreResult<Self> {
        let conn = client.get_connection()?;
        Ok(RedisCatalog {
            conn: Mutex::new(conn),
            prefix: prefix.to_string(),
        })
    }

    /// The configured key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn lock(&self) -> CartResult<std::sync::MutexGuard<'_, redis::Connection>> {
        self.conn
            .lock()
            .map_err(|_| CartError::storage("catalog connection mutex poisoned"))
    }

    /// Reads the full record of one product.
    pub fn record(&self, product_id: &str) -> CartResult<CatalogRecord> {
        let id = normalize_product_id(product_id)?;
        let key = catalog_key(&self.prefix, &id);

        let raw: Option<String> = self.lock()?.get(&key).map_err(StoreError::from)?;
        match raw {
            None => Err(CartError::NotFound(id)),
            Some(json) => Ok(serde_json::from_str(&json).map_err(StoreError::from)?),
        }
    }

    /// Creates or replaces one product record, stamping `lastUpdated`.
    pub fn add_or_update(
        &self,
        product_id: &str,
        price: Money,
        name: Option<&str>,
        description: Option<&str>,
    ) -> CartResult<()> {
        let id = normalize_product_id(product_id)?;
        let key = catalog_key(&self.prefix, &id);

        let record = CatalogRecord {
            id,
            price: price.cents(),
            name: name.map(str::to_string),
            description: description.map(str::to_string),
            last_updated: Utc::now(),
        };
        let json = serde_json::to_string(&record).map_err(StoreError::from)?;

        debug!(key = %key, price = %price, "writing catalog record");
        let _: () = self.lock()?.set(&key, json).map_err(StoreError::from)?;
        Ok(())
    }

    /// Removes one product record. Returns `false` when it did not exist.
    pub fn remove(&self, product_id: &str) -> CartResult<bool> {
        let id = normalize_product_id(product_id)?;
        let key = catalog_key(&self.prefix, &id);

        let removed: i64 = self.lock()?.del(&key).map_err(StoreError::from)?;
        Ok(removed > 0)
    }

    /// Deletes every record under the prefix. Returns how many were
    /// removed.
    pub fn clear(&self) -> CartResult<usize> {
        let mut conn = self.lock()?;
        let keys = scan_keys(&mut conn, &catalog_pattern(&self.prefix))?;

        let mut removed = 0usize;
        for key in keys {
            let n: i64 = conn.del(&key).map_err(StoreError::from)?;
            removed += n as usize;
        }
        debug!(prefix = %self.prefix, removed, "cleared catalog");
        Ok(removed)
    }

    /// Seeds the default demo products (same table as
    /// `StaticCatalog::with_defaults`).
    pub fn initialize_defaults(&self) -> CartResult<()> {
        self.add_or_update("apple", Money::from_cents(50), Some("Apple"), None)?;
        self.add_or_update("banana", Money::from_cents(30), Some("Banana"), None)?;
        self.add_or_update("bread", Money::from_cents(250), Some("Bread"), None)?;
        self.add_or_update("milk", Money::from_cents(325), Some("Milk"), None)?;
        Ok(())
    }
}

impl PriceCatalog for RedisCatalog {
    fn price(&self, product_id: &str) -> CartResult<Money> {
        Ok(self.record(product_id)?.price())
    }

    fn exists(&self, product_id: &str) -> CartResult<bool> {
        let id = normalize_product_id(product_id)?;
        let key = catalog_key(&self.prefix, &id);
        let found: bool = self.lock()?.exists(&key).map_err(StoreError::from)?;
        Ok(found)
    }

    fn all(&self) -> CartResult<HashMap<String, Money>> {
        let mut conn = self.lock()?;
        let keys = scan_keys(&mut conn, &catalog_pattern(&self.prefix))?;

        let mut prices = HashMap::with_capacity(keys.len());
        for key in keys {
            // A record can vanish between SCAN and GET; skip, don't fail
            let raw: Option<String> = conn.get(&key).map_err(StoreError::from)?;
            if let Some(json) = raw {
                let record: CatalogRecord =
                    serde_json::from_str(&json).map_err(StoreError::from)?;
                let price = record.price();
                prices.insert(record.id, price);
            }
        }
        Ok(prices)
    }
}

impl std::fmt::Debug for RedisCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCatalog")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Collects every key matching a pattern with SCAN (cursor-based, so it
/// does not block the server the way KEYS would).
fn scan_keys(conn: &mut redis::Connection, pattern: &str) -> CartResult<Vec<String>> {
    let keys: Vec<String> = {
        let iter = conn
            .scan_match::<_, String>(pattern)
            .map_err(StoreError::from)?;
        iter.collect()
    };
    Ok(keys)
}

// =============================================================================
// Unit Tests
// =============================================================================
