//! # Redis Cart Store
//!
//! The remote `CartStore` variant: one JSON record per cart, addressed by
//! `cart:<cartId>`.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  cart:<id> Record Lifecycle                             │
//! │                                                                         │
//! │  first AddItem ────► SET cart:<id> {"apple":2}                         │
//! │  every mutation ───► SET cart:<id> <full map as JSON>                  │
//! │  map becomes empty ► DEL cart:<id>   (never an empty record!)          │
//! │  optional TTL ─────► EXPIRE cart:<id> <secs> after each write          │
//! │                                                                         │
//! │  GET on an absent key reads as an EMPTY map, not an error.             │
//! │  Deleting instead of storing {} prevents unbounded key growth from    │
//! │  abandoned empty carts.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//! Two store instances for the same cart id share the persisted state
//! (read-your-writes across instances). The cart's read-modify-write
//! sequence is NOT atomic against concurrent writers to the same id; see
//! DESIGN.md for why this stays unfixed.

use std::time::Duration;

use redis::Commands;
use tracing::debug;

use tally_core::{CartItems, CartResult, CartStore};

use crate::error::StoreResult;
use crate::keys::cart_key;

// =============================================================================
// RedisCartStore
// =============================================================================

/// Redis-backed persistence for one cart's item mapping.
///
/// Holds its own connection; carts are single-threaded values, so there
/// is no sharing to coordinate here.
///
/// ## Usage
/// ```rust,no_run
/// use std::time::Duration;
/// use tally_redis::RedisCartStore;
///
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let store = RedisCartStore::connect(&client, "session-42")?
///     .with_ttl(Duration::from_secs(3600));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RedisCartStore {
    conn: redis::Connection,
    key: String,
    ttl: Option<Duration>,
}

impl RedisCartStore {
    /// Opens a connection and binds it to the record of `cart_id`.
    pub fn connect(client: &redis::Client, cart_id: &str) -> StoreResult<Self> {
        let conn = client.get_connection()?;
        Ok(RedisCartStore {
            conn,
            key: cart_key(cart_id),
            ttl: None,
        })
    }

    /// Arms a time-to-live applied after every write.
    ///
    /// TTL is a data-retention mechanism for abandoned carts, not an
    /// operation timeout.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// The full Redis key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// (Re)arms expiration on the record right now.
    ///
    /// Returns `false` when the record does not currently exist (an empty
    /// cart has no key to expire).
    pub fn expire(&mut self, ttl: Duration) -> CartResult<bool> {
        let applied: bool = self
            .conn
            .expire(&self.key, ttl.as_secs() as i64)
            .map_err(crate::error::StoreError::from)?;
        Ok(applied)
    }

    /// Remaining time-to-live of the record.
    ///
    /// `None` when the key is absent or has no expiration armed.
    pub fn ttl(&mut self) -> CartResult<Option<Duration>> {
        // TTL replies -2 for a missing key and -1 for a key without expiry
        let secs: i64 = self
            .conn
            .ttl(&self.key)
            .map_err(crate::error::StoreError::from)?;
        if secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(secs as u64)))
        }
    }

    fn read(&mut self) -> StoreResult<CartItems> {
        let raw: Option<String> = self.conn.get(&self.key)?;
        match raw {
            // Absent key is an empty cart, not an error
            None => Ok(CartItems::new()),
            Some(json) => Ok(serde_json::from_str(&json)?),
        }
    }

    fn write(&mut self, items: &CartItems) -> StoreResult<()> {
        if items.is_empty() {
            debug!(key = %self.key, "cart emptied; deleting record");
            let _: () = self.conn.del(&self.key)?;
            return Ok(());
        }

        let json = serde_json::to_string(items)?;
        debug!(key = %self.key, entries = items.len(), "writing cart record");
        let _: () = self.conn.set(&self.key, json)?;

        if let Some(ttl) = self.ttl {
            let _: bool = self.conn.expire(&self.key, ttl.as_secs() as i64)?;
        }
        Ok(())
    }

    fn remove(&mut self) -> StoreResult<()> {
        debug!(key = %self.key, "deleting cart record");
        let _: () = self.conn.del(&self.key)?;
        Ok(())
    }
}

impl CartStore for RedisCartStore {
    fn get(&mut self) -> CartResult<CartItems> {
        Ok(self.read()?)
    }

    fn set(&mut self, items: &CartItems) -> CartResult<()> {
        Ok(self.write(items)?)
    }

    fn delete(&mut self) -> CartResult<()> {
        Ok(self.remove()?)
    }
}

impl std::fmt::Debug for RedisCartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCartStore")
            .field("key", &self.key)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// Connection-dependent behavior is covered by the ignored integration
// tests in tests/redis_backend.rs (requires a local Redis).
