//! # Cart Store
//!
//! The persistence strategy backing a cart's item mapping.
//!
//! ## Strategy Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     CartStore Strategy                                  │
//! │                                                                         │
//! │                 ┌─────────────────────────┐                             │
//! │                 │   Cart (one concrete    │                             │
//! │                 │   type, no subclassing) │                             │
//! │                 └───────────┬─────────────┘                             │
//! │                             │ Box<dyn CartStore>                        │
//! │              ┌──────────────┴──────────────┐                            │
//! │              ▼                             ▼                            │
//! │   ┌────────────────────┐       ┌─────────────────────┐                 │
//! │   │  MemoryCartStore   │       │   RedisCartStore    │                 │
//! │   │  (this module)     │       │   (tally-redis)     │                 │
//! │   │  HashMap in proc.  │       │   GET/SET/DEL on    │                 │
//! │   │  memory, no I/O    │       │   key "cart:<id>"   │                 │
//! │   └────────────────────┘       └─────────────────────┘                 │
//! │                                                                         │
//! │  The capability set is deliberately tiny: get / set / delete of one    │
//! │  cart's whole item mapping. All cart semantics live in Cart itself.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::CartResult;

// =============================================================================
// Cart Item Mapping
// =============================================================================

/// The cart's item mapping: normalized product id → quantity.
///
/// ## Invariants
/// - Every key maps to a quantity ≥ 1
/// - A removed item (or one reaching quantity 0) is deleted from the map,
///   never stored as zero
/// - Keys are normalized ids (trimmed, lowercased); no ordering guarantee
pub type CartItems = HashMap<String, i64>;

// =============================================================================
// CartStore Trait
// =============================================================================

/// Persistence capability backing one cart's item mapping.
///
/// ## Contract
/// - `get` on a record that was never written returns an empty map, not
///   an error
/// - `set` replaces the whole record; implementations backed by a remote
///   store delete the record instead of persisting an empty map
/// - Transport or serialization failures surface as `CartError::Storage`
pub trait CartStore: Send {
    /// Reads the current item mapping.
    fn get(&mut self) -> CartResult<CartItems>;

    /// Writes the full item mapping, replacing the previous record.
    fn set(&mut self, items: &CartItems) -> CartResult<()>;

    /// Deletes the record entirely.
    fn delete(&mut self) -> CartResult<()>;
}

// =============================================================================
// MemoryCartStore
// =============================================================================

/// Transient in-process store; lifetime bound to the owning cart.
///
/// Operations cannot fail: there is no transport and no serialization.
/// The design assumes single-threaded access per cart instance; callers
/// needing concurrent access to one cart supply external synchronization.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    items: CartItems,
}

impl MemoryCartStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        MemoryCartStore::default()
    }
}

impl CartStore for MemoryCartStore {
    fn get(&mut self) -> CartResult<CartItems> {
        Ok(self.items.clone())
    }

    fn set(&mut self, items: &CartItems) -> CartResult<()> {
        self.items = items.clone();
        Ok(())
    }

    fn delete(&mut self) -> CartResult<()> {
        self.items.clear();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_on_fresh_store_is_empty() {
        let mut store = MemoryCartStore::new();
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let mut store = MemoryCartStore::new();

        let mut items = CartItems::new();
        items.insert("apple".to_string(), 2);
        store.set(&items).unwrap();

        assert_eq!(store.get().unwrap(), items);
    }

    #[test]
    fn test_get_returns_a_copy() {
        let mut store = MemoryCartStore::new();

        let mut items = CartItems::new();
        items.insert("apple".to_string(), 2);
        store.set(&items).unwrap();

        let mut copy = store.get().unwrap();
        copy.insert("banana".to_string(), 9);

        assert_eq!(store.get().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_clears_everything() {
        let mut store = MemoryCartStore::new();

        let mut items = CartItems::new();
        items.insert("apple".to_string(), 2);
        store.set(&items).unwrap();

        store.delete().unwrap();
        assert!(store.get().unwrap().is_empty());
    }
}
