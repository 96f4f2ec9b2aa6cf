//! # tally-redis: Redis Persistence for Tally
//!
//! Remote-backed implementations of the tally-core trait seams, plus the
//! factory that selects a backend and wires default observers.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tally-redis                                     │
//! │                                                                         │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────────────┐  │
//! │  │ RedisCartStore │   │  RedisCatalog  │   │      CartFactory       │  │
//! │  │ cart:<id> JSON │   │ product:<id>   │   │ backend probe + wiring │  │
//! │  │ records + TTL  │   │ JSON records   │   │ per-id memory fallback │  │
//! │  └───────┬────────┘   └───────┬────────┘   └───────────┬────────────┘  │
//! │          │ CartStore          │ PriceCatalog           │ builds        │
//! │          └────────────────────┴────────────────────────┘               │
//! │                         tally_core::Cart                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Note
//! Cart mutation is a read-modify-write of one key. Redis guarantees each
//! command is atomic, but the sequence is not: two writers to the same
//! cart id can interleave. This is a documented limitation of the design,
//! not a bug to paper over (see DESIGN.md).

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart_store;
pub mod catalog;
pub mod error;
pub mod factory;
pub mod keys;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart_store::RedisCartStore;
pub use catalog::{CatalogRecord, RedisCatalog};
pub use error::{StoreError, StoreResult};
pub use factory::{CartBackend, CartFactory};
