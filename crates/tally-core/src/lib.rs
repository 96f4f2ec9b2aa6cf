//! # tally-core: Pure Cart Logic for Tally
//!
//! This crate is the **heart** of Tally. It contains the cart state
//! machine, the storage and catalog trait seams, and the observer
//! pipeline, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tally Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host Application (CLI/demo)                     │   │
//! │  │        out of scope here - consumes this library                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   money   │  │ observer  │  │  catalog  │  │   │
//! │  │   │   Cart    │  │   Money   │  │ registry, │  │  trait +  │  │   │
//! │  │   │ pipeline  │  │   cents   │  │ log, perf │  │  static   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO REDIS • NO NETWORK • FULLY TESTABLE              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartStore / PriceCatalog traits        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-redis (Persistence Layer)                 │   │
//! │  │        Redis-backed store + catalog, CartFactory wiring         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - The cart state machine with uniform timing/notification
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`catalog`] - PriceCatalog trait and the in-process StaticCatalog
//! - [`store`] - CartStore trait and the in-memory backend
//! - [`observer`] - Observer registry, logging and performance observers
//! - [`error`] - Domain error types
//! - [`validation`] - Product id normalization and quantity checks
//!
//! ## Design Principles
//!
//! 1. **No I/O**: Redis, network, file system access is FORBIDDEN here
//! 2. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **Strategy over inheritance**: One concrete `Cart` composed over
//!    small trait seams, no virtual-dispatch layering
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tally_core::{Cart, LoggingObserver, MemoryCartStore, StaticCatalog};
//!
//! let mut cart = Cart::new(
//!     "demo",
//!     Box::new(MemoryCartStore::new()),
//!     Arc::new(StaticCatalog::with_defaults()),
//! );
//! cart.subscribe(Arc::new(LoggingObserver::new()));
//!
//! cart.add_item("apple", 2)?;
//! cart.add_item("banana", 3)?;
//!
//! // $0.50×2 + $0.30×3 = $1.90, exactly
//! assert_eq!(cart.total()?.cents(), 190);
//! # Ok::<(), tally_core::CartError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod observer;
pub mod store;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Cart` instead of
// `use tally_core::cart::Cart`

pub use cart::Cart;
pub use catalog::{PriceCatalog, StaticCatalog};
pub use error::{CartError, CartResult, ObserverError};
pub use money::Money;
pub use observer::{
    CartObserver, CartOperation, LoggingObserver, ObserverRegistry, OperationStats,
    PerformanceObserver, DEFAULT_SLOW_THRESHOLD,
};
pub use store::{CartItems, CartStore, MemoryCartStore};
