//! # Cart Factory
//!
//! Selects a storage backend, wires the default observers, and hands out
//! ready-to-use carts.
//!
//! ## Backend Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CartFactory Decision Tree                            │
//! │                                                                         │
//! │  requested backend                                                      │
//! │       │                                                                 │
//! │       ├── Memory ────────────────────────────► MemoryCartStore         │
//! │       │                                                                 │
//! │       ├── Auto ──► PING the server                                     │
//! │       │              ├── pong ──► RedisCartStore                       │
//! │       │              └── fail ──► MemoryCartStore                      │
//! │       │                                                                 │
//! │       └── Redis ─► connect for this cart id                            │
//! │                      ├── ok ────► RedisCartStore                       │
//! │                      └── fail ──► warn + MemoryCartStore               │
//! │                                   (fallback is PER IDENTIFIER, never   │
//! │                                    a global downgrade)                 │
//! │                                                                         │
//! │  Every constructed cart gets the default observers subscribed:         │
//! │  one shared PerformanceObserver + one LoggingObserver.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use tally_core::{
    Cart, CartObserver, CartStore, LoggingObserver, MemoryCartStore, PerformanceObserver,
    PriceCatalog,
};

use crate::cart_store::RedisCartStore;
use crate::error::StoreResult;

// =============================================================================
// Backend Choice
// =============================================================================

/// Which storage backend the factory should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartBackend {
    /// Always transient in-process memory.
    Memory,
    /// Redis for every cart, falling back to memory per cart id when
    /// construction fails for that id.
    Redis,
    /// Probe the server per cart: Redis when reachable, memory otherwise.
    #[default]
    Auto,
}

// =============================================================================
// CartFactory
// =============================================================================

/// Builds carts wired with a backend, a catalog, and default observers.
///
/// The factory keeps one shared [`PerformanceObserver`], so statistics
/// aggregate across every cart it constructs; each cart also gets a
/// [`LoggingObserver`].
///
/// ## Usage
/// ```rust,no_run
/// use std::sync::Arc;
/// use tally_core::StaticCatalog;
/// use tally_redis::{CartBackend, CartFactory};
///
/// let catalog = Arc::new(StaticCatalog::with_defaults());
/// let factory = CartFactory::with_redis("redis://127.0.0.1/", catalog, CartBackend::Auto)?;
///
/// let mut cart = factory.create_cart("session-1");
/// cart.add_item("apple", 2)?;
///
/// println!("{:#?}", factory.performance().snapshot());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CartFactory {
    client: Option<redis::Client>,
    backend: CartBackend,
    catalog: Arc<dyn PriceCatalog>,
    cart_ttl: Option<Duration>,
    performance: Arc<PerformanceObserver>,
}

impl CartFactory {
    /// A factory that only ever builds memory-backed carts.
    pub fn in_memory(catalog: Arc<dyn PriceCatalog>) -> Self {
        CartFactory {
            client: None,
            backend: CartBackend::Memory,
            catalog,
            cart_ttl: None,
            performance: Arc::new(PerformanceObserver::new()),
        }
    }

    /// A factory that can build Redis-backed carts.
    ///
    /// Opening the client validates the URL only; no connection is made
    /// until a cart is constructed (or the server is probed).
    pub fn with_redis(
        url: &str,
        catalog: Arc<dyn PriceCatalog>,
        backend: CartBackend,
    ) -> StoreResult<Self> {
        let client = redis::Client::open(url).map_err(crate::error::StoreError::from)?;
        Ok(CartFactory {
            client: Some(client),
            backend,
            catalog,
            cart_ttl: None,
            performance: Arc::new(PerformanceObserver::new()),
        })
    }

    /// Arms a time-to-live on every Redis-backed cart record the factory
    /// creates.
    pub fn with_cart_ttl(mut self, ttl: Duration) -> Self {
        self.cart_ttl = Some(ttl);
        self
    }

    /// The shared performance observer wired onto every cart.
    pub fn performance(&self) -> &Arc<PerformanceObserver> {
        &self.performance
    }

    /// Probes the Redis server with PING.
    pub fn redis_available(&self) -> bool {
        let Some(client) = &self.client else {
            return false;
        };
        match client.get_connection() {
            Ok(mut conn) => redis::cmd("PING").query::<String>(&mut conn).is_ok(),
            Err(_) => false,
        }
    }

    /// Constructs one cart for the given identifier.
    pub fn create_cart(&self, cart_id: impl Into<String>) -> Cart {
        let cart_id = cart_id.into();
        let store = self.build_store(&cart_id);

        let cart = Cart::new(cart_id, store, Arc::clone(&self.catalog));
        cart.subscribe(Arc::clone(&self.performance) as Arc<dyn CartObserver>);
        cart.subscribe(Arc::new(LoggingObserver::new()));
        cart
    }

    /// Constructs a cart with a generated UUID v4 identifier.
    pub fn create_cart_with_generated_id(&self) -> Cart {
        self.create_cart(Uuid::new_v4().to_string())
    }

    /// Constructs one cart per identifier in the batch.
    ///
    /// A Redis failure for one identifier downgrades only that cart to
    /// the memory backend; the rest of the batch is unaffected.
    pub fn create_carts<I, S>(&self, cart_ids: I) -> Vec<Cart>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        cart_ids.into_iter().map(|id| self.create_cart(id)).collect()
    }

    fn build_store(&self, cart_id: &str) -> Box<dyn CartStore> {
        match self.backend {
            CartBackend::Memory => Box::new(MemoryCartStore::new()),
            CartBackend::Auto => {
                if self.redis_available() {
                    self.build_redis_store(cart_id)
                } else {
                    info!(cart_id, "redis unreachable; using memory backend");
                    Box::new(MemoryCartStore::new())
                }
            }
            CartBackend::Redis => self.build_redis_store(cart_id),
        }
    }

    fn build_redis_store(&self, cart_id: &str) -> Box<dyn CartStore> {
        let Some(client) = &self.client else {
            warn!(cart_id, "no redis client configured; using memory backend");
            return Box::new(MemoryCartStore::new());
        };

        match RedisCartStore::connect(client, cart_id) {
            Ok(store) => {
                let store = match self.cart_ttl {
                    Some(ttl) => store.with_ttl(ttl),
                    None => store,
                };
                Box::new(store)
            }
            Err(err) => {
                // Fallback is local to this one identifier
                warn!(
                    cart_id,
                    error = %err,
                    "redis store construction failed; falling back to memory backend"
                );
                Box::new(MemoryCartStore::new())
            }
        }
    }
}

impl std::fmt::Debug for CartFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartFactory")
            .field("backend", &self.backend)
            .field("has_client", &self.client.is_some())
            .field("cart_ttl", &self.cart_ttl)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
