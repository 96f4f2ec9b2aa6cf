//! # Observer Pipeline
//!
//! Post-operation notification fan-out for cart instrumentation.
//!
//! ## Dispatch Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Observer Notification Flow                           │
//! │                                                                         │
//! │  Cart operation completes (state mutation already done)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ObserverRegistry snapshots the subscription list (under the Mutex)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each observer: invoke the relevant callback                        │
//! │       │                                                                 │
//! │       ├── Ok(())  → continue to next observer                          │
//! │       └── Err(e)  → log at warn, CONTINUE to next observer             │
//! │                                                                         │
//! │  GUARANTEES (explicit contract, not an accident of a broad catch):     │
//! │  • A failing observer never stops fan-out to the rest                  │
//! │  • A failing observer never reaches the cart's caller                  │
//! │  • A failing observer never affects the completed state mutation       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two standard observers ship with the crate: [`LoggingObserver`] (one
//! `tracing` line per event) and [`PerformanceObserver`] (per-operation
//! duration statistics).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::{CartError, ObserverError};
use crate::money::Money;

// =============================================================================
// Operation Names
// =============================================================================

/// The four public cart operations, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    AddItem,
    RemoveItem,
    Total,
    Items,
}

impl CartOperation {
    /// Stable operation name used as the statistics key.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CartOperation::AddItem => "AddItem",
            CartOperation::RemoveItem => "RemoveItem",
            CartOperation::Total => "Total",
            CartOperation::Items => "Items",
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CartObserver Trait
// =============================================================================

/// Receives post-operation notifications with timing and outcome.
///
/// All callbacks default to no-ops, so an observer implements only the
/// events it cares about. A callback returns `Err` to report a failure;
/// dispatch logs it and moves on — it never propagates.
pub trait CartObserver: Send + Sync {
    /// An AddItem succeeded; `quantity` is the new accumulated quantity.
    fn on_item_added(
        &self,
        product_id: &str,
        quantity: i64,
        elapsed: Duration,
    ) -> Result<(), ObserverError> {
        let _ = (product_id, quantity, elapsed);
        Ok(())
    }

    /// A RemoveItem succeeded (including the silent no-op case).
    fn on_item_removed(&self, product_id: &str, elapsed: Duration) -> Result<(), ObserverError> {
        let _ = (product_id, elapsed);
        Ok(())
    }

    /// A Total succeeded.
    fn on_total(&self, total: Money, elapsed: Duration) -> Result<(), ObserverError> {
        let _ = (total, elapsed);
        Ok(())
    }

    /// An Items snapshot succeeded; `item_count` is the number of
    /// distinct products.
    fn on_items(&self, item_count: usize, elapsed: Duration) -> Result<(), ObserverError> {
        let _ = (item_count, elapsed);
        Ok(())
    }

    /// Any operation failed; `elapsed` is the time up to the failure.
    fn on_error(
        &self,
        operation: CartOperation,
        error: &CartError,
        elapsed: Duration,
    ) -> Result<(), ObserverError> {
        let _ = (operation, error, elapsed);
        Ok(())
    }
}

// =============================================================================
// ObserverRegistry
// =============================================================================

/// The cart's subscription list.
///
/// ## Thread Safety
/// The only shared structure in the system requiring synchronization:
/// multiple threads may subscribe/unsubscribe/trigger notifications on a
/// shared cart. One Mutex guards add/remove/iterate. Dispatch runs on a
/// snapshot taken under the lock, so a callback may itself subscribe or
/// unsubscribe without deadlocking.
///
/// ## Set Semantics
/// Subscriptions are identity-based (`Arc::ptr_eq`): subscribing the same
/// observer twice is a no-op, so every event reaches it exactly once.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<Arc<dyn CartObserver>>>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ObserverRegistry::default()
    }

    /// Subscribes an observer. Returns `false` if it was already
    /// subscribed (no duplicate is added).
    pub fn subscribe(&self, observer: Arc<dyn CartObserver>) -> bool {
        let mut observers = self.observers.lock().expect("observer list mutex poisoned");
        if observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Unsubscribes an observer. Removing an absent observer is a no-op;
    /// returns `false` in that case.
    pub fn unsubscribe(&self, observer: &Arc<dyn CartObserver>) -> bool {
        let mut observers = self.observers.lock().expect("observer list mutex poisoned");
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() < before
    }

    /// Number of subscribed observers.
    pub fn len(&self) -> usize {
        self.observers
            .lock()
            .expect("observer list mutex poisoned")
            .len()
    }

    /// True when no observers are subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches one event to every subscribed observer.
    ///
    /// Catch-log-continue: a callback error is logged at `warn` and the
    /// remaining observers are still notified.
    pub fn notify<F>(&self, mut callback: F)
    where
        F: FnMut(&dyn CartObserver) -> Result<(), ObserverError>,
    {
        let snapshot: Vec<Arc<dyn CartObserver>> = self
            .observers
            .lock()
            .expect("observer list mutex poisoned")
            .clone();

        for observer in snapshot {
            if let Err(err) = callback(observer.as_ref()) {
                warn!(error = %err, "observer callback failed; continuing dispatch");
            }
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

// =============================================================================
// LoggingObserver
// =============================================================================

/// Renders one human-readable log line per cart event.
///
/// Successes log at `info`, failures at `error` (including the underlying
/// error). Output goes through `tracing`; the host application decides the
/// subscriber and filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        LoggingObserver
    }
}

impl CartObserver for LoggingObserver {
    fn on_item_added(
        &self,
        product_id: &str,
        quantity: i64,
        elapsed: Duration,
    ) -> Result<(), ObserverError> {
        info!(
            product_id,
            quantity,
            elapsed_ms = elapsed.as_millis() as u64,
            "AddItem: '{product_id}' now at quantity {quantity}"
        );
        Ok(())
    }

    fn on_item_removed(&self, product_id: &str, elapsed: Duration) -> Result<(), ObserverError> {
        info!(
            product_id,
            elapsed_ms = elapsed.as_millis() as u64,
            "RemoveItem: '{product_id}' removed"
        );
        Ok(())
    }

    fn on_total(&self, total: Money, elapsed: Duration) -> Result<(), ObserverError> {
        info!(
            total = %total,
            elapsed_ms = elapsed.as_millis() as u64,
            "Total: cart totals {total}"
        );
        Ok(())
    }

    fn on_items(&self, item_count: usize, elapsed: Duration) -> Result<(), ObserverError> {
        info!(
            item_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "Items: {item_count} distinct product(s)"
        );
        Ok(())
    }

    fn on_error(
        &self,
        operation: CartOperation,
        err: &CartError,
        elapsed: Duration,
    ) -> Result<(), ObserverError> {
        error!(
            operation = %operation,
            error = %err,
            elapsed_ms = elapsed.as_millis() as u64,
            "{operation} failed: {err}"
        );
        Ok(())
    }
}

// =============================================================================
// PerformanceObserver
// =============================================================================

/// Default threshold above which an operation counts as slow.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(100);

/// Point-in-time statistics for one operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationStats {
    /// Number of recorded invocations.
    pub count: u64,
    /// Shortest recorded duration.
    pub min: Duration,
    /// Longest recorded duration.
    pub max: Duration,
    /// Mean recorded duration.
    pub average: Duration,
    /// Invocations that exceeded the slow threshold.
    pub slow_count: u64,
}

/// Running accumulator behind the snapshot type.
#[derive(Debug, Clone, Copy)]
struct StatsAccumulator {
    count: u64,
    total: Duration,
    min: Duration,
    max: Duration,
    slow_count: u64,
}

impl StatsAccumulator {
    fn record(&mut self, elapsed: Duration, slow_threshold: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
        if elapsed > slow_threshold {
            self.slow_count += 1;
        }
    }

    fn first(elapsed: Duration, slow_threshold: Duration) -> Self {
        StatsAccumulator {
            count: 1,
            total: elapsed,
            min: elapsed,
            max: elapsed,
            slow_count: u64::from(elapsed > slow_threshold),
        }
    }

    fn snapshot(&self) -> OperationStats {
        OperationStats {
            count: self.count,
            min: self.min,
            max: self.max,
            // count is never 0 here: accumulators only exist after a record
            average: self.total / self.count as u32,
            slow_count: self.slow_count,
        }
    }
}

/// Accumulates per-operation duration statistics.
///
/// ## Thread Safety
/// All aggregates live behind one Mutex, so `snapshot` and `reset` are
/// atomic with respect to concurrent recordings.
///
/// ## Usage
/// ```rust
/// use std::sync::Arc;
/// use tally_core::observer::PerformanceObserver;
///
/// let perf = Arc::new(PerformanceObserver::new());
/// // ... subscribe to a cart, run operations ...
/// for (operation, stats) in perf.snapshot() {
///     println!("{operation}: {} call(s), avg {:?}", stats.count, stats.average);
/// }
/// perf.reset();
/// ```
#[derive(Debug)]
pub struct PerformanceObserver {
    slow_threshold: Duration,
    stats: Mutex<HashMap<&'static str, StatsAccumulator>>,
}

impl PerformanceObserver {
    /// Creates a tracker with the default 100ms slow threshold.
    pub fn new() -> Self {
        PerformanceObserver::with_slow_threshold(DEFAULT_SLOW_THRESHOLD)
    }

    /// Creates a tracker with a custom slow threshold.
    pub fn with_slow_threshold(slow_threshold: Duration) -> Self {
        PerformanceObserver {
            slow_threshold,
            stats: Mutex::new(HashMap::new()),
        }
    }

    /// The configured slow threshold.
    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    /// Returns a copy of all accumulated statistics, keyed by operation
    /// name.
    pub fn snapshot(&self) -> HashMap<&'static str, OperationStats> {
        self.stats
            .lock()
            .expect("performance stats mutex poisoned")
            .iter()
            .map(|(op, acc)| (*op, acc.snapshot()))
            .collect()
    }

    /// Statistics for a single operation, if any were recorded.
    pub fn stats_for(&self, operation: CartOperation) -> Option<OperationStats> {
        self.stats
            .lock()
            .expect("performance stats mutex poisoned")
            .get(operation.as_str())
            .map(StatsAccumulator::snapshot)
    }

    /// Atomically clears all accumulated statistics.
    pub fn reset(&self) {
        self.stats
            .lock()
            .expect("performance stats mutex poisoned")
            .clear();
    }

    fn record(&self, operation: CartOperation, elapsed: Duration) -> Result<(), ObserverError> {
        let mut stats = self.stats.lock().map_err(ObserverError::new)?;
        stats
            .entry(operation.as_str())
            .and_modify(|acc| acc.record(elapsed, self.slow_threshold))
            .or_insert_with(|| StatsAccumulator::first(elapsed, self.slow_threshold));
        Ok(())
    }
}

impl Default for PerformanceObserver {
    fn default() -> Self {
        PerformanceObserver::new()
    }
}

impl CartObserver for PerformanceObserver {
    fn on_item_added(
        &self,
        _product_id: &str,
        _quantity: i64,
        elapsed: Duration,
    ) -> Result<(), ObserverError> {
        self.record(CartOperation::AddItem, elapsed)
    }

    fn on_item_removed(&self, _product_id: &str, elapsed: Duration) -> Result<(), ObserverError> {
        self.record(CartOperation::RemoveItem, elapsed)
    }

    fn on_total(&self, _total: Money, elapsed: Duration) -> Result<(), ObserverError> {
        self.record(CartOperation::Total, elapsed)
    }

    fn on_items(&self, _item_count: usize, elapsed: Duration) -> Result<(), ObserverError> {
        self.record(CartOperation::Items, elapsed)
    }

    fn on_error(
        &self,
        operation: CartOperation,
        _error: &CartError,
        elapsed: Duration,
    ) -> Result<(), ObserverError> {
        // Failed calls still cost time; they count toward the aggregates
        self.record(operation, elapsed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
