//! Read-only handle onto the shared registry.

use super::registry::{MarketData, MarketError};
use std::sync::{Arc, RwLock};

/// The registry as shared by the feed (writer) and any number of views.
pub type SharedMarket = Arc<RwLock<MarketData>>;

/// Read-only capability onto the market registry.
///
/// The replay feed keeps the writable handle to itself; everything else
/// (ledger, strategy code) goes through a view and can only look prices up.
/// Replay is single-threaded by design, so the lock is never contended; it
/// exists to make the writer/reader split explicit in the types.
#[derive(Clone)]
pub struct MarketView {
    inner: SharedMarket,
}

impl MarketView {
    pub fn new(inner: SharedMarket) -> Self {
        Self { inner }
    }

    /// Current price of a symbol (0.0 until its first bar is revealed).
    pub fn price_of(&self, symbol: &str) -> Result<f64, MarketError> {
        self.inner.read().expect("market lock poisoned").price_of(symbol)
    }

    /// Current simulated clock value.
    pub fn tick(&self) -> usize {
        self.inner.read().expect("market lock poisoned").tick()
    }
}

impl std::fmt::Debug for MarketView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketView").field("tick", &self.tick()).finish()
    }
}
