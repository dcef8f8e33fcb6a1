//! One symbol's bar series and its replay-derived price.

use crate::domain::Bar;

/// Ordered bar series for a single symbol, plus the price the replay has
/// revealed so far.
///
/// `current_price` starts at 0.0 (nothing revealed yet), tracks each revealed
/// bar's close, and freezes at the final close once the series is exhausted.
/// Owned exclusively by [`MarketData`](super::MarketData); nothing outside the
/// market module mutates it.
#[derive(Debug, Clone)]
pub struct SecurityTimeSeries {
    pub(crate) symbol: String,
    pub(crate) bars: Vec<Bar>,
    pub(crate) current_price: f64,
}

impl SecurityTimeSeries {
    pub(crate) fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            current_price: 0.0,
        }
    }

    /// The bar revealed at a given tick, if this series is long enough.
    pub(crate) fn bar_at(&self, tick: usize) -> Option<&Bar> {
        self.bars.get(tick)
    }

    pub(crate) fn len(&self) -> usize {
        self.bars.len()
    }
}
