//! The market registry: all registered series and the simulated clock.

use super::security::SecurityTimeSeries;
use crate::domain::{Bar, Symbol};
use std::collections::HashMap;
use thiserror::Error;

/// Structured errors for registry operations.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("bars for {symbol} are not in ascending timestamp order (index {index})")]
    UnorderedBars { symbol: String, index: usize },
}

/// One bar revealed to the feed at a tick.
#[derive(Debug, Clone)]
pub struct BarEvent {
    pub symbol: Symbol,
    pub bar: Bar,
}

/// Per-symbol bar series plus the global simulated clock.
///
/// `tick` only ever increases, one step per [`advance_tick`](Self::advance_tick).
/// `max_tick` is the length of the longest registered series; replay is done
/// once `tick` reaches it.
#[derive(Debug, Default)]
pub struct MarketData {
    securities: HashMap<Symbol, SecurityTimeSeries>,
    tick: usize,
    max_tick: usize,
}

impl MarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bar series under a symbol, replacing any previous series.
    ///
    /// Bars must be in strictly ascending timestamp order; unordered input
    /// would make "current price at tick N" meaningless, so it is rejected
    /// here rather than left to produce garbage downstream.
    pub fn register_series(&mut self, symbol: &str, bars: Vec<Bar>) -> Result<(), MarketError> {
        for (i, window) in bars.windows(2).enumerate() {
            if window[1].timestamp <= window[0].timestamp {
                return Err(MarketError::UnorderedBars {
                    symbol: symbol.to_string(),
                    index: i + 1,
                });
            }
        }

        let series = SecurityTimeSeries::new(symbol, bars);
        self.max_tick = self.max_tick.max(series.len());
        self.securities.insert(symbol.to_string(), series);
        Ok(())
    }

    /// Reveal one tick's worth of bars.
    ///
    /// Every series long enough to have a bar at the current tick gets its
    /// price moved to that bar's close and contributes one event; shorter
    /// (exhausted) series are skipped and keep their frozen price. The clock
    /// advances after the batch is built. Iteration order across symbols
    /// within one tick is unspecified.
    pub fn advance_tick(&mut self) -> Vec<BarEvent> {
        let tick = self.tick;
        let mut events = Vec::new();

        for series in self.securities.values_mut() {
            if let Some(bar) = series.bar_at(tick).cloned() {
                series.current_price = bar.close;
                events.push(BarEvent {
                    symbol: series.symbol.clone(),
                    bar,
                });
            }
        }

        self.tick += 1;
        events
    }

    /// Whether any series still has unrevealed bars.
    pub fn has_next(&self) -> bool {
        self.tick < self.max_tick
    }

    /// Current price of a symbol (0.0 until its first bar is revealed).
    pub fn price_of(&self, symbol: &str) -> Result<f64, MarketError> {
        self.securities
            .get(symbol)
            .map(|s| s.current_price)
            .ok_or_else(|| MarketError::UnknownSymbol(symbol.to_string()))
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn max_tick(&self) -> usize {
        self.max_tick
    }

    /// Symbols currently registered, in no particular order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.securities.keys().map(String::as_str)
    }
}
