//! Top-level façade wiring registry, feed, and ledger together.

use crate::data::BarProvider;
use crate::domain::{Bar, OrderRequest};
use crate::feed::{FeedError, LoadReport, ReplayFeed};
use crate::ledger::{Ledger, LedgerStats, OrderError, OrderOutcome};
use crate::market::{MarketData, MarketError, MarketView, SharedMarket};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, RwLock};

pub const DEFAULT_STARTING_CASH: f64 = 100_000.0;

/// Configuration for a backtest run.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_cash: f64,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            starting_cash: DEFAULT_STARTING_CASH,
        }
    }

    pub fn with_starting_cash(mut self, starting_cash: f64) -> Self {
        self.starting_cash = starting_cash;
        self
    }
}

/// A full backtest: provider-backed replay feed plus a ledger priced off the
/// same registry.
///
/// Strategy code runs inside [`run`](Self::run) and gets the ledger handed to
/// it per bar; replay is single-threaded and fully synchronous, so every
/// order a strategy places settles before the next bar arrives.
pub struct Backtest {
    feed: ReplayFeed,
    ledger: Rc<RefCell<Ledger>>,
}

impl Backtest {
    pub fn new(provider: Box<dyn BarProvider>, config: BacktestConfig) -> Self {
        let market: SharedMarket = Arc::new(RwLock::new(MarketData::new()));
        let view = MarketView::new(market.clone());
        let ledger = Rc::new(RefCell::new(Ledger::new(config.starting_cash, view)));
        let feed = ReplayFeed::new(provider, market, config.start_date, config.end_date);
        Self { feed, ledger }
    }

    /// Subscribe to channel labels (`AM.<SYM>` or `alpacadatav1/AM.<SYM>`).
    pub fn subscribe(&mut self, channels: &[&str]) {
        self.feed.subscribe(channels);
    }

    /// Direct access to the feed for lifecycle hook registration.
    pub fn feed_mut(&mut self) -> &mut ReplayFeed {
        &mut self.feed
    }

    /// Load data and replay it, calling `strategy` with `(channel, bar,
    /// ledger)` for every revealed bar.
    pub fn run(
        &mut self,
        mut strategy: impl FnMut(&str, &Bar, &mut Ledger) + 'static,
    ) -> Result<LoadReport, FeedError> {
        let ledger = Rc::clone(&self.ledger);
        self.feed.on_bar_update(move |channel, bar| {
            strategy(channel, bar, &mut *ledger.borrow_mut());
        });
        self.feed.connect()
    }

    /// Submit an order outside of replay (e.g. liquidation after a run).
    pub fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderOutcome, OrderError> {
        self.ledger.borrow_mut().submit_order(request)
    }

    pub fn stats(&self) -> Result<LedgerStats, MarketError> {
        self.ledger.borrow().stats()
    }

    /// Read-only access to the ledger.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.ledger.borrow())
    }
}
