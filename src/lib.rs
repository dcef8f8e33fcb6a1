//! MinuteLab — historical minute-bar replay with an order-execution ledger.
//!
//! This crate contains the three pieces of a minimal backtester:
//! - Domain types (bars, orders, positions)
//! - Market registry: per-symbol bar series plus the simulated clock and the
//!   current-price table derived from it
//! - Replay feed: socket-style push feed that loads bars from a provider and
//!   replays them tick by tick through a registered handler
//! - Portfolio ledger: cash-and-positions accounting that executes market
//!   orders against the registry's current prices
//!
//! Provider integrations (Alpaca Data v2, TwelveData) live behind the
//! [`data::BarProvider`] trait so tests and callers can swap in their own.

pub mod backtest;
pub mod data;
pub mod domain;
pub mod feed;
pub mod ledger;
pub mod market;

pub use backtest::{Backtest, BacktestConfig, DEFAULT_STARTING_CASH};
pub use domain::{Bar, OrderRequest, OrderSide, Position};
pub use feed::{FeedError, LoadReport, ReplayFeed};
pub use ledger::{Ledger, LedgerStats, OrderError, OrderOutcome, RejectReason};
pub use market::{BarEvent, MarketData, MarketError, MarketView};
