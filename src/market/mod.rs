//! Market registry — per-symbol bar series, the simulated clock, and the
//! current-price table derived from it.
//!
//! The registry is the single source of truth for "what does this symbol
//! trade at right now". The replay feed is its only writer (registration and
//! tick advancement); the ledger sees it through the read-only [`MarketView`].

pub mod registry;
pub mod security;
pub mod view;

pub use registry::{BarEvent, MarketData, MarketError};
pub use view::{MarketView, SharedMarket};
