//! Historical minute-bar providers.

pub mod alpaca;
pub mod provider;
pub mod twelvedata;

pub use alpaca::AlpacaProvider;
pub use provider::{BarProvider, DataError};
pub use twelvedata::TwelveDataProvider;
