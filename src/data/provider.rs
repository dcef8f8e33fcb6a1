//! Data provider trait and structured error types.
//!
//! The BarProvider trait abstracts over minute-bar sources (Alpaca Data v2,
//! TwelveData) so the feed can swap implementations and tests can mock the
//! network entirely.

use crate::domain::Bar;
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for provider operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("missing or rejected credentials: {0}")]
    MissingCredentials(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for historical minute-bar providers.
///
/// Implementations return bars sorted ascending by timestamp. An empty vec
/// means the provider had no data for the range; the feed treats that (and
/// fetch failures) as an empty series for the symbol rather than aborting
/// the batch.
pub trait BarProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch 1-minute OHLCV bars for a symbol over a date range (inclusive).
    fn fetch_minute_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError>;
}
