//! Channel label parsing.
//!
//! Subscriptions use aggregate-minute channel labels in one of two accepted
//! forms: `AM.<SYMBOL>` or the prefixed `alpacadatav1/AM.<SYMBOL>`. Anything
//! else is a naming error at subscription-load time.

use super::replay::FeedError;

const AM_PREFIX: &str = "AM.";
const V1_PREFIX: &str = "alpacadatav1/AM.";

/// Extract the bare symbol from a channel label.
pub fn symbol_of(label: &str) -> Result<&str, FeedError> {
    let symbol = label
        .strip_prefix(V1_PREFIX)
        .or_else(|| label.strip_prefix(AM_PREFIX))
        .ok_or_else(|| FeedError::UnsupportedChannel(label.to_string()))?;

    if symbol.is_empty() {
        return Err(FeedError::UnsupportedChannel(label.to_string()));
    }
    Ok(symbol)
}

/// The canonical channel label for a symbol.
pub fn channel_of(symbol: &str) -> String {
    format!("{AM_PREFIX}{symbol}")
}
