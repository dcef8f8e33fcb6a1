//! Order request types.
//!
//! Only market orders exist at this layer: an order is a symbol, a whole-share
//! quantity, and a side, filled at the registry's current price. Limit/stop
//! parameters, time-in-force, and partial fills are deliberately absent.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Which way an order trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Error for a side string that is neither `"buy"` nor `"sell"`.
#[derive(Debug, Clone, Error)]
#[error("side must be \"buy\" or \"sell\", got {0:?}")]
pub struct InvalidSide(pub String);

impl FromStr for OrderSide {
    type Err = InvalidSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(InvalidSide(other.to_string())),
        }
    }
}

/// A market order request submitted to the ledger.
///
/// Deserialization rejects unrecognized fields: an order carrying fields this
/// layer does not support (limit price, time-in-force, ...) is a caller error,
/// not something to silently drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRequest {
    pub symbol: String,
    pub qty: u64,
    pub side: OrderSide,
}

impl OrderRequest {
    pub fn buy(symbol: impl Into<String>, qty: u64) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            side: OrderSide::Buy,
        }
    }

    pub fn sell(symbol: impl Into<String>, qty: u64) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            side: OrderSide::Sell,
        }
    }
}
