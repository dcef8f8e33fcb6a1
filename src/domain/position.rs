use serde::{Deserialize, Serialize};

/// An open holding in one symbol.
///
/// Quantity is unsigned: the ledger never goes short, so a negative position
/// is unrepresentable. A position whose quantity reaches zero is removed from
/// the ledger rather than kept around flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
}

impl Position {
    pub fn new(symbol: impl Into<String>, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity as f64 * current_price
    }
}
