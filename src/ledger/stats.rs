//! Summary statistics for a ledger.

use serde::{Deserialize, Serialize};

/// Start value, end value, and return on investment for a run.
///
/// `roi` is fractional: 0.001 means the portfolio gained 0.1%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub start_value: f64,
    pub end_value: f64,
    pub roi: f64,
}
