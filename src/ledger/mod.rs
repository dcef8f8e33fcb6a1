//! Portfolio ledger — cash and positions, mutated only by executed orders.
//!
//! Orders execute against the registry's current price, all-or-nothing.
//! Malformed requests are hard errors; shortfalls (not enough cash, not
//! enough shares) come back as structured rejections with zero mutation,
//! leaving message formatting and sinks to the caller.

pub mod stats;

pub use stats::LedgerStats;

use crate::domain::{OrderRequest, OrderSide, Position, Symbol};
use crate::market::{MarketError, MarketView};
use std::collections::HashMap;
use thiserror::Error;

/// Fatal order errors: the request itself is malformed. Nothing mutates.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("no symbol provided for order")]
    MissingSymbol,

    #[error("order quantity must be >= 1, got {0}")]
    InvalidQuantity(u64),

    #[error(transparent)]
    Market(#[from] MarketError),
}

/// Why a well-formed order did not execute. Nothing mutates.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    InsufficientFunds { required: f64, available: f64 },
    InsufficientPosition { requested: u64, held: u64 },
}

/// Outcome of a well-formed order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    /// Fully executed at the given price.
    Filled { price: f64 },
    /// Skipped; ledger state is untouched.
    Rejected(RejectReason),
}

/// Cash plus open positions, priced through a read-only market view.
#[derive(Debug)]
pub struct Ledger {
    cash: f64,
    starting_cash: f64,
    positions: HashMap<Symbol, Position>,
    market: MarketView,
}

impl Ledger {
    pub fn new(starting_cash: f64, market: MarketView) -> Self {
        Self {
            cash: starting_cash,
            starting_cash,
            positions: HashMap::new(),
            market,
        }
    }

    /// Validate and execute a market order at the current price.
    ///
    /// Either the order fully executes or the ledger is left untouched;
    /// there are no partial fills.
    pub fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderOutcome, OrderError> {
        if request.symbol.is_empty() {
            return Err(OrderError::MissingSymbol);
        }
        if request.qty < 1 {
            return Err(OrderError::InvalidQuantity(request.qty));
        }

        let price = self.market.price_of(&request.symbol)?;

        match request.side {
            OrderSide::Sell => {
                let held = self
                    .positions
                    .get(&request.symbol)
                    .map_or(0, |p| p.quantity);
                if held < request.qty {
                    return Ok(OrderOutcome::Rejected(RejectReason::InsufficientPosition {
                        requested: request.qty,
                        held,
                    }));
                }

                self.cash += request.qty as f64 * price;
                if let Some(position) = self.positions.get_mut(&request.symbol) {
                    position.quantity -= request.qty;
                    if position.quantity == 0 {
                        self.positions.remove(&request.symbol);
                    }
                }
            }
            OrderSide::Buy => {
                let cost = request.qty as f64 * price;
                if self.cash < cost {
                    return Ok(OrderOutcome::Rejected(RejectReason::InsufficientFunds {
                        required: cost,
                        available: self.cash,
                    }));
                }

                self.cash -= cost;
                self.positions
                    .entry(request.symbol.clone())
                    .or_insert_with(|| Position::new(request.symbol.clone(), 0))
                    .quantity += request.qty;
            }
        }

        Ok(OrderOutcome::Filled { price })
    }

    /// Cash plus the market value of every open position, recomputed at the
    /// current prices on every call. Never cached: prices move underneath us
    /// as the replay ticks.
    pub fn value(&self) -> Result<f64, MarketError> {
        let mut total = self.cash;
        for position in self.positions.values() {
            total += position.market_value(self.market.price_of(&position.symbol)?);
        }
        Ok(total)
    }

    /// Start value, current value, and return on investment.
    pub fn stats(&self) -> Result<LedgerStats, MarketError> {
        let end_value = self.value()?;
        Ok(LedgerStats {
            start_value: self.starting_cash,
            end_value,
            roi: end_value / self.starting_cash - 1.0,
        })
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn starting_cash(&self) -> f64 {
        self.starting_cash
    }

    /// The open position for a symbol, if any.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// All open positions, in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }
}
