//! Domain types shared across the registry, feed, and ledger.

pub mod bar;
pub mod order;
pub mod position;

pub use bar::Bar;
pub use order::{InvalidSide, OrderRequest, OrderSide};
pub use position::Position;

/// Symbol type alias
pub type Symbol = String;
