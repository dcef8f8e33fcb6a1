//! Replay feed — turns the registry into a push-based bar feed with
//! socket-style lifecycle hooks.

pub mod channel;
pub mod replay;

pub use channel::{channel_of, symbol_of};
pub use replay::{FeedError, LoadReport, ReplayFeed};
