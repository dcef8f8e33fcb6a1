//! The replay engine: load historical bars, then drive the simulated clock
//! and push every revealed bar through the registered handler.

use super::channel;
use crate::data::{BarProvider, DataError};
use crate::domain::Bar;
use crate::market::{MarketError, SharedMarket};
use chrono::NaiveDate;
use thiserror::Error;

/// Setup-time errors. Rejected orders and empty symbols are not errors at
/// this level; see [`LoadReport`].
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("unsupported channel label: {0:?}")]
    UnsupportedChannel(String),

    #[error(transparent)]
    Market(#[from] MarketError),
}

/// What `load_data` actually managed to register.
///
/// A symbol lands in `empty` when its fetch failed or returned no bars; the
/// rest of the batch is unaffected. The caller decides whether an empty
/// symbol is worth surfacing.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub empty: Vec<(String, Option<DataError>)>,
}

impl LoadReport {
    pub fn all_loaded(&self) -> bool {
        self.empty.is_empty()
    }
}

type LifecycleHook = Box<dyn FnMut()>;
type ErrorHook = Box<dyn FnMut(&FeedError)>;
type BarHandler = Box<dyn FnMut(&str, &Bar)>;

/// Push-based replay of historical minute bars.
///
/// Mirrors a market-data socket's registration surface (connect, disconnect,
/// error, and bar-update hooks) without any actual socket: `connect` loads
/// everything up front, then replays tick by tick, invoking the bar handler
/// synchronously. The handler runs to completion before the next tick is
/// computed, so the feed never buffers more than one tick's worth of events
/// and a slow handler stalls the replay instead of losing bars.
pub struct ReplayFeed {
    provider: Box<dyn BarProvider>,
    market: SharedMarket,
    start_date: NaiveDate,
    end_date: NaiveDate,
    channels: Vec<String>,
    connect_hook: Option<LifecycleHook>,
    disconnect_hook: Option<LifecycleHook>,
    error_hook: Option<ErrorHook>,
    bar_handler: Option<BarHandler>,
}

impl ReplayFeed {
    pub fn new(
        provider: Box<dyn BarProvider>,
        market: SharedMarket,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            provider,
            market,
            start_date,
            end_date,
            channels: Vec::new(),
            connect_hook: None,
            disconnect_hook: None,
            error_hook: None,
            bar_handler: None,
        }
    }

    /// Register the hook fired when the (simulated) connection opens.
    pub fn on_connect(&mut self, hook: impl FnMut() + 'static) {
        self.connect_hook = Some(Box::new(hook));
    }

    /// Register the hook fired after a successful replay completes.
    pub fn on_disconnect(&mut self, hook: impl FnMut() + 'static) {
        self.disconnect_hook = Some(Box::new(hook));
    }

    /// Register the hook fired when setup fails.
    ///
    /// Fires only on a genuine failure, with the error that caused it. A
    /// successful run ends with the disconnect hook alone.
    pub fn on_error(&mut self, hook: impl FnMut(&FeedError) + 'static) {
        self.error_hook = Some(Box::new(hook));
    }

    /// Register the handler invoked with `(channel_label, bar)` for every
    /// bar revealed during replay.
    pub fn on_bar_update(&mut self, handler: impl FnMut(&str, &Bar) + 'static) {
        self.bar_handler = Some(Box::new(handler));
    }

    /// Subscribe to a set of channel labels (see [`channel::symbol_of`]).
    pub fn subscribe(&mut self, channels: &[&str]) {
        self.channels = channels.iter().map(|c| c.to_string()).collect();
    }

    /// Fetch historical bars for every subscribed channel and register them.
    ///
    /// All channel labels are validated before any provider call is made, so
    /// a bad label fails the whole load without touching the network. A
    /// per-symbol fetch failure or empty response degrades to an empty series
    /// for that symbol; the rest of the batch still loads. Fully completes
    /// before replay starts — no tick ever observes a half-populated registry.
    pub fn load_data(&mut self) -> Result<LoadReport, FeedError> {
        let mut symbols = Vec::with_capacity(self.channels.len());
        for label in &self.channels {
            symbols.push(channel::symbol_of(label)?.to_string());
        }

        let mut report = LoadReport::default();
        for symbol in symbols {
            match self
                .provider
                .fetch_minute_bars(&symbol, self.start_date, self.end_date)
            {
                Ok(bars) if bars.is_empty() => report.empty.push((symbol, None)),
                Ok(bars) => {
                    self.market
                        .write()
                        .expect("market lock poisoned")
                        .register_series(&symbol, bars)?;
                    report.loaded.push(symbol);
                }
                Err(e) => report.empty.push((symbol, Some(e))),
            }
        }

        Ok(report)
    }

    /// Replay every tick, pushing each revealed bar through the bar handler.
    ///
    /// No-op if no bar handler is registered.
    pub fn run_simulation(&mut self) {
        let Some(handler) = self.bar_handler.as_mut() else {
            return;
        };

        loop {
            // Lock scope ends before the handler runs: the handler typically
            // reads prices through a MarketView on the same registry.
            let events = {
                let mut market = self.market.write().expect("market lock poisoned");
                if !market.has_next() {
                    break;
                }
                market.advance_tick()
            };

            for event in &events {
                handler(&channel::channel_of(&event.symbol), &event.bar);
            }
        }
    }

    /// Simulate a connection: connect hook, load, replay, disconnect hook.
    ///
    /// On a load failure the error hook fires with the cause and the error is
    /// returned; neither the replay nor the disconnect hook runs.
    pub fn connect(&mut self) -> Result<LoadReport, FeedError> {
        if let Some(hook) = self.connect_hook.as_mut() {
            hook();
        }

        let report = match self.load_data() {
            Ok(report) => report,
            Err(e) => {
                if let Some(hook) = self.error_hook.as_mut() {
                    hook(&e);
                }
                return Err(e);
            }
        };

        self.run_simulation();

        if let Some(hook) = self.disconnect_hook.as_mut() {
            hook();
        }
        Ok(report)
    }
}
