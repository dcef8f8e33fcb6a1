//! Integration tests for the replay feed.
//!
//! Covers:
//! 1. Event counts: a K-bar symbol produces exactly K events, then freezes
//! 2. Clock monotonicity across ragged multi-symbol series
//! 3. Channel validation happens before any provider call
//! 4. Per-symbol fetch failures degrade to empty series
//! 5. Lifecycle hook policy: error hook fires only on genuine failure

use chrono::{NaiveDate, TimeZone, Utc};
use minutelab::data::{BarProvider, DataError};
use minutelab::domain::Bar;
use minutelab::feed::{FeedError, ReplayFeed};
use minutelab::market::{MarketData, MarketView};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, RwLock};

/// Canned provider: per-symbol bar series, per-symbol failures, and a fetch
/// counter so tests can assert the network was (not) touched.
struct StaticProvider {
    series: HashMap<String, Vec<Bar>>,
    failing: Vec<String>,
    fetch_count: Rc<Cell<usize>>,
}

impl StaticProvider {
    fn new(series: HashMap<String, Vec<Bar>>) -> Self {
        Self {
            series,
            failing: Vec::new(),
            fetch_count: Rc::new(Cell::new(0)),
        }
    }
}

impl BarProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_minute_bars(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        if self.failing.iter().any(|s| s == symbol) {
            return Err(DataError::NetworkUnreachable("canned failure".into()));
        }
        Ok(self.series.get(symbol).cloned().unwrap_or_default())
    }
}

fn bars(symbol: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            symbol: symbol.into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 14, 30 + i as u32, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn feed_with(provider: StaticProvider) -> (ReplayFeed, Arc<RwLock<MarketData>>) {
    let market = Arc::new(RwLock::new(MarketData::new()));
    let feed = ReplayFeed::new(Box::new(provider), market.clone(), date(), date());
    (feed, market)
}

#[test]
fn k_bar_symbol_emits_exactly_k_events_then_freezes() {
    let mut series = HashMap::new();
    series.insert("SPY".to_string(), bars("SPY", &[100.0, 101.0, 102.0]));
    let (mut feed, market) = feed_with(StaticProvider::new(series));
    feed.subscribe(&["AM.SPY"]);

    let seen: Rc<std::cell::RefCell<Vec<(String, f64)>>> = Rc::default();
    let seen_in_handler = Rc::clone(&seen);
    feed.on_bar_update(move |channel, bar| {
        seen_in_handler.borrow_mut().push((channel.to_string(), bar.close));
    });

    feed.connect().unwrap();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            ("AM.SPY".to_string(), 100.0),
            ("AM.SPY".to_string(), 101.0),
            ("AM.SPY".to_string(), 102.0),
        ]
    );

    let market = market.read().unwrap();
    assert_eq!(market.tick(), 3);
    assert!(!market.has_next());
    assert_eq!(market.price_of("SPY").unwrap(), 102.0);
}

#[test]
fn ragged_series_emit_their_own_lengths() {
    let mut series = HashMap::new();
    series.insert("SPY".to_string(), bars("SPY", &[100.0, 101.0]));
    series.insert("AAPL".to_string(), bars("AAPL", &[50.0, 51.0, 52.0, 53.0]));
    let (mut feed, market) = feed_with(StaticProvider::new(series));
    feed.subscribe(&["AM.SPY", "alpacadatav1/AM.AAPL"]);

    let counts: Rc<std::cell::RefCell<HashMap<String, usize>>> = Rc::default();
    let counts_in_handler = Rc::clone(&counts);
    feed.on_bar_update(move |channel, _bar| {
        *counts_in_handler.borrow_mut().entry(channel.to_string()).or_insert(0) += 1;
    });

    feed.connect().unwrap();

    let counts = counts.borrow();
    assert_eq!(counts["AM.SPY"], 2);
    assert_eq!(counts["AM.AAPL"], 4);

    // SPY freezes at its last close while AAPL keeps moving.
    let market = market.read().unwrap();
    assert_eq!(market.price_of("SPY").unwrap(), 101.0);
    assert_eq!(market.price_of("AAPL").unwrap(), 53.0);
    assert_eq!(market.tick(), 4);
}

#[test]
fn bad_channel_fails_before_any_fetch() {
    let provider = StaticProvider::new(HashMap::new());
    let fetch_count = Rc::clone(&provider.fetch_count);
    let (mut feed, _market) = feed_with(provider);
    feed.subscribe(&["AM.SPY", "XX.AAPL"]);
    feed.on_bar_update(|_, _| {});

    let err = feed.connect().unwrap_err();
    assert!(matches!(err, FeedError::UnsupportedChannel(l) if l == "XX.AAPL"));
    assert_eq!(fetch_count.get(), 0);
}

#[test]
fn failed_symbol_degrades_to_empty_and_rest_replays() {
    let mut series = HashMap::new();
    series.insert("SPY".to_string(), bars("SPY", &[100.0, 101.0]));
    let mut provider = StaticProvider::new(series);
    provider.failing.push("AAPL".to_string());
    let (mut feed, _market) = feed_with(provider);
    feed.subscribe(&["AM.SPY", "AM.AAPL", "AM.MSFT"]);

    let events = Rc::new(Cell::new(0usize));
    let events_in_handler = Rc::clone(&events);
    feed.on_bar_update(move |_, _| events_in_handler.set(events_in_handler.get() + 1));

    let report = feed.connect().unwrap();

    assert_eq!(report.loaded, vec!["SPY".to_string()]);
    assert_eq!(report.empty.len(), 2);
    assert!(report.empty.iter().any(|(s, e)| s == "AAPL" && e.is_some()));
    assert!(report.empty.iter().any(|(s, e)| s == "MSFT" && e.is_none()));
    assert_eq!(events.get(), 2);
}

#[test]
fn run_without_handler_is_a_noop() {
    let mut series = HashMap::new();
    series.insert("SPY".to_string(), bars("SPY", &[100.0, 101.0]));
    let (mut feed, market) = feed_with(StaticProvider::new(series));
    feed.subscribe(&["AM.SPY"]);

    feed.connect().unwrap();

    // Data loaded, but no handler means no ticks were consumed.
    let market = market.read().unwrap();
    assert_eq!(market.tick(), 0);
    assert!(market.has_next());
}

#[test]
fn hooks_fire_in_order_on_success_and_error_hook_stays_silent() {
    let mut series = HashMap::new();
    series.insert("SPY".to_string(), bars("SPY", &[100.0]));
    let (mut feed, _market) = feed_with(StaticProvider::new(series));
    feed.subscribe(&["AM.SPY"]);

    let log: Rc<std::cell::RefCell<Vec<&'static str>>> = Rc::default();
    let connect_log = Rc::clone(&log);
    feed.on_connect(move || connect_log.borrow_mut().push("connect"));
    let disconnect_log = Rc::clone(&log);
    feed.on_disconnect(move || disconnect_log.borrow_mut().push("disconnect"));
    let error_log = Rc::clone(&log);
    feed.on_error(move |_| error_log.borrow_mut().push("error"));
    let bar_log = Rc::clone(&log);
    feed.on_bar_update(move |_, _| bar_log.borrow_mut().push("bar"));

    feed.connect().unwrap();

    assert_eq!(*log.borrow(), vec!["connect", "bar", "disconnect"]);
}

#[test]
fn error_hook_fires_on_load_failure_and_disconnect_does_not() {
    let (mut feed, _market) = feed_with(StaticProvider::new(HashMap::new()));
    feed.subscribe(&["bogus"]);

    let log: Rc<std::cell::RefCell<Vec<String>>> = Rc::default();
    let disconnect_log = Rc::clone(&log);
    feed.on_disconnect(move || disconnect_log.borrow_mut().push("disconnect".into()));
    let error_log = Rc::clone(&log);
    feed.on_error(move |e| error_log.borrow_mut().push(format!("error: {e}")));
    feed.on_bar_update(|_, _| {});

    assert!(feed.connect().is_err());

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].starts_with("error: unsupported channel"));
}

#[test]
fn handler_reads_fresh_prices_through_a_view() {
    // The price a handler observes for a bar's own symbol is already that
    // bar's close — prices update before dispatch within a tick.
    let mut series = HashMap::new();
    series.insert("SPY".to_string(), bars("SPY", &[100.0, 101.0]));
    let (mut feed, market) = feed_with(StaticProvider::new(series));
    feed.subscribe(&["AM.SPY"]);

    let view = MarketView::new(market.clone());
    let mismatches = Rc::new(Cell::new(0usize));
    let mismatches_in_handler = Rc::clone(&mismatches);
    feed.on_bar_update(move |_, bar| {
        if view.price_of(&bar.symbol).unwrap() != bar.close {
            mismatches_in_handler.set(mismatches_in_handler.get() + 1);
        }
    });

    feed.connect().unwrap();
    assert_eq!(mismatches.get(), 0);
}
