//! Alpaca Data v2 minute-bar provider.
//!
//! Fetches 1-minute OHLCV bars from the `/v2/stocks/{symbol}/bars` endpoint,
//! following `next_page_token` pagination and retrying transient failures
//! with exponential backoff.

use super::provider::{BarProvider, DataError};
use crate::domain::Bar;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks";
const PAGE_LIMIT: u32 = 10_000;

/// One bar as Alpaca serializes it.
#[derive(Debug, Deserialize)]
struct AlpacaBar {
    #[serde(rename = "t")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: u64,
}

/// One page of the bars endpoint.
#[derive(Debug, Deserialize)]
struct BarsResponse {
    bars: Option<Vec<AlpacaBar>>,
    next_page_token: Option<String>,
}

/// Alpaca Data v2 provider.
pub struct AlpacaProvider {
    client: reqwest::blocking::Client,
    key_id: String,
    secret_key: String,
    max_retries: u32,
    base_delay: Duration,
}

impl AlpacaProvider {
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            key_id: key_id.into(),
            secret_key: secret_key.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Regular-session window for a date range: 14:30Z on the start date
    /// through 20:59:59Z on the end date.
    fn session_window(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let open = start.and_hms_opt(14, 30, 0).unwrap().and_utc();
        let close = end.and_hms_opt(20, 59, 59).unwrap().and_utc();
        (open, close)
    }

    fn convert(symbol: &str, raw: Vec<AlpacaBar>) -> Vec<Bar> {
        raw.into_iter()
            .map(|b| Bar {
                symbol: symbol.to_string(),
                timestamp: b.timestamp,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            })
            .collect()
    }

    /// Fetch one page, with retry on transient failures.
    fn fetch_page(
        &self,
        symbol: &str,
        url: &str,
        page_token: Option<&str>,
    ) -> Result<BarsResponse, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            let mut request = self
                .client
                .get(url)
                .header("APCA-API-KEY-ID", &self.key_id)
                .header("APCA-API-SECRET-KEY", &self.secret_key);
            if let Some(token) = page_token {
                request = request.query(&[("page_token", token)]);
            }

            match request.send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(DataError::MissingCredentials(format!(
                            "Alpaca rejected credentials (HTTP {status})"
                        )));
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    return resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!("failed to parse bars page: {e}"))
                    });
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl BarProvider for AlpacaProvider {
    fn name(&self) -> &str {
        "alpaca_data_v2"
    }

    fn fetch_minute_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let (session_open, session_close) = Self::session_window(start, end);
        let url = format!(
            "{BASE_URL}/{symbol}/bars?timeframe=1Min&start={}&end={}&limit={PAGE_LIMIT}",
            session_open.to_rfc3339(),
            session_close.to_rfc3339(),
        );

        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(symbol, &url, page_token.as_deref())?;
            if let Some(raw) = page.bars {
                bars.extend(Self::convert(symbol, raw));
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        // Alpaca returns pages in order, but the contract is sorted output.
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}
