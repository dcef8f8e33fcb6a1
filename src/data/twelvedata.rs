//! TwelveData minute-bar provider.
//!
//! Fetches 1-minute bars from the `time_series` endpoint. TwelveData reports
//! errors in the response body with HTTP 200, serializes all numeric fields
//! as strings, and returns values newest-first; all three quirks are handled
//! here so the rest of the crate never sees them.

use super::provider::{BarProvider, DataError};
use crate::domain::Bar;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.twelvedata.com/time_series";

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
    values: Option<Vec<TimeSeriesValue>>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesValue {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: Option<String>,
}

/// TwelveData provider.
pub struct TwelveDataProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    max_retries: u32,
    base_delay: Duration,
}

impl TwelveDataProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<f64, DataError> {
        value.parse::<f64>().map_err(|_| {
            DataError::ResponseFormatChanged(format!("non-numeric {name}: {value:?}"))
        })
    }

    /// Turn a deserialized response into sorted bars.
    fn parse_response(symbol: &str, resp: TimeSeriesResponse) -> Result<Vec<Bar>, DataError> {
        if resp.status.as_deref() == Some("error") {
            let message = resp.message.unwrap_or_else(|| "no message".into());
            return match resp.code {
                Some(400) | Some(404) => Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }),
                Some(401) => Err(DataError::MissingCredentials(message)),
                Some(429) => Err(DataError::RateLimited { retry_after_secs: 60 }),
                _ => Err(DataError::Other(message)),
            };
        }

        let values = resp.values.unwrap_or_default();
        let mut bars = Vec::with_capacity(values.len());

        for value in values {
            let timestamp = NaiveDateTime::parse_from_str(&value.datetime, "%Y-%m-%d %H:%M:%S")
                .map_err(|_| {
                    DataError::ResponseFormatChanged(format!(
                        "unparseable datetime: {:?}",
                        value.datetime
                    ))
                })?
                .and_utc();

            bars.push(Bar {
                symbol: symbol.to_string(),
                timestamp,
                open: Self::parse_field("open", &value.open)?,
                high: Self::parse_field("high", &value.high)?,
                low: Self::parse_field("low", &value.low)?,
                close: Self::parse_field("close", &value.close)?,
                volume: value
                    .volume
                    .as_deref()
                    .map(|v| {
                        v.parse::<u64>().map_err(|_| {
                            DataError::ResponseFormatChanged(format!("non-numeric volume: {v:?}"))
                        })
                    })
                    .transpose()?
                    .unwrap_or(0),
            });
        }

        // Values arrive newest-first.
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn fetch_with_retry(&self, url: &str, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let body: TimeSeriesResponse = resp.json().map_err(|e| {
                        DataError::ResponseFormatChanged(format!(
                            "failed to parse response for {symbol}: {e}"
                        ))
                    })?;

                    return Self::parse_response(symbol, body);
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

impl BarProvider for TwelveDataProvider {
    fn name(&self) -> &str {
        "twelvedata"
    }

    fn fetch_minute_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let url = format!(
            "{BASE_URL}?symbol={symbol}&apikey={}&interval=1min\
             &start_date={start} 00:00:00&end_date={end} 23:59:59",
            self.api_key,
        );
        self.fetch_with_retry(&url, symbol)
    }
}
