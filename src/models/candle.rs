//! OHLCV candle models.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Interval, Numeric};
use crate::{Result, StochbotError};

/// Body of a `GET /v1/market/candles` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub rows: Option<Vec<CandleRow>>,
}

/// One row of the candle response.
///
/// Rows arrive either as positional arrays
/// `[timestamp, open, high, low, close, volume]` or as objects keyed by
/// field name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CandleRow {
    Positional(Vec<Numeric>),
    Keyed {
        #[serde(alias = "start_timestamp")]
        timestamp: Numeric,
        open: Numeric,
        high: Numeric,
        low: Numeric,
        close: Numeric,
        volume: Numeric,
    },
}

impl CandleRow {
    /// Converts the row to a [`Candle`], rejecting missing or non-finite fields.
    pub fn to_candle(&self) -> Result<Candle> {
        let fields: [&Numeric; 6] = match self {
            CandleRow::Positional(values) if values.len() >= 6 => [
                &values[0], &values[1], &values[2], &values[3], &values[4], &values[5],
            ],
            CandleRow::Positional(values) => {
                return Err(StochbotError::MalformedMessage(format!(
                    "candle row has {} columns, expected 6",
                    values.len()
                )));
            }
            CandleRow::Keyed {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            } => [timestamp, open, high, low, close, volume],
        };

        let mut parsed = [0.0; 6];
        for (slot, (value, name)) in parsed.iter_mut().zip(fields.iter().zip(COLUMNS)) {
            *slot = value.as_f64().ok_or_else(|| {
                StochbotError::MalformedMessage(format!("candle {name} is not a finite number"))
            })?;
        }

        let [ts, open, high, low, close, volume] = parsed;
        let timestamp = DateTime::from_timestamp_millis(ts as i64).ok_or_else(|| {
            StochbotError::MalformedMessage(format!("candle timestamp {ts} is out of range"))
        })?;

        Ok(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Start of the bar's time window.
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronologically ordered candles for one symbol and interval.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    symbol: String,
    interval: Interval,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Builds a series, sorting the bars ascending by timestamp.
    pub fn new(symbol: impl Into<String>, interval: Interval, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        Self {
            symbol: symbol.into(),
            interval,
            candles,
        }
    }

    /// Parses response rows into a series.
    ///
    /// # Errors
    ///
    /// Returns [`StochbotError::MalformedMessage`] on the first row that
    /// does not convert.
    pub fn from_rows(symbol: &str, interval: Interval, rows: &[CandleRow]) -> Result<Self> {
        let candles = rows
            .iter()
            .map(CandleRow::to_candle)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(symbol, interval, candles))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}
