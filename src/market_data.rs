//! Signed WOO X REST requests for candles and trade history.
//!
//! [`MarketDataFetcher`] owns the transport, credentials and retry policy
//! it was built with; nothing is read from the environment here.

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::auth::{Credentials, QueryParams, timestamp_ms};
use crate::http::Transport;
use crate::models::Interval;
use crate::models::candle::{CandleResponse, CandleSeries};
use crate::models::trade::TradePage;
use crate::retry::RetryPolicy;
use crate::{Result, StochbotError};

const CANDLES_PATH: &str = "/v1/market/candles";
const TRADES_PATH: &str = "/v1/client/trades";

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Parameters for one page of `GET /v1/client/trades`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeHistoryQuery {
    pub symbol: String,
    /// Window start, epoch milliseconds.
    pub start_t: Option<u64>,
    /// Window end, epoch milliseconds.
    pub end_t: Option<u64>,
    pub page: u32,
    pub size: u32,
}

impl TradeHistoryQuery {
    /// First page of the `days` ending at `now_ms`.
    pub fn last_days(symbol: impl Into<String>, days: u32, now_ms: u64) -> Self {
        Self {
            symbol: symbol.into(),
            start_t: Some(now_ms.saturating_sub(u64::from(days) * MS_PER_DAY)),
            end_t: Some(now_ms),
            page: 1,
            size: 25,
        }
    }

    /// Signed parameters: empty values dropped, keys sorted.
    fn params(&self) -> QueryParams {
        let opt = |v: Option<u64>| v.map(|t| t.to_string()).unwrap_or_default();
        QueryParams::new()
            .push("symbol", &self.symbol)
            .push("start_t", opt(self.start_t))
            .push("end_t", opt(self.end_t))
            .push("page", self.page)
            .push("size", self.size)
            .without_empty()
            .sorted()
    }
}

/// Fetches authenticated market data with bounded retry.
pub struct MarketDataFetcher<T> {
    transport: T,
    base_url: String,
    credentials: Option<Credentials>,
    retry: RetryPolicy,
}

impl<T: Transport> MarketDataFetcher<T> {
    #[must_use]
    pub fn new(
        transport: T,
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            credentials,
            retry,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches up to `limit` candles, oldest first.
    ///
    /// # Errors
    ///
    /// - [`StochbotError::EmptyResult`] if the exchange answered with no rows
    /// - [`StochbotError::RetriesExhausted`] if every attempt failed
    /// - [`StochbotError::MissingCredentials`] before any request is sent
    /// - [`StochbotError::Json`] / [`StochbotError::MalformedMessage`] for
    ///   an unparseable success body
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<CandleSeries> {
        let query = QueryParams::new()
            .push("symbol", symbol)
            .push("timeframe", interval)
            .push("limit", limit);
        let target = format!("candles {symbol} {interval}");

        let body = self.signed_get(CANDLES_PATH, &query, &target).await?;
        let response: CandleResponse = serde_json::from_str(&body)?;

        match response.rows {
            Some(rows) if !rows.is_empty() => {
                let series = CandleSeries::from_rows(symbol, interval, &rows)?;
                debug!(symbol, %interval, bars = series.len(), "fetched candles");
                Ok(series)
            }
            _ => {
                warn!("No data returned for {symbol} with interval {interval}.");
                Err(StochbotError::EmptyResult {
                    symbol: symbol.to_string(),
                    interval: interval.to_string(),
                })
            }
        }
    }

    /// Fetches one page of the account's executed trades.
    ///
    /// # Errors
    ///
    /// Same transport and retry errors as [`Self::fetch_candles`];
    /// [`StochbotError::MalformedMessage`] if the exchange reports
    /// `success: false`.
    pub async fn fetch_trade_history(&self, query: &TradeHistoryQuery) -> Result<TradePage> {
        let target = format!("trades {} page {}", query.symbol, query.page);
        let body = self.signed_get(TRADES_PATH, &query.params(), &target).await?;
        let page: TradePage = serde_json::from_str(&body)?;

        if !page.success {
            return Err(StochbotError::MalformedMessage(format!(
                "trade history request rejected: {body}"
            )));
        }
        info!(
            symbol = %query.symbol,
            page = query.page,
            rows = page.rows.len(),
            "fetched trade history"
        );
        Ok(page)
    }

    /// Sends a signed GET under the retry policy and returns the 200 body.
    ///
    /// Failed attempts are logged by the policy.
    async fn signed_get(&self, path: &str, query: &QueryParams, target: &str) -> Result<String> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(StochbotError::MissingCredentials)?;
        let query_string = query.to_query_string();
        let url = format!("{}{}?{}", self.base_url, path, query_string);
        let (url, query_string) = (url.as_str(), query_string.as_str());

        self.retry
            .run(target, move |_| async move {
                let headers = credentials.sign_headers(query_string, timestamp_ms())?;
                let response = self.transport.get(url, &headers).await?;

                if response.status == StatusCode::OK {
                    return Ok(response.body);
                }
                Err(StochbotError::Status {
                    status: response.status,
                    body: response.body,
                })
            })
            .await
    }
}
