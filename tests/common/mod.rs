//! Shared test utilities: a scripted transport and candle builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::json;
use stochbot::auth::Credentials;
use stochbot::http::{HttpResponse, Transport};
use stochbot::models::Interval;
use stochbot::models::candle::{Candle, CandleSeries};
use stochbot::{Result, StochbotError};

pub const SYMBOL: &str = "PERP_LDO_USDT";
pub const BASE_URL: &str = "https://api.test.woox.io";

/// A request as seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Replies with queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: StatusCode, body: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn fail(self, error: StochbotError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, headers: &[(&'static str, String)]) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StochbotError::MalformedMessage("no scripted reply".into())))
    }
}

pub fn test_credentials() -> Credentials {
    Credentials::new("test-key", "test-secret")
}

/// Bars one hour apart starting at 2023-11-14T22:13:20Z with the given closes.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000 + i as i64 * 3_600_000)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> CandleSeries {
    CandleSeries::new(SYMBOL, Interval::OneHour, candles_from_closes(closes))
}

/// Candle response body in the positional row format.
pub fn candles_body(closes: &[f64]) -> String {
    let rows: Vec<_> = candles_from_closes(closes)
        .iter()
        .map(|c| {
            json!([
                c.timestamp.timestamp_millis(),
                c.open,
                c.high,
                c.low,
                c.close,
                c.volume
            ])
        })
        .collect();
    json!({ "success": true, "rows": rows }).to_string()
}

/// Sideways closes ending in six accelerating drops; `k` ends at zero.
pub fn selloff_closes(n: usize) -> Vec<f64> {
    with_tail(n, -1.0)
}

/// Sideways closes ending in six accelerating gains; `k` ends at 100.
pub fn rally_closes(n: usize) -> Vec<f64> {
    with_tail(n, 1.0)
}

fn with_tail(n: usize, direction: f64) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..n - 6)
        .map(|i| {
            let x = i as f64;
            100.0 + 2.0 * (x * 0.9).sin() + 0.5 * (x * 2.3).sin()
        })
        .collect();
    let mut last = closes[closes.len() - 1];
    for step in 0..6 {
        last += direction * (1.0 + step as f64 * 0.5);
        closes.push(last);
    }
    closes
}

/// Formatted log output captured while the returned guard is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a thread-local subscriber writing into the capture.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn text(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
