//! Fetcher behaviour against a scripted transport.

mod common;

use std::time::Duration;

use reqwest::StatusCode;
use stochbot::StochbotError;
use stochbot::auth::sign;
use stochbot::market_data::{MarketDataFetcher, TradeHistoryQuery};
use stochbot::models::Interval;
use stochbot::retry::RetryPolicy;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

use common::{
    BASE_URL, CapturedLogs, SYMBOL, ScriptedTransport, candles_body, test_credentials,
};

const TRADES_JSON: &str = include_str!("fixtures/trades.json");

fn fetcher(transport: ScriptedTransport) -> MarketDataFetcher<ScriptedTransport> {
    MarketDataFetcher::new(
        transport,
        BASE_URL,
        Some(test_credentials()),
        RetryPolicy::fixed(3, Duration::from_secs(5)),
    )
}

#[tokio::test(start_paused = true)]
async fn signs_candle_request_with_fixed_param_order() {
    let transport = ScriptedTransport::new().reply(StatusCode::OK, candles_body(&[1.0, 2.0]));
    let fetcher = fetcher(transport);

    let series = assert_ok!(fetcher.fetch_candles(SYMBOL, Interval::OneHour, 500).await);
    assert_eq!(series.len(), 2);
    assert_eq!(series.interval(), Interval::OneHour);

    let requests = fetcher_requests(&fetcher);
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let query = "symbol=PERP_LDO_USDT&timeframe=1h&limit=500";
    assert_eq!(request.url, format!("{BASE_URL}/v1/market/candles?{query}"));
    assert_eq!(request.header("x-api-key"), Some("test-key"));
    assert_eq!(request.header("Content-Type"), Some("application/json"));

    let timestamp: u64 = request.header("x-api-timestamp").unwrap().parse().unwrap();
    let expected = sign("test-secret", query, timestamp).unwrap();
    assert_eq!(request.header("x-api-signature"), Some(expected.as_str()));
}

#[tokio::test(start_paused = true)]
async fn three_server_errors_exhaust_retries() {
    let transport = ScriptedTransport::new()
        .reply(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        .reply(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        .reply(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let fetcher = fetcher(transport);
    let start = Instant::now();

    let err = assert_err!(fetcher.fetch_candles(SYMBOL, Interval::FiveMinutes, 500).await);

    assert!(matches!(err, StochbotError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(fetcher_requests(&fetcher).len(), 3);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn each_failed_attempt_is_logged_once() {
    let (logs, _guard) = CapturedLogs::install();
    let transport = ScriptedTransport::new()
        .reply(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        .reply(StatusCode::INTERNAL_SERVER_ERROR, "boom")
        .reply(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let fetcher = fetcher(transport);

    assert_err!(fetcher.fetch_candles(SYMBOL, Interval::OneHour, 500).await);

    let text = logs.text();
    assert_eq!(text.matches("attempt failed").count(), 3, "{text}");
    assert_eq!(text.matches("boom").count(), 3, "{text}");
    assert_eq!(text.matches("giving up").count(), 1, "{text}");
}

#[tokio::test(start_paused = true)]
async fn recovers_after_transport_error() {
    let transport = ScriptedTransport::new()
        .fail(StochbotError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        })
        .reply(StatusCode::OK, candles_body(&[3.0, 4.0, 5.0]));
    let fetcher = fetcher(transport);

    let series = assert_ok!(fetcher.fetch_candles(SYMBOL, Interval::FifteenMinutes, 3).await);
    assert_eq!(series.closes(), vec![3.0, 4.0, 5.0]);
    assert_eq!(fetcher_requests(&fetcher).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn empty_rows_are_not_retried() {
    let transport =
        ScriptedTransport::new().reply(StatusCode::OK, r#"{"success":true,"rows":[]}"#);
    let fetcher = fetcher(transport);

    let err = assert_err!(fetcher.fetch_candles(SYMBOL, Interval::OneHour, 500).await);
    assert!(matches!(err, StochbotError::EmptyResult { .. }));
    assert_eq!(fetcher_requests(&fetcher).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_rows_field_is_empty_result() {
    let transport = ScriptedTransport::new().reply(StatusCode::OK, r#"{"success":true}"#);
    let fetcher = fetcher(transport);

    let err = assert_err!(fetcher.fetch_candles(SYMBOL, Interval::OneHour, 500).await);
    assert!(matches!(err, StochbotError::EmptyResult { .. }));
}

#[tokio::test(start_paused = true)]
async fn unparseable_success_body_is_not_retried() {
    let transport = ScriptedTransport::new().reply(StatusCode::OK, "<html>maintenance</html>");
    let fetcher = fetcher(transport);

    let err = assert_err!(fetcher.fetch_candles(SYMBOL, Interval::OneHour, 500).await);
    assert!(matches!(err, StochbotError::Json(_)));
    assert_eq!(fetcher_requests(&fetcher).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_credentials_send_nothing() {
    let fetcher = MarketDataFetcher::new(
        ScriptedTransport::new(),
        BASE_URL,
        None,
        RetryPolicy::fixed(3, Duration::from_secs(5)),
    );

    let err = assert_err!(fetcher.fetch_candles(SYMBOL, Interval::OneHour, 500).await);
    assert!(matches!(err, StochbotError::MissingCredentials));
    assert!(fetcher_requests(&fetcher).is_empty());
}

#[tokio::test(start_paused = true)]
async fn trade_history_uses_sorted_query() {
    let transport = ScriptedTransport::new().reply(StatusCode::OK, TRADES_JSON);
    let fetcher = fetcher(transport);
    let query = TradeHistoryQuery::last_days("PERP_POWR_USDT", 180, 1_700_000_000_000);

    let page = assert_ok!(fetcher.fetch_trade_history(&query).await);
    assert_eq!(page.rows.len(), 2);

    let requests = fetcher_requests(&fetcher);
    let expected_query = format!(
        "end_t=1700000000000&page=1&size=25&start_t={}&symbol=PERP_POWR_USDT",
        1_700_000_000_000u64 - 180 * 24 * 60 * 60 * 1000
    );
    assert_eq!(
        requests[0].url,
        format!("{BASE_URL}/v1/client/trades?{expected_query}")
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_trade_history_is_an_error() {
    let transport = ScriptedTransport::new()
        .reply(StatusCode::OK, r#"{"success":false,"code":-1001,"message":"auth"}"#);
    let fetcher = fetcher(transport);
    let query = TradeHistoryQuery::last_days("PERP_POWR_USDT", 1, 1_700_000_000_000);

    let err = assert_err!(fetcher.fetch_trade_history(&query).await);
    assert!(matches!(err, StochbotError::MalformedMessage(_)));
}

fn fetcher_requests(fetcher: &MarketDataFetcher<ScriptedTransport>) -> Vec<common::RecordedRequest> {
    fetcher.transport().requests()
}
