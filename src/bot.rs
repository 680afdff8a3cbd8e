//! One evaluation cycle of the signal bot.
//!
//! Each call fetches fresh 1h, 15m and 5m candles, computes the
//! stochastic RSI per frame, and hands a [`TradeIntent`] to the sink when
//! all three frames are oversold. No state carries over between calls.

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::StochbotError;
use crate::config::BotConfig;
use crate::execution::ExecutionSink;
use crate::http::Transport;
use crate::indicators::{IndicatorFrame, IndicatorParams, compute_indicators};
use crate::market_data::MarketDataFetcher;
use crate::models::{Interval, Side};
use crate::models::candle::CandleSeries;
use crate::models::trade::TradeIntent;
use crate::signal::check_entry;

/// Timeframes evaluated each cycle, slowest first.
pub const TIMEFRAMES: [Interval; 3] = [
    Interval::OneHour,
    Interval::FifteenMinutes,
    Interval::FiveMinutes,
];

/// Side of every intent; there is no sizing or direction logic.
pub const ENTRY_SIDE: Side = Side::Buy;

/// Quantity of every intent (1000 units).
pub const ENTRY_QUANTITY: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// How a cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A fetch failed; nothing was evaluated.
    Skipped(StochbotError),
    /// Data was evaluated and the condition did not hold.
    NoEntry,
    /// The condition held and the sink accepted this intent.
    Entered(TradeIntent),
    /// The condition held but the sink rejected the intent.
    ExecutionFailed {
        intent: TradeIntent,
        error: StochbotError,
    },
}

/// Runs a single fetch, compute, decide cycle for `config.symbol`.
///
/// Never fails: every error is logged and folded into the outcome.
pub async fn run_cycle<T, S>(
    fetcher: &MarketDataFetcher<T>,
    sink: &S,
    config: &BotConfig,
) -> CycleOutcome
where
    T: Transport,
    S: ExecutionSink + ?Sized,
{
    let symbol = config.symbol.as_str();

    let mut series: Vec<CandleSeries> = Vec::with_capacity(TIMEFRAMES.len());
    for interval in TIMEFRAMES {
        match fetcher
            .fetch_candles(symbol, interval, config.candle_limit)
            .await
        {
            Ok(s) => series.push(s),
            Err(e) => {
                warn!("Skipping trading for {symbol} due to missing data: {e}");
                return CycleOutcome::Skipped(e);
            }
        }
    }

    let params = IndicatorParams::default();
    let frames: Vec<Option<IndicatorFrame>> = series
        .iter()
        .map(|s| {
            let frame = compute_indicators(s, &params);
            if let Some(Err(e)) = frame.as_ref().map(IndicatorFrame::ensure_warm) {
                warn!(symbol, interval = %s.interval(), "{e}");
            }
            frame
        })
        .collect();

    if check_entry(frames[0].as_ref(), frames[1].as_ref(), frames[2].as_ref()) {
        let intent = TradeIntent {
            symbol: symbol.to_string(),
            side: ENTRY_SIDE,
            quantity: ENTRY_QUANTITY,
        };
        match sink.execute(&intent) {
            Ok(()) => CycleOutcome::Entered(intent),
            Err(e) => {
                error!("Failed to execute trade for {symbol}: {e}");
                CycleOutcome::ExecutionFailed { intent, error: e }
            }
        }
    } else {
        info!("No entry conditions met for {symbol}.");
        CycleOutcome::NoEntry
    }
}
