//! Stochastic RSI with K and D signal lines.
//!
//! 1. delta = close[i] - close[i-1], undefined for the first bar
//! 2. gain / loss = SMA(rsi_length) of the positive / negative deltas,
//!    the first bar counting as neither
//! 3. RSI = 100 - 100 / (1 + gain / loss)
//! 4. StochRSI = 100 * (RSI - min) / (max - min) over stoch_length
//! 5. K = SMA(k_period) of StochRSI, D = SMA(d_period) of K
//!
//! When `loss == 0` the RSI is 100 if there was any gain and 50 if the
//! window was completely flat. A flat RSI window (`max == min`) leaves
//! StochRSI undefined (NaN).

use tracing::warn;

use super::{rolling_max, rolling_mean, rolling_min};
use crate::models::candle::CandleSeries;
use crate::{Result, StochbotError};

/// RSI returned for a window with neither gains nor losses.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Window lengths for [`compute_indicators`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub k_period: usize,
    pub d_period: usize,
    pub rsi_length: usize,
    pub stoch_length: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            k_period: 3,
            d_period: 3,
            rsi_length: 14,
            stoch_length: 14,
        }
    }
}

impl IndicatorParams {
    /// Bars needed before `k` can hold a value.
    ///
    /// Never less than one, even with zero-length windows.
    pub fn min_bars_for_k(&self) -> usize {
        (self.rsi_length + self.stoch_length + self.k_period)
            .saturating_sub(2)
            .max(1)
    }

    /// Bars needed before `d` can hold a value.
    pub fn min_bars_for_d(&self) -> usize {
        self.min_bars_for_k() + self.d_period.saturating_sub(1)
    }
}

/// A candle series snapshot with its derived indicator columns.
///
/// Each column has one value per bar; warm-up positions are NaN.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    series: CandleSeries,
    params: IndicatorParams,
    rsi: Vec<f64>,
    stoch_rsi: Vec<f64>,
    k: Vec<f64>,
    d: Vec<f64>,
}

impl IndicatorFrame {
    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    pub fn rsi(&self) -> &[f64] {
        &self.rsi
    }

    pub fn stoch_rsi(&self) -> &[f64] {
        &self.stoch_rsi
    }

    pub fn k(&self) -> &[f64] {
        &self.k
    }

    pub fn d(&self) -> &[f64] {
        &self.d
    }

    /// Most recent `k`, NaN included; `None` only for an empty frame.
    pub fn last_k(&self) -> Option<f64> {
        self.k.last().copied()
    }

    /// Checks that the series is long enough for `k` to be defined.
    ///
    /// # Errors
    ///
    /// Returns [`StochbotError::InsufficientHistory`] otherwise.
    pub fn ensure_warm(&self) -> Result<()> {
        let required = self.params.min_bars_for_k();
        if self.series.len() < required {
            return Err(StochbotError::InsufficientHistory {
                len: self.series.len(),
                required,
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_k(k: Vec<f64>) -> Self {
        use crate::models::Interval;

        let n = k.len();
        Self {
            series: CandleSeries::new("TEST", Interval::OneHour, Vec::new()),
            params: IndicatorParams::default(),
            rsi: vec![f64::NAN; n],
            stoch_rsi: vec![f64::NAN; n],
            d: vec![f64::NAN; n],
            k,
        }
    }
}

/// Computes RSI, StochRSI, K and D over the series' close prices.
///
/// Returns `None` for an empty series. Short series still produce a frame
/// whose columns are NaN where the windows are unfilled.
pub fn compute_indicators(series: &CandleSeries, params: &IndicatorParams) -> Option<IndicatorFrame> {
    if series.is_empty() {
        warn!(
            symbol = series.symbol(),
            interval = %series.interval(),
            "no data provided to stochastic RSI"
        );
        return None;
    }

    let closes = series.closes();
    let rsi = rsi(&closes, params.rsi_length);
    let stoch_rsi = stochastic(&rsi, params.stoch_length);
    let k = rolling_mean(&stoch_rsi, params.k_period);
    let d = rolling_mean(&k, params.d_period);

    Some(IndicatorFrame {
        series: series.clone(),
        params: *params,
        rsi,
        stoch_rsi,
        k,
        d,
    })
}

fn rsi(closes: &[f64], length: usize) -> Vec<f64> {
    let delta: Vec<f64> = (0..closes.len())
        .map(|i| if i == 0 { f64::NAN } else { closes[i] - closes[i - 1] })
        .collect();
    // The undefined first delta is neither a gain nor a loss.
    let gains: Vec<f64> = delta.iter().map(|d| if *d > 0.0 { *d } else { 0.0 }).collect();
    let losses: Vec<f64> = delta.iter().map(|d| if *d < 0.0 { -d } else { 0.0 }).collect();

    let avg_gain = rolling_mean(&gains, length);
    let avg_loss = rolling_mean(&losses, length);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| rsi_value(gain, loss))
        .collect()
}

fn rsi_value(gain: f64, loss: f64) -> f64 {
    if gain.is_nan() || loss.is_nan() {
        f64::NAN
    } else if loss == 0.0 {
        if gain == 0.0 { NEUTRAL_RSI } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + gain / loss)
    }
}

fn stochastic(rsi: &[f64], length: usize) -> Vec<f64> {
    let lows = rolling_min(rsi, length);
    let highs = rolling_max(rsi, length);

    rsi.iter()
        .zip(lows.iter().zip(&highs))
        .map(|(&value, (&low, &high))| {
            let range = high - low;
            if value.is_nan() || range.is_nan() || range == 0.0 {
                f64::NAN
            } else {
                100.0 * (value - low) / range
            }
        })
        .collect()
}
