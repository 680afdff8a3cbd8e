//! Columnar technical indicators over candle series.
//!
//! Every rolling helper here is causal: the value at index `i` depends
//! only on inputs at indices `<= i`. A window that is not yet full, or
//! that contains a NaN, produces NaN.

pub mod stoch_rsi;

pub use stoch_rsi::{IndicatorFrame, IndicatorParams, compute_indicators};

/// Applies `reduce` to each full trailing window of `values`.
fn rolling(values: &[f64], window: usize, reduce: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return f64::NAN;
            }
            let slice = &values[i + 1 - window..=i];
            if slice.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                reduce(slice)
            }
        })
        .collect()
}

/// Simple moving average.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing minimum.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Trailing maximum.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}
