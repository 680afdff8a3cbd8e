//! Multi-timeframe entry condition.
//!
//! The bot enters when the latest stochastic RSI `k` is oversold on the
//! 1h, 15m and 5m frames at the same time.

use tracing::{debug, error};

use crate::indicators::IndicatorFrame;
use crate::{Result, StochbotError};

/// `k` must be strictly below this on every frame.
pub const ENTRY_THRESHOLD: f64 = 20.0;

/// Latest `k` per timeframe for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntrySignal {
    pub k_1h: f64,
    pub k_15m: f64,
    pub k_5m: f64,
}

impl EntrySignal {
    /// Reads the last `k` of each frame.
    ///
    /// # Errors
    ///
    /// Returns [`StochbotError::Evaluation`] when a frame is absent or its
    /// last `k` is missing or NaN.
    pub fn from_frames(
        frame_1h: Option<&IndicatorFrame>,
        frame_15m: Option<&IndicatorFrame>,
        frame_5m: Option<&IndicatorFrame>,
    ) -> Result<Self> {
        Ok(Self {
            k_1h: last_k("1h", frame_1h)?,
            k_15m: last_k("15m", frame_15m)?,
            k_5m: last_k("5m", frame_5m)?,
        })
    }

    /// True when all three values are below [`ENTRY_THRESHOLD`].
    pub fn is_entry(&self) -> bool {
        [self.k_1h, self.k_15m, self.k_5m]
            .iter()
            .all(|k| *k < ENTRY_THRESHOLD)
    }
}

fn last_k(label: &str, frame: Option<&IndicatorFrame>) -> Result<f64> {
    let frame =
        frame.ok_or_else(|| StochbotError::Evaluation(format!("{label} frame is missing")))?;
    match frame.last_k() {
        Some(k) if k.is_finite() => Ok(k),
        Some(_) => Err(StochbotError::Evaluation(format!("{label} k is NaN"))),
        None => Err(StochbotError::Evaluation(format!("{label} frame has no bars"))),
    }
}

/// Evaluates the entry condition, defaulting to `false` on any error.
pub fn check_entry(
    frame_1h: Option<&IndicatorFrame>,
    frame_15m: Option<&IndicatorFrame>,
    frame_5m: Option<&IndicatorFrame>,
) -> bool {
    match EntrySignal::from_frames(frame_1h, frame_15m, frame_5m) {
        Ok(signal) => {
            debug!(
                k_1h = signal.k_1h,
                k_15m = signal.k_15m,
                k_5m = signal.k_5m,
                "evaluated entry signal"
            );
            signal.is_entry()
        }
        Err(e) => {
            error!("Error checking entry conditions: {e}");
            false
        }
    }
}
