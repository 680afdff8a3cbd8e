//! Simulated order execution.
//!
//! Nothing here talks to the exchange. [`LoggingSink`] records the intent
//! in the log and echoes it to stdout, standing in for an order gateway.

use std::io::Write;
use std::sync::Mutex;

use tracing::info;

use crate::Result;
use crate::models::trade::TradeIntent;

/// Receives trade intents produced by the signal cycle.
pub trait ExecutionSink {
    fn execute(&self, intent: &TradeIntent) -> Result<()>;
}

/// Logs each intent and writes a confirmation line to `out`.
pub struct LoggingSink<W: Write> {
    out: Mutex<W>,
}

impl LoggingSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> LoggingSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer, consuming the sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write> ExecutionSink for LoggingSink<W> {
    fn execute(&self, intent: &TradeIntent) -> Result<()> {
        info!(
            "Executing trade: {} {} {}",
            intent.side, intent.quantity, intent.symbol
        );
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(
            out,
            "Trade executed: {} {} {}",
            intent.side, intent.quantity, intent.symbol
        )?;
        Ok(())
    }
}
