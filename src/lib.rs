//! WOO X stochastic RSI signal bot.
//!
//! Fetches signed 1h, 15m and 5m candle series, computes a stochastic RSI
//! on each, and emits a simulated buy when all three are oversold. Also
//! exposes the signed trade-history endpoint for reporting.

pub mod auth;
pub mod bot;
pub mod config;
pub mod credentials;
pub mod error;
pub mod execution;
pub mod http;
pub mod indicators;
pub mod market_data;
pub mod models;
pub mod retry;
pub mod signal;

pub use error::{Result, StochbotError};
