//! Crate-level error types.
//!
//! [`StochbotError`] unifies every error source (configuration, HTTP,
//! JSON, the fetch outcomes and indicator evaluation) behind a single enum
//! so callers can match on the variant they care about while still using
//! the `?` operator for easy propagation.

use reqwest::StatusCode;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StochbotError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum StochbotError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// API credentials are required for the request but not configured.
    #[error("missing API credentials: WOOX_API_KEY and WOOX_API_SECRET must be set")]
    MissingCredentials,

    /// The HTTP request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// A successful response carried no rows.
    #[error("no data returned for {symbol} with interval {interval}")]
    EmptyResult { symbol: String, interval: String },

    /// Every attempt allowed by the retry policy failed.
    #[error("request for {target} failed after {attempts} attempts")]
    RetriesExhausted { target: String, attempts: u32 },

    /// A series is too short to fill the indicator windows.
    #[error("insufficient history: {len} bars, need at least {required}")]
    InsufficientHistory { len: usize, required: usize },

    /// Reading indicator values for the entry decision failed.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A payload had an unexpected shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failed (log file, stdout).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StochbotError {
    /// Whether the retry policy should try the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}
