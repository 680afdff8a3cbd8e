//! WOO X REST API request signing.
//!
//! Private endpoints expect three headers on every request:
//! `x-api-key`, `x-api-timestamp` (milliseconds since the epoch) and
//! `x-api-signature`, the hex HMAC-SHA256 of `"{query_string}|{timestamp}"`
//! keyed with the API secret. The query string must be byte-identical to
//! the one sent, so parameter order is fixed by the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::Result;

/// API key pair used to sign requests.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    /// Builds the authentication headers for `query` at `timestamp_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`StochbotError::MalformedMessage`](crate::StochbotError::MalformedMessage)
    /// if the HMAC key cannot be constructed.
    pub fn sign_headers(&self, query: &str, timestamp_ms: u64) -> Result<Vec<(&'static str, String)>> {
        let signature = sign(&self.api_secret, query, timestamp_ms)?;
        Ok(vec![
            ("x-api-key", self.api_key.clone()),
            ("x-api-signature", signature),
            ("x-api-timestamp", timestamp_ms.to_string()),
            ("Content-Type", "application/json".to_string()),
        ])
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Ordered `key=value` pairs forming a signed query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair. Empty values are kept; see [`QueryParams::without_empty`].
    pub fn push(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Drops pairs whose value is empty.
    pub fn without_empty(mut self) -> Self {
        self.pairs.retain(|(_, v)| !v.is_empty());
        self
    }

    /// Reorders pairs by key, ascending.
    pub fn sorted(mut self) -> Self {
        self.pairs.sort_by(|a, b| a.0.cmp(b.0));
        self
    }

    /// Joins the pairs as `k1=v1&k2=v2` in their current order.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Milliseconds since the Unix epoch.
pub fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Computes the `x-api-signature` header value.
///
/// Algorithm: `Hex(HMAC-SHA256(secret, query + "|" + timestamp))`
pub fn sign(api_secret: &str, query: &str, timestamp_ms: u64) -> Result<String> {
    hmac_sha256_hex(api_secret, &format!("{query}|{timestamp_ms}"))
}

fn hmac_sha256_hex(key: &str, payload: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
        .map_err(|e| crate::StochbotError::MalformedMessage(format!("invalid HMAC key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
