//! Application configuration loaded from environment variables.
//!
//! Credentials are read from:
//! - `WOOX_API_KEY`: API key sent in the `x-api-key` header
//! - `WOOX_API_SECRET`: secret used to sign requests
//!
//! Optional overrides:
//! - `WOOX_BASE_URL` (default `https://api.woox.io`)
//! - `STOCHBOT_SYMBOL` (default `PERP_LDO_USDT`)
//! - `STOCHBOT_CANDLE_LIMIT` (default 500)
//! - `STOCHBOT_MAX_RETRIES` (default 3)
//! - `STOCHBOT_RETRY_DELAY_SECS` (default 5)
//! - `STOCHBOT_LOG_FILE` (default `trading_bot.log`; empty logs to stdout)

use std::str::FromStr;
use std::time::Duration;

use crate::auth::Credentials;
use crate::retry::RetryPolicy;

/// Default public REST endpoint.
const DEFAULT_BASE_URL: &str = "https://api.woox.io";
const DEFAULT_SYMBOL: &str = "PERP_LDO_USDT";
const DEFAULT_CANDLE_LIMIT: u32 = 500;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_LOG_FILE: &str = "trading_bot.log";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub woox: WooxConfig,
    pub bot: BotConfig,
}

/// Exchange connection values.
#[derive(Debug)]
pub struct WooxConfig {
    pub base_url: String,
    pub credentials: Option<Credentials>,
}

/// Signal cycle values.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub symbol: String,
    pub candle_limit: u32,
    pub retry: RetryPolicy,
    /// `None` logs to stdout.
    pub log_file: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            candle_limit: DEFAULT_CANDLE_LIMIT,
            retry: RetryPolicy::fixed(
                DEFAULT_MAX_RETRIES,
                Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            ),
            log_file: Some(DEFAULT_LOG_FILE.to_string()),
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// API credentials are optional at load time (requests that need them
/// fail later with [`StochbotError::MissingCredentials`](crate::StochbotError::MissingCredentials)),
/// but when one is set both must be present.
///
/// # Errors
///
/// Returns [`StochbotError::Config`](crate::StochbotError::Config) if only
/// one of the two credential variables is set or a numeric override does
/// not parse.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url = non_empty_var("WOOX_BASE_URL")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let api_key = non_empty_var("WOOX_API_KEY");
    let api_secret = non_empty_var("WOOX_API_SECRET");

    let credentials = match (api_key, api_secret) {
        (Some(key), Some(secret)) => Some(Credentials::new(key, secret)),
        (Some(_), None) => {
            return Err(crate::StochbotError::Config(
                "WOOX_API_KEY is set but WOOX_API_SECRET is missing".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(crate::StochbotError::Config(
                "WOOX_API_SECRET is set but WOOX_API_KEY is missing".to_string(),
            ));
        }
        (None, None) => None,
    };

    let defaults = BotConfig::default();
    let max_retries = parsed_var("STOCHBOT_MAX_RETRIES")?.unwrap_or(DEFAULT_MAX_RETRIES);
    if max_retries == 0 {
        return Err(crate::StochbotError::Config(
            "STOCHBOT_MAX_RETRIES must be at least 1".to_string(),
        ));
    }
    let delay_secs = parsed_var("STOCHBOT_RETRY_DELAY_SECS")?.unwrap_or(DEFAULT_RETRY_DELAY_SECS);

    Ok(AppConfig {
        woox: WooxConfig {
            base_url,
            credentials,
        },
        bot: BotConfig {
            symbol: non_empty_var("STOCHBOT_SYMBOL").unwrap_or(defaults.symbol),
            candle_limit: parsed_var("STOCHBOT_CANDLE_LIMIT")?.unwrap_or(defaults.candle_limit),
            retry: RetryPolicy::fixed(max_retries, Duration::from_secs(delay_secs)),
            log_file: log_file(),
        },
    })
}

/// Log destination from `STOCHBOT_LOG_FILE`; `None` means stdout.
///
/// Readable on its own so logging can start before credentials are
/// resolved.
pub fn log_file() -> Option<String> {
    match std::env::var("STOCHBOT_LOG_FILE") {
        Ok(path) if path.is_empty() => None,
        Ok(path) => Some(path),
        Err(_) => Some(DEFAULT_LOG_FILE.to_string()),
    }
}

/// Serializes env mutation across the crate's test modules.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parses a non-empty environment variable.
fn parsed_var<T: FromStr>(name: &str) -> crate::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    non_empty_var(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                crate::StochbotError::Config(format!("{name}={raw:?} is invalid: {e}"))
            })
        })
        .transpose()
}
