//! WOO X API credentials from the system keychain.
//!
//! Environment variables always win. At startup
//! [`populate_env_from_keychain`] fills only the `WOOX_*` variables that are
//! unset or empty, so [`crate::config::fetch_config`] sees one source of
//! truth, and reports where the credentials for this run came from.

use std::fmt;

use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Keychain service the entries are stored under.
const SERVICE: &str = "stochbot";

/// One half of the WOO X API credential pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKey {
    ApiKey,
    ApiSecret,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 2] = [Self::ApiKey, Self::ApiSecret];

    /// Keychain entry name.
    pub fn keyring_id(self) -> &'static str {
        match self {
            Self::ApiKey => "woox_api_key",
            Self::ApiSecret => "woox_api_secret",
        }
    }

    /// Variable read by [`crate::config::fetch_config`].
    pub fn env_var(self) -> &'static str {
        match self {
            Self::ApiKey => "WOOX_API_KEY",
            Self::ApiSecret => "WOOX_API_SECRET",
        }
    }

    fn is_set_in_env(self) -> bool {
        std::env::var(self.env_var()).is_ok_and(|v| !v.is_empty())
    }
}

/// Where the credential pair for this run was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Keychain,
    /// One half from each.
    Mixed,
    /// Neither; signed requests will fail with `MissingCredentials`.
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::Keychain => "keychain",
            Self::Mixed => "environment and keychain",
            Self::Missing => "none",
        })
    }
}

/// Reads one entry from the keychain; `None` if absent or unreadable.
pub fn load(key: CredentialKey) -> Option<Zeroizing<String>> {
    let entry = match keyring::Entry::new(SERVICE, key.keyring_id()) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(key = key.keyring_id(), error = %e, "keychain unavailable");
            return None;
        }
    };
    match entry.get_password() {
        Ok(password) => Some(Zeroizing::new(password)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(key = key.keyring_id(), error = %e, "failed to read keychain entry");
            None
        }
    }
}

/// Copies keychain credentials into any unset `WOOX_*` variable.
///
/// Call from `main` after tracing is installed and before
/// [`crate::config::fetch_config`], while the process is single-threaded.
pub fn populate_env_from_keychain() -> CredentialSource {
    fill_missing_env(load)
}

fn fill_missing_env<F>(mut lookup: F) -> CredentialSource
where
    F: FnMut(CredentialKey) -> Option<Zeroizing<String>>,
{
    let (mut from_env, mut from_keychain) = (0, 0);
    for key in CredentialKey::ALL {
        if key.is_set_in_env() {
            from_env += 1;
            continue;
        }
        if let Some(value) = lookup(key) {
            debug!(var = key.env_var(), "filled from keychain");
            // SAFETY: only called before the runtime spawns other threads.
            unsafe {
                std::env::set_var(key.env_var(), value.as_str());
            }
            from_keychain += 1;
        }
    }

    match (from_env, from_keychain) {
        (0, 0) => CredentialSource::Missing,
        (_, 0) => CredentialSource::Environment,
        (0, _) => CredentialSource::Keychain,
        _ => CredentialSource::Mixed,
    }
}
