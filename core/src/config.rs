//! Requester configuration.
//!
//! Every requester talks to the same backend root unless told otherwise.
//! `from_env` lets deployments point at another root or set a per-request
//! timeout without code changes.

use std::time::Duration;

/// Root URL shared by every requester.
pub const DEFAULT_BASE_URL: &str = "https://some-api-root.com.br";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "BACKEND_BASE_URL";

/// Environment variable holding a per-request timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "BACKEND_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterConfig {
    /// Base URL with any trailing `/` removed.
    pub base_url: String,
    /// Per-request timeout. `None` waits for as long as the transport does.
    pub timeout: Option<Duration>,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl RequesterConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to the defaults. A timeout that is not a whole
    /// number of milliseconds is ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup(BASE_URL_ENV) {
            Some(base_url) if !base_url.trim().is_empty() => Self::new(base_url.trim()),
            _ => Self::default(),
        };

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(millis) => config.timeout = Some(Duration::from_millis(millis)),
                Err(err) => {
                    tracing::warn!(key = TIMEOUT_ENV, value = %raw, error = %err, "ignoring malformed timeout");
                }
            }
        }

        config
    }
}
