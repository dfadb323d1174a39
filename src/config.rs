//! Configuration options for the guard portal client

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration options for the guard portal client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend base URL; resources live under `/api/`
    pub base_url: String,

    /// Separate backend for the `guard/*` account endpoints, if any
    pub auth_url: Option<String>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Retries after the first attempt of a read
    pub max_retries: u32,

    /// Wait between read attempts
    pub retry_delay: Duration,

    /// Quiet period before a vehicle search is sent
    pub search_debounce: Duration,

    /// How often the expiring-permission check runs
    pub expiry_poll_interval: Duration,

    /// File the session is persisted to; in memory when `None`
    pub session_path: Option<PathBuf>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: None,
            request_timeout: Some(Duration::from_secs(30)),
            max_retries: 3,
            retry_delay: Duration::from_millis(2000),
            search_debounce: Duration::from_millis(300),
            expiry_poll_interval: Duration::from_secs(60),
            session_path: None,
        }
    }
}

impl ClientOptions {
    /// Set the backend base URL
    pub fn with_base_url(mut self, value: &str) -> Self {
        self.base_url = value.to_string();
        self
    }

    /// Send account requests to a different backend
    pub fn with_auth_url(mut self, value: &str) -> Self {
        self.auth_url = Some(value.to_string());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the number of retries for reads
    pub fn with_max_retries(mut self, value: u32) -> Self {
        self.max_retries = value;
        self
    }

    pub fn with_retry_delay(mut self, value: Duration) -> Self {
        self.retry_delay = value;
        self
    }

    pub fn with_search_debounce(mut self, value: Duration) -> Self {
        self.search_debounce = value;
        self
    }

    pub fn with_expiry_poll_interval(mut self, value: Duration) -> Self {
        self.expiry_poll_interval = value;
        self
    }

    /// Persist the session to `path`
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Options from `GUARD_PORTAL_*` environment variables
    ///
    /// Unset variables keep their defaults; set but malformed ones are an
    /// error.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Some(url) = env_var("GUARD_PORTAL_URL") {
            options.base_url = url;
        }
        options.auth_url = env_var("GUARD_PORTAL_AUTH_URL");
        if let Some(secs) = parse_env::<u64>("GUARD_PORTAL_TIMEOUT_SECS")? {
            options.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(retries) = parse_env("GUARD_PORTAL_MAX_RETRIES")? {
            options.max_retries = retries;
        }
        if let Some(ms) = parse_env("GUARD_PORTAL_RETRY_DELAY_MS")? {
            options.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_env("GUARD_PORTAL_SEARCH_DEBOUNCE_MS")? {
            options.search_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_env("GUARD_PORTAL_EXPIRY_POLL_SECS")? {
            options.expiry_poll_interval = Duration::from_secs(secs);
        }
        options.session_path = env_var("GUARD_PORTAL_SESSION_FILE").map(PathBuf::from);

        Ok(options)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::config(format!("{} is not a valid value: {}", name, raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.retry_delay, Duration::from_millis(2000));
        assert_eq!(options.search_debounce, Duration::from_millis(300));
        assert!(options.session_path.is_none());
    }

    #[test]
    fn test_builders() {
        let options = ClientOptions::default()
            .with_base_url("https://portal.example.com")
            .with_max_retries(0)
            .with_session_path("/tmp/guard-session.json");
        assert_eq!(options.base_url, "https://portal.example.com");
        assert_eq!(options.max_retries, 0);
        assert_eq!(
            options.session_path,
            Some(PathBuf::from("/tmp/guard-session.json"))
        );
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("GUARD_PORTAL_URL", "https://env.example.com");
        std::env::set_var("GUARD_PORTAL_MAX_RETRIES", "5");
        let options = ClientOptions::from_env().unwrap();
        assert_eq!(options.base_url, "https://env.example.com");
        assert_eq!(options.max_retries, 5);

        std::env::set_var("GUARD_PORTAL_MAX_RETRIES", "many");
        assert!(matches!(ClientOptions::from_env(), Err(Error::Config(_))));

        std::env::remove_var("GUARD_PORTAL_URL");
        std::env::remove_var("GUARD_PORTAL_MAX_RETRIES");
    }
}
