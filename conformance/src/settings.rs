//! Session configuration read from the environment.
//!
//! # Design
//! `Settings` is constructed once per test binary and passed down explicitly.
//! Parsing goes through an injectable lookup so the rules can be tested
//! without touching the process environment. Every value is read strictly:
//! unset, empty and non-UTF-8 values are errors, never silently defaulted.

use std::ffi::OsString;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub const BASE_URL: &str = "BASE_URL";
pub const API_KEY: &str = "API_KEY";
pub const RATE_LIMITED_API_KEY: &str = "RATE_LIMITED_API_KEY";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fatal configuration problems, reported before any scenario runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{0} is set but empty")]
    Empty(&'static str),

    #[error("{0} must be valid UTF-8")]
    NotUnicode(&'static str),

    #[error("{name} must be a positive integer number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub rate_limited_api_key: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        rate_limited_api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            rate_limited_api_key: rate_limited_api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load an optional `.env` file, then read the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        match dotenv::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(_) => debug!("no .env file found"),
        }
        Self::from_lookup(|name| std::env::var_os(name))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, SettingsError> {
        let required = |name: &'static str| read(&lookup, name)?.ok_or(SettingsError::Missing(name));

        let base_url = required(BASE_URL)?;
        let api_key = required(API_KEY)?;
        let rate_limited_api_key = required(RATE_LIMITED_API_KEY)?;
        let timeout = match read(&lookup, REQUEST_TIMEOUT_SECS)? {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Ok(Self {
            base_url,
            api_key,
            rate_limited_api_key,
            timeout,
        })
    }
}

fn read(lookup: &impl Fn(&str) -> Option<OsString>, name: &'static str) -> Result<Option<String>, SettingsError> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value = raw.into_string().map_err(|_| SettingsError::NotUnicode(name))?;
    if value.trim().is_empty() {
        return Err(SettingsError::Empty(name));
    }
    Ok(Some(value))
}

fn parse_timeout(raw: &str) -> Result<Duration, SettingsError> {
    let invalid = || SettingsError::InvalidTimeout {
        name: REQUEST_TIMEOUT_SECS,
        value: raw.to_string(),
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
