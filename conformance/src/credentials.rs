//! Where a scenario puts its API key, and which key it puts there.
//!
//! Credentials are declared symbolically (`Valid`, `RateLimited`, a literal)
//! and resolved against `Settings` only when a call is built, so the catalog
//! never holds real keys.

use std::fmt;

use newsapi_core::{Headers, ParamValue, QueryParams};

use crate::settings::Settings;

pub const X_API_KEY: &str = "X-API-KEY";
pub const AUTHORIZATION: &str = "Authorization";
pub const API_KEY_PARAM: &str = "apiKey";

/// One of the three places an API key may be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    XApiKey,
    Authorization { bearer: bool },
    QueryParam,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::XApiKey => f.write_str("x_api_key_header"),
            Slot::Authorization { bearer: false } => f.write_str("authorization_header"),
            Slot::Authorization { bearer: true } => f.write_str("bearer_authorization_header"),
            Slot::QueryParam => f.write_str("query_param"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    /// The primary key from `Settings`.
    Valid,
    /// The rate-limited key from `Settings`.
    RateLimited,
    Literal(String),
    /// Present but without a value.
    Null,
}

impl KeyValue {
    pub fn literal(value: impl Into<String>) -> Self {
        KeyValue::Literal(value.into())
    }

    fn resolve(&self, settings: &Settings) -> Option<String> {
        match self {
            KeyValue::Valid => Some(settings.api_key.clone()),
            KeyValue::RateLimited => Some(settings.rate_limited_api_key.clone()),
            KeyValue::Literal(value) => Some(value.clone()),
            KeyValue::Null => None,
        }
    }
}

/// Headers and query parameters carrying a scenario's credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub headers: Headers,
    pub params: QueryParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    entries: Vec<(Slot, KeyValue)>,
}

impl Credentials {
    /// Anonymous: no key in any slot.
    pub fn none() -> Self {
        Self::default()
    }

    /// The primary key in `X-API-KEY`, as used by the shared session client.
    pub fn session() -> Self {
        Self::single(Slot::XApiKey, KeyValue::Valid)
    }

    pub fn single(slot: Slot, key: KeyValue) -> Self {
        Self::none().with(slot, key)
    }

    pub fn with(mut self, slot: Slot, key: KeyValue) -> Self {
        self.entries.push((slot, key));
        self
    }

    pub fn entries(&self) -> &[(Slot, KeyValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A header slot with `Null` becomes an empty header value; the query slot
    /// with `Null` becomes a null parameter.
    pub fn resolve(&self, settings: &Settings) -> ResolvedCredentials {
        let mut resolved = ResolvedCredentials::default();
        for (slot, key) in &self.entries {
            let value = key.resolve(settings);
            match slot {
                Slot::XApiKey => resolved.headers.insert(X_API_KEY, value.unwrap_or_default()),
                Slot::Authorization { bearer } => {
                    let value = value.unwrap_or_default();
                    let value = if *bearer { format!("Bearer {value}") } else { value };
                    resolved.headers.insert(AUTHORIZATION, value);
                }
                Slot::QueryParam => resolved.params.set(API_KEY_PARAM, ParamValue::from(value)),
            }
        }
        resolved
    }
}
