//! API key resolution across the three credential slots.
//!
//! The `apiKey` query parameter is authoritative whenever it is sent, even
//! when empty. Without it, `X-API-KEY` and `Authorization` (with or without a
//! `Bearer ` prefix) are consulted and any valid key is accepted.

use axum::http::HeaderMap;

use crate::error::ApiError;
use crate::query::Params;
use crate::MockConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyStatus {
    Valid,
    RateLimited,
    Invalid,
}

fn classify(config: &MockConfig, key: &str) -> KeyStatus {
    if config.rate_limited_keys.iter().any(|k| k == key) {
        KeyStatus::RateLimited
    } else if config.api_keys.iter().any(|k| k == key) {
        KeyStatus::Valid
    } else {
        KeyStatus::Invalid
    }
}

fn header_keys(headers: &HeaderMap) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(value) = headers.get("x-api-key") {
        keys.push(value.to_str().unwrap_or_default().to_string());
    }
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        let raw = value.to_str().unwrap_or_default();
        keys.push(raw.strip_prefix("Bearer ").unwrap_or(raw).to_string());
    }
    keys
}

pub fn authenticate(config: &MockConfig, headers: &HeaderMap, params: &Params) -> Result<(), ApiError> {
    let statuses: Vec<KeyStatus> = match params.first("apiKey") {
        Some(key) => vec![classify(config, key)],
        None => header_keys(headers).iter().map(|key| classify(config, key)).collect(),
    };
    if statuses.is_empty() {
        return Err(ApiError::api_key_missing());
    }
    if statuses.contains(&KeyStatus::Valid) {
        Ok(())
    } else if statuses.contains(&KeyStatus::RateLimited) {
        Err(ApiError::rate_limited())
    } else {
        Err(ApiError::api_key_invalid())
    }
}
