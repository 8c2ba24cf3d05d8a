//! Request construction shared by both client variants.
//!
//! # Design
//! `RequestBuilder` holds only immutable configuration and carries no state
//! between calls. It turns a `RequestCall` into a fully composed
//! `HttpRequest`: URL joined, headers merged, payload serialized. Executing
//! that request is the transport's job, so the blocking and async clients
//! share this code unchanged.

use std::time::Duration;

use serde_json::Value;

use crate::error::ClientError;
use crate::http::{Headers, HttpMethod, HttpRequest, ParamValue, QueryParams};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_headers: Headers,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            default_headers: Headers::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    pub fn with_default_headers(mut self, headers: Headers) -> Self {
        self.default_headers = self.default_headers.merged(&headers);
        self
    }
}

/// One call against the API, before it is joined with the client configuration.
#[derive(Debug, Clone)]
pub struct RequestCall {
    pub method: HttpMethod,
    pub endpoint: String,
    pub headers: Headers,
    pub params: QueryParams,
    pub payload: Option<Value>,
}

impl RequestCall {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: Headers::new(),
            params: QueryParams::new(),
            payload: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = self.headers.merged(&headers);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = self.params.merged(&params);
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Stateless builder turning `RequestCall`s into `HttpRequest`s.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: ClientConfig,
}

impl RequestBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        join_url(&self.config.base_url, endpoint)
    }

    pub fn build(&self, call: RequestCall) -> Result<HttpRequest, ClientError> {
        let mut headers = self.config.default_headers.merged(&call.headers);
        let body = match call.payload {
            Some(payload) => {
                let body =
                    serde_json::to_string(&payload).map_err(|e| ClientError::Serialization(e.to_string()))?;
                if !headers.contains("content-type") {
                    headers.insert("content-type", "application/json");
                }
                Some(body)
            }
            None => None,
        };
        Ok(HttpRequest {
            method: call.method,
            url: self.url_for(&call.endpoint),
            headers,
            params: call.params,
            body,
            timeout: self.config.timeout,
        })
    }
}

/// Join with exactly one slash: drop one trailing slash from `base` and one
/// leading slash from `endpoint`.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    format!("{base}/{endpoint}")
}
