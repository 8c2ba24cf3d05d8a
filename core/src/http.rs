//! HTTP transport types shared by the blocking and async clients.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! request builder in `client` produces an `HttpRequest`; a transport turns it
//! into network I/O and hands back an `HttpResponse`. Nothing in here
//! interprets status codes: a 401 is as ordinary a response as a 200.
//!
//! Query parameters are kept in the shape the caller supplied them
//! (`ParamValue`), and only flattened into wire pairs by the transport.

use std::time::Duration;

use serde_json::Value;

use crate::error::ClientError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ClientError::InvalidRequest(format!("unsupported method: {other}"))),
        }
    }
}

/// Ordered header list with case-insensitive keys.
///
/// `insert` replaces any existing entry whose name matches ignoring ASCII
/// case, so at most one value is kept per header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a header. An existing entry keeps its position but
    /// takes the new name spelling and value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| existing.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overlay `overrides` on top of `self`; the override wins on collision.
    pub fn merged(&self, overrides: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.insert(name, value);
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A single query parameter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Present with no value; sent as `key=`.
    Null,
    Text(String),
    Int(i64),
    /// Sent as one pair per element. An empty list sends nothing.
    List(Vec<String>),
}

impl ParamValue {
    /// Wire values for this parameter, in order.
    pub fn wire_values(&self) -> Vec<String> {
        match self {
            ParamValue::Null => vec![String::new()],
            ParamValue::Text(text) => vec![text.clone()],
            ParamValue::Int(n) => vec![n.to_string()],
            ParamValue::List(items) => items.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

/// Ordered query parameters. Setting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
    }

    /// Overlay `other` on top of `self`; `other` wins on collision.
    pub fn merged(&self, other: &QueryParams) -> QueryParams {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            merged.set(key.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Flatten into `(key, value)` wire pairs. Used by transports only.
    pub fn wire_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|(key, value)| {
                value.wire_values().into_iter().map(move |item| (key.clone(), item))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RequestBuilder::build`. The URL is already joined and the headers
/// already merged; query parameters are still in caller form.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub params: QueryParams,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// An HTTP response described as plain data.
///
/// Returned for every status code, including 4xx and 5xx.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Deserialization(e.to_string()))
    }

    /// Parse the body into a typed value.
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_insert_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("X-API-KEY", "one");
        headers.insert("x-api-key", "two");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Api-Key"), Some("two"));
    }

    #[test]
    fn merged_headers_prefer_overrides() {
        let defaults = Headers::new().with("X-API-KEY", "default").with("Accept", "application/json");
        let overrides = Headers::new().with("x-api-key", "call");
        let merged = defaults.merged(&overrides);
        let entries: Vec<_> = merged.iter().collect();
        assert_eq!(entries, vec![("x-api-key", "call"), ("Accept", "application/json")]);
    }

    #[test]
    fn param_values_flatten_to_wire_pairs() {
        let params = QueryParams::new()
            .with("q", "bitcoin")
            .with("page", 2)
            .with("language", ParamValue::Null)
            .with("sources", vec!["a".to_string(), "b".to_string()])
            .with("domains", Vec::<String>::new());
        assert_eq!(
            params.wire_pairs(),
            vec![
                ("q".to_string(), "bitcoin".to_string()),
                ("page".to_string(), "2".to_string()),
                ("language".to_string(), String::new()),
                ("sources".to_string(), "a".to_string()),
                ("sources".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn setting_a_param_twice_replaces_it() {
        let params = QueryParams::new().with("page", 1).with("page", 3);
        assert_eq!(params.get("page"), Some(&ParamValue::Int(3)));
        assert_eq!(params.wire_pairs().len(), 1);
    }

    #[test]
    fn none_becomes_null_param() {
        let value: ParamValue = Option::<&str>::None.into();
        assert_eq!(value, ParamValue::Null);
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 401,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: r#"{"status":"error"}"#.to_string(),
        };
        assert!(!response.is_success());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.json().unwrap()["status"], "error");
    }
}
