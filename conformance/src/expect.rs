//! The single assertion routine every scenario goes through.
//!
//! # Design
//! An `Outcome` describes what a response must look like; `check` compares a
//! response against it and returns the first difference as a `Mismatch`.
//! Nothing here panics, so the runner can report every scenario of a batch
//! rather than stopping at the first failure.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use newsapi_core::HttpResponse;
use serde_json::Value;
use thiserror::Error;

use crate::envelope::{
    Endpoint, Envelope, ErrorCode, ResponseStatus, ARTICLE_FIELDS, ARTICLE_SOURCE_FIELDS, SOURCE_FIELDS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountRule {
    Any,
    NonEmpty,
    Empty,
    Exactly(usize),
}

impl CountRule {
    fn holds(self, count: usize) -> bool {
        match self {
            CountRule::Any => true,
            CountRule::NonEmpty => count > 0,
            CountRule::Empty => count == 0,
            CountRule::Exactly(n) => count == n,
        }
    }

    fn describe(self) -> String {
        match self {
            CountRule::Any => "any number of items".to_string(),
            CountRule::NonEmpty => "at least one item".to_string(),
            CountRule::Empty => "no items".to_string(),
            CountRule::Exactly(n) => format!("exactly {n} items"),
        }
    }
}

/// Inclusive bounds on every article's `publishedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishedWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl PublishedWindow {
    fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| instant >= from) && self.to.is_none_or(|to| instant <= to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessShape {
    pub endpoint: Endpoint,
    pub count: CountRule,
    pub total_results: bool,
    pub exact_fields: bool,
    pub field_equals: Vec<(String, String)>,
    pub window: Option<PublishedWindow>,
}

impl SuccessShape {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            count: CountRule::Any,
            total_results: false,
            exact_fields: false,
            field_equals: Vec::new(),
            window: None,
        }
    }

    pub fn count(mut self, count: CountRule) -> Self {
        self.count = count;
        self
    }

    /// Require `totalResults` to be present and non-negative.
    pub fn with_total_results(mut self) -> Self {
        self.total_results = true;
        self
    }

    /// Require every item to expose exactly the documented field set.
    pub fn with_exact_fields(mut self) -> Self {
        self.exact_fields = true;
        self
    }

    pub fn where_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_equals.push((field.into(), value.into()));
        self
    }

    pub fn published_within(mut self, window: PublishedWindow) -> Self {
        self.window = Some(window);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRule {
    Exact(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureShape {
    pub status: u16,
    pub code: Option<ErrorCode>,
    pub message: Option<MessageRule>,
}

impl FailureShape {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            code: None,
            message: None,
        }
    }

    pub fn code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(MessageRule::Exact(message.into()));
        self
    }

    pub fn message_containing(mut self, fragment: impl Into<String>) -> Self {
        self.message = Some(MessageRule::Contains(fragment.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(SuccessShape),
    Failure(FailureShape),
    /// Passes when any alternative passes.
    AnyOf(Vec<Outcome>),
}

impl From<SuccessShape> for Outcome {
    fn from(shape: SuccessShape) -> Self {
        Outcome::Success(shape)
    }
}

impl From<FailureShape> for Outcome {
    fn from(shape: FailureShape) -> Self {
        Outcome::Failure(shape)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("{field}: expected {expected}, got {actual}")]
    Field {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("body is not a response envelope: {0}")]
    Body(String),

    #[error("no alternative matched: {}", render(.0))]
    NoAlternative(Vec<Mismatch>),
}

impl Mismatch {
    fn field(field: impl Into<String>, expected: impl ToString, actual: impl ToString) -> Self {
        Mismatch::Field {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

fn render(misses: &[Mismatch]) -> String {
    misses.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

pub fn check(outcome: &Outcome, response: &HttpResponse) -> Result<(), Mismatch> {
    match outcome {
        Outcome::Success(shape) => check_success(shape, response),
        Outcome::Failure(shape) => check_failure(shape, response),
        Outcome::AnyOf(alternatives) => {
            let mut misses = Vec::with_capacity(alternatives.len());
            for alternative in alternatives {
                match check(alternative, response) {
                    Ok(()) => return Ok(()),
                    Err(miss) => misses.push(miss),
                }
            }
            Err(Mismatch::NoAlternative(misses))
        }
    }
}

fn envelope(response: &HttpResponse) -> Result<Envelope, Mismatch> {
    Envelope::parse(response).map_err(|e| Mismatch::Body(e.to_string()))
}

fn check_success(shape: &SuccessShape, response: &HttpResponse) -> Result<(), Mismatch> {
    if response.status != 200 {
        return Err(Mismatch::field("status code", 200, response.status));
    }
    let envelope = envelope(response)?;
    if envelope.status != ResponseStatus::Ok {
        return Err(Mismatch::field("status", ResponseStatus::Ok.as_str(), envelope.status.as_str()));
    }

    let list_field = shape.endpoint.list_field();
    let items = envelope
        .items(shape.endpoint)
        .ok_or_else(|| Mismatch::field(list_field, "a list", "nothing"))?;
    if !shape.count.holds(items.len()) {
        return Err(Mismatch::field(list_field, shape.count.describe(), format!("{} items", items.len())));
    }

    if shape.total_results {
        match envelope.total_results {
            Some(total) if total >= 0 => {}
            Some(total) => return Err(Mismatch::field("totalResults", ">= 0", total)),
            None => return Err(Mismatch::field("totalResults", ">= 0", "nothing")),
        }
    }

    for (index, item) in items.iter().enumerate() {
        if shape.exact_fields {
            check_fields(shape.endpoint, index, item)?;
        }
        for (field, expected) in &shape.field_equals {
            let actual = item.get(field).and_then(Value::as_str).unwrap_or("<missing>");
            if actual != expected {
                return Err(Mismatch::field(format!("{list_field}[{index}].{field}"), expected, actual));
            }
        }
        if let Some(window) = &shape.window {
            let raw = item.get("publishedAt").and_then(Value::as_str).unwrap_or_default();
            let published = parse_instant(raw)
                .ok_or_else(|| Mismatch::field(format!("{list_field}[{index}].publishedAt"), "a timestamp", raw))?;
            if !window.contains(published) {
                return Err(Mismatch::field(
                    format!("{list_field}[{index}].publishedAt"),
                    describe_window(window),
                    raw,
                ));
            }
        }
    }
    Ok(())
}

fn key_set(value: &Value) -> BTreeSet<&str> {
    value.as_object().map(|o| o.keys().map(String::as_str).collect()).unwrap_or_default()
}

fn check_fields(endpoint: Endpoint, index: usize, item: &Value) -> Result<(), Mismatch> {
    let (expected, path): (&[&str], String) = match endpoint {
        Endpoint::Sources => (SOURCE_FIELDS, format!("sources[{index}]")),
        Endpoint::Everything | Endpoint::TopHeadlines => (ARTICLE_FIELDS, format!("articles[{index}]")),
    };
    compare_keys(&path, expected, item)?;
    if endpoint != Endpoint::Sources {
        let source = item.get("source").unwrap_or(&Value::Null);
        compare_keys(&format!("{path}.source"), ARTICLE_SOURCE_FIELDS, source)?;
    }
    Ok(())
}

fn compare_keys(path: &str, expected: &[&str], value: &Value) -> Result<(), Mismatch> {
    let actual = key_set(value);
    let expected: BTreeSet<&str> = expected.iter().copied().collect();
    if actual != expected {
        return Err(Mismatch::field(format!("{path} fields"), format!("{expected:?}"), format!("{actual:?}")));
    }
    Ok(())
}

fn describe_window(window: &PublishedWindow) -> String {
    let bound = |b: Option<DateTime<Utc>>| b.map_or_else(|| "..".to_string(), |d| d.to_rfc3339());
    format!("within [{}, {}]", bound(window.from), bound(window.to))
}

fn check_failure(shape: &FailureShape, response: &HttpResponse) -> Result<(), Mismatch> {
    if response.status != shape.status {
        return Err(Mismatch::field("status code", shape.status, response.status));
    }
    let envelope = envelope(response)?;
    if envelope.status != ResponseStatus::Error {
        return Err(Mismatch::field("status", ResponseStatus::Error.as_str(), envelope.status.as_str()));
    }
    if let Some(code) = shape.code {
        let actual = envelope.code.map_or("nothing", ErrorCode::as_str);
        if envelope.code != Some(code) {
            return Err(Mismatch::field("code", code, actual));
        }
    }
    let message = envelope.message.as_deref().unwrap_or_default();
    match &shape.message {
        Some(MessageRule::Exact(expected)) if message != expected.as_str() => {
            Err(Mismatch::field("message", format!("{expected:?}"), format!("{message:?}")))
        }
        Some(MessageRule::Contains(fragment)) if !message.contains(fragment.as_str()) => {
            Err(Mismatch::field("message", format!("containing {fragment:?}"), format!("{message:?}")))
        }
        _ => Ok(()),
    }
}

/// Parse a timestamp the way the API accepts `from`/`to`: RFC 3339, a naive
/// date-time taken as UTC, or a bare date at midnight UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(raw) {
        return Some(aware.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc())
}
