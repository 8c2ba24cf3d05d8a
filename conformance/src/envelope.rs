//! Response envelope model: status, result lists and error details.

use std::fmt;

use newsapi_core::{ClientError, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ARTICLE_FIELDS: &[&str] =
    &["source", "author", "title", "description", "url", "urlToImage", "publishedAt", "content"];
pub const ARTICLE_SOURCE_FIELDS: &[&str] = &["id", "name"];
pub const SOURCE_FIELDS: &[&str] = &["id", "name", "description", "url", "category", "language", "country"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Everything,
    TopHeadlines,
    Sources,
}

impl Endpoint {
    /// Path relative to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Everything => "/everything",
            Endpoint::TopHeadlines => "/top-headlines",
            Endpoint::Sources => "/top-headlines/sources",
        }
    }

    /// Name of the result list in a successful envelope.
    pub fn list_field(self) -> &'static str {
        match self {
            Endpoint::Everything | Endpoint::TopHeadlines => "articles",
            Endpoint::Sources => "sources",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStatus::Ok => "ok",
            ResponseStatus::Error => "error",
        }
    }
}

/// Error codes the API documents. Codes it adds later parse as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    ApiKeyDisabled,
    ApiKeyExhausted,
    ApiKeyInvalid,
    ApiKeyMissing,
    ParameterInvalid,
    ParametersMissing,
    RateLimited,
    SourcesTooMany,
    SourceDoesNotExist,
    MaximumResultsReached,
    PageCannotBeLessThanOne,
    QueryMalformed,
    QueryTooLong,
    UnexpectedError,
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ApiKeyDisabled => "apiKeyDisabled",
            ErrorCode::ApiKeyExhausted => "apiKeyExhausted",
            ErrorCode::ApiKeyInvalid => "apiKeyInvalid",
            ErrorCode::ApiKeyMissing => "apiKeyMissing",
            ErrorCode::ParameterInvalid => "parameterInvalid",
            ErrorCode::ParametersMissing => "parametersMissing",
            ErrorCode::RateLimited => "rateLimited",
            ErrorCode::SourcesTooMany => "sourcesTooMany",
            ErrorCode::SourceDoesNotExist => "sourceDoesNotExist",
            ErrorCode::MaximumResultsReached => "maximumResultsReached",
            ErrorCode::PageCannotBeLessThanOne => "pageCannotBeLessThanOne",
            ErrorCode::QueryMalformed => "queryMalformed",
            ErrorCode::QueryTooLong => "queryTooLong",
            ErrorCode::UnexpectedError => "unexpectedError",
            ErrorCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level response object. Result items stay as raw JSON so their exact
/// field sets can be checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status: ResponseStatus,
    pub total_results: Option<i64>,
    pub articles: Option<Vec<Value>>,
    pub sources: Option<Vec<Value>>,
    pub code: Option<ErrorCode>,
    pub message: Option<String>,
}

impl Envelope {
    pub fn parse(response: &HttpResponse) -> Result<Self, ClientError> {
        response.json_as()
    }

    pub fn items(&self, endpoint: Endpoint) -> Option<&[Value]> {
        match endpoint {
            Endpoint::Everything | Endpoint::TopHeadlines => self.articles.as_deref(),
            Endpoint::Sources => self.sources.as_deref(),
        }
    }
}
