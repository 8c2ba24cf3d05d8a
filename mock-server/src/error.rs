//! Error envelopes returned by the reference server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub const API_KEY_MISSING: &str =
    "Your API key is missing. Append this to the URL with the apiKey param, or use the x-api-key HTTP header.";
pub const API_KEY_INVALID: &str =
    "Your API key is invalid or incorrect. Check your key, or go to https://newsapi.org to create a free API key.";
pub const RATE_LIMITED: &str = "You have made too many requests recently. Developer accounts are limited to 100 \
     requests over a 24 hour period (50 requests available every 12 hours). Please upgrade to a paid plan if you \
     need more requests.";
pub const EVERYTHING_SCOPE_MISSING: &str = "Required parameters are missing, the scope of your search is too \
     broad. Please set any of the following required parameters and try again: q, qInTitle, sources, domains.";
pub const HEADLINES_SCOPE_MISSING: &str = "Required parameters are missing. Please set any of the following \
     parameters and try again: sources, q, language, country, category.";
pub const QUERY_MALFORMED: &str = "Your query may be malformed - please check that all special chars (including \
     &) in the query are URL escaped, and that it doesn't end with the OR or AND keyword.";
pub const REQUEST_INVALID: &str = "The request is invalid.";
pub const PAGE_SIZE_TOO_SMALL: &str = "The pageSize parameter cannot be less than 1.";

/// A `status: "error"` envelope with its HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn api_key_missing() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "apiKeyMissing", API_KEY_MISSING)
    }

    pub fn api_key_invalid() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "apiKeyInvalid", API_KEY_INVALID)
    }

    pub fn rate_limited() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "rateLimited", RATE_LIMITED)
    }

    pub fn parameters_missing(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "parametersMissing", message)
    }

    pub fn parameter_invalid(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "parameterInvalid", message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "notFound", "The requested endpoint does not exist.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}
