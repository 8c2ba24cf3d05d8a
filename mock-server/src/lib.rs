//! A local stand-in for the news API.
//!
//! Serves `/v2/everything`, `/v2/top-headlines` and `/v2/top-headlines/sources`
//! over a deterministic synthetic corpus, with the same authentication,
//! validation and error envelopes as the hosted service. The conformance suite
//! runs against it when no live endpoint is configured.

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod auth;
pub mod corpus;
pub mod error;
pub mod handlers;
pub mod model;
pub mod query;
pub mod telemetry;

pub use corpus::Corpus;
pub use error::ApiError;
pub use model::{Article, ArticlesPage, Source, SourceRef, SourcesPage};

pub const DEFAULT_API_KEY: &str = "mock-api-key";
pub const DEFAULT_RATE_LIMITED_KEY: &str = "mock-rate-limited-key";

/// Which API keys the server accepts and which it answers with `429`.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_keys: Vec<String>,
    pub rate_limited_keys: Vec<String>,
}

impl MockConfig {
    pub fn new(
        api_keys: impl IntoIterator<Item = impl Into<String>>,
        rate_limited_keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            api_keys: api_keys.into_iter().map(Into::into).collect(),
            rate_limited_keys: rate_limited_keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self::new([DEFAULT_API_KEY], [DEFAULT_RATE_LIMITED_KEY])
    }
}

pub struct AppState {
    pub config: MockConfig,
    pub corpus: Corpus,
}

pub type SharedState = Arc<AppState>;

pub fn app(config: MockConfig) -> Router {
    let state = Arc::new(AppState {
        config,
        corpus: Corpus::generate(),
    });
    Router::new()
        .route("/v2/everything", get(handlers::everything))
        .route("/v2/top-headlines", get(handlers::top_headlines))
        .route("/v2/top-headlines/sources", get(handlers::sources))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, keys = config.api_keys.len(), "mock news api listening");
    }
    axum::serve(listener, app(config)).await
}
