//! Clients injected into tests.
//!
//! The session client is built once per test binary and shared; per-test
//! clients carry the credentials of a single scenario.

use newsapi_core::{AsyncClient, BlockingClient, ClientConfig};

use crate::credentials::{Credentials, X_API_KEY};
use crate::settings::Settings;

fn base_config(settings: &Settings) -> ClientConfig {
    ClientConfig::new(&settings.base_url).with_timeout(settings.timeout)
}

/// Async client sending the primary key in `X-API-KEY`.
pub fn session_client(settings: &Settings) -> AsyncClient {
    AsyncClient::new(base_config(settings).with_default_header(X_API_KEY, &settings.api_key))
}

/// Async client whose default headers carry the header slots of
/// `credentials`. Query-slot credentials belong on the call, not the client.
pub fn client_with(settings: &Settings, credentials: &Credentials) -> AsyncClient {
    let resolved = credentials.resolve(settings);
    AsyncClient::new(base_config(settings).with_default_headers(resolved.headers))
}

/// Blocking counterpart of `session_client`.
pub fn blocking_session_client(settings: &Settings) -> BlockingClient {
    BlockingClient::new(base_config(settings).with_default_header(X_API_KEY, &settings.api_key))
}
