//! Target selection shared by the conformance test binaries.
//!
//! With `NEWSAPI_LIVE=1` the settings come from the environment (and `.env`)
//! and every scenario hits the live API. Otherwise the mock server is started
//! once per test binary on an ephemeral port and the settings point at it.
//! The session client is built once per test binary as well and handed to
//! every runner.

#![allow(dead_code)]

use std::sync::OnceLock;

use mock_newsapi::{MockConfig, DEFAULT_API_KEY, DEFAULT_RATE_LIMITED_KEY};
use newsapi_conformance::{Runner, Settings};
use newsapi_core::AsyncClient;

pub const LIVE_ENV: &str = "NEWSAPI_LIVE";
/// Calls in flight at once when a whole batch is run.
pub const CONCURRENCY: usize = 8;

pub fn is_live() -> bool {
    std::env::var(LIVE_ENV).is_ok_and(|v| v == "1")
}

pub fn settings() -> &'static Settings {
    static SETTINGS: OnceLock<Settings> = OnceLock::new();
    SETTINGS.get_or_init(|| {
        if is_live() {
            Settings::from_env().unwrap_or_else(|e| panic!("invalid configuration: {e}"))
        } else {
            let addr = start_mock_server();
            Settings::new(format!("http://{addr}/v2"), DEFAULT_API_KEY, DEFAULT_RATE_LIMITED_KEY)
        }
    })
}

pub fn session_client() -> &'static AsyncClient {
    static CLIENT: OnceLock<AsyncClient> = OnceLock::new();
    CLIENT.get_or_init(|| newsapi_conformance::session_client(settings()))
}

pub fn runner() -> Runner {
    Runner::with_session_client(settings().clone(), session_client().clone())
}

fn start_mock_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_newsapi::run(listener, MockConfig::default()).await
        })
        .unwrap();
    });
    addr
}
