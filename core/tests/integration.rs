//! Round trips against the mock server over real HTTP.
//!
//! # Design
//! Starts the mock server on a random port, then drives both client variants
//! through it. Validates that request building, query encoding and the
//! non-raising status handling work end-to-end.

use std::net::SocketAddr;
use std::time::Duration;

use mock_newsapi::{MockConfig, DEFAULT_API_KEY};
use newsapi_core::{AsyncClient, BlockingClient, ClientConfig, ClientError, QueryParams, RequestCall};
use test_log::test;

/// Start the mock server on an ephemeral port in a background thread.
fn start_server() -> SocketAddr {
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

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(format!("http://{addr}/v2/")).with_default_header("X-API-KEY", DEFAULT_API_KEY)
}

#[test]
fn blocking_round_trip() {
    let addr = start_server();
    let client = BlockingClient::new(config(addr));

    let response = client
        .get("/everything", QueryParams::new().with("q", "bitcoin").with("pageSize", 3))
        .unwrap();
    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["articles"].as_array().unwrap().len(), 3);
    assert!(response.header("Content-Type").unwrap().starts_with("application/json"));
}

#[test]
fn blocking_error_status_is_data() {
    let addr = start_server();
    let client = BlockingClient::new(ClientConfig::new(format!("http://{addr}/v2")));

    let response = client.get("top-headlines", QueryParams::new().with("country", "us")).unwrap();
    assert_eq!(response.status, 401);
    assert_eq!(response.json().unwrap()["code"], "apiKeyMissing");
}

#[test]
fn per_call_header_replaces_invalid_default() {
    let addr = start_server();
    let client = BlockingClient::new(
        ClientConfig::new(format!("http://{addr}/v2")).with_default_header("X-API-KEY", "not-a-key"),
    );

    let rejected = client.get("top-headlines/sources", QueryParams::new()).unwrap();
    assert_eq!(rejected.status, 401);

    let accepted = client
        .request(RequestCall::get("top-headlines/sources").header("x-api-key", DEFAULT_API_KEY))
        .unwrap();
    assert_eq!(accepted.status, 200);
}

#[test]
fn repeated_list_values_reach_the_server() {
    let addr = start_server();
    let client = BlockingClient::new(config(addr));

    let params = QueryParams::new().with("sources", vec!["bbc-news".to_string(), "ignored".to_string()]);
    let response = client.get("everything", params).unwrap();
    assert_eq!(response.status, 200);
    let body = response.json().unwrap();
    assert!(body["articles"].as_array().unwrap().iter().all(|a| a["source"]["id"] == "bbc-news"));
}

#[test(tokio::test)]
async fn async_round_trip() {
    let addr = start_server();
    let client = AsyncClient::new(config(addr));

    let response = client
        .get("/top-headlines", QueryParams::new().with("country", "us").with("pageSize", 5))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["articles"].as_array().unwrap().len(), 5);
}

#[test(tokio::test)]
async fn async_validation_error_is_data() {
    let addr = start_server();
    let client = AsyncClient::new(config(addr));

    let response = client
        .get("/everything", QueryParams::new().with("q", "ai").with("pageSize", -1))
        .await
        .unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.json().unwrap()["code"], "parameterInvalid");
}

#[test]
fn refused_connection_is_a_transport_error() {
    let client = BlockingClient::new(ClientConfig::new("http://127.0.0.1:9/v2").with_timeout(Duration::from_secs(2)));
    let err = client.get("everything", QueryParams::new()).unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. } | ClientError::Timeout { .. }), "{err:?}");
}
