use mock_newsapi::{telemetry, MockConfig, DEFAULT_API_KEY, DEFAULT_RATE_LIMITED_KEY};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    telemetry::init();
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("MOCK_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let rate_limited =
        std::env::var("MOCK_RATE_LIMITED_API_KEY").unwrap_or_else(|_| DEFAULT_RATE_LIMITED_KEY.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    mock_newsapi::run(listener, MockConfig::new([api_key], [rate_limited])).await
}
