use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_newsapi::{app, MockConfig, DEFAULT_API_KEY, DEFAULT_RATE_LIMITED_KEY};
use serde_json::Value;
use test_log::test;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", DEFAULT_API_KEY)
        .body(String::new())
        .unwrap()
}

fn get_without_key(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn send(request: Request<String>) -> (StatusCode, Value) {
    let resp = app(MockConfig::default()).oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

// --- auth ---

#[test(tokio::test)]
async fn missing_key_is_401() {
    let (status, body) = send(get_without_key("/v2/top-headlines?country=us")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "apiKeyMissing");
}

#[test(tokio::test)]
async fn bearer_header_is_accepted() {
    let request = Request::builder()
        .uri("/v2/top-headlines/sources")
        .header("authorization", format!("Bearer {DEFAULT_API_KEY}"))
        .body(String::new())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[test(tokio::test)]
async fn query_key_is_accepted() {
    let (status, _) = send(get_without_key(&format!("/v2/everything?q=ai&apiKey={DEFAULT_API_KEY}"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[test(tokio::test)]
async fn rate_limited_key_is_429() {
    let (status, body) =
        send(get_without_key(&format!("/v2/everything?q=ai&apiKey={DEFAULT_RATE_LIMITED_KEY}"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "rateLimited");
}

// --- everything ---

#[test(tokio::test)]
async fn everything_returns_a_page() {
    let (status, body) = send(get("/v2/everything?q=bitcoin&pageSize=7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"].as_array().unwrap().len(), 7);
    assert!(body["totalResults"].as_u64().unwrap() >= 7);
    let article = &body["articles"][0];
    for key in ["source", "author", "title", "description", "url", "urlToImage", "publishedAt", "content"] {
        assert!(article.get(key).is_some(), "missing {key}");
    }
}

#[test(tokio::test)]
async fn everything_without_scope_is_400() {
    let (status, body) = send(get("/v2/everything?language=en")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "parametersMissing");
}

#[test(tokio::test)]
async fn everything_rejects_malformed_query() {
    let (status, body) = send(get("/v2/everything?q=crypto%20AND%20OR")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "queryMalformed");
}

#[test(tokio::test)]
async fn everything_result_window_is_417() {
    let (status, body) = send(get("/v2/everything?q=ai&page=2&pageSize=100")).await;
    assert_eq!(status, StatusCode::EXPECTATION_FAILED);
    assert_eq!(body["code"], "maximumResultsReached");
}

#[test(tokio::test)]
async fn everything_filters_by_source() {
    let (status, body) = send(get("/v2/everything?sources=bbc-news&pageSize=20")).await;
    assert_eq!(status, StatusCode::OK);
    let articles = body["articles"].as_array().unwrap();
    assert!(!articles.is_empty());
    assert!(articles.iter().all(|a| a["source"]["id"] == "bbc-news"));
}

#[test(tokio::test)]
async fn everything_excludes_domains() {
    let (_, body) = send(get("/v2/everything?q=news&excludeDomains=techcrunch.com&pageSize=100")).await;
    let articles = body["articles"].as_array().unwrap();
    assert!(articles.iter().all(|a| !a["url"].as_str().unwrap().contains("techcrunch.com")));
}

#[test(tokio::test)]
async fn everything_sorts_newest_first_by_default() {
    let (_, body) = send(get("/v2/everything?q=news&pageSize=10")).await;
    let dates: Vec<&str> = body["articles"].as_array().unwrap().iter().map(|a| a["publishedAt"].as_str().unwrap()).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
}

// --- top headlines ---

#[test(tokio::test)]
async fn headlines_by_country() {
    let (status, body) = send(get("/v2/top-headlines?country=us")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["articles"].as_array().unwrap().len(), 20);
}

#[test(tokio::test)]
async fn headlines_need_a_filter() {
    let (status, body) = send(get("/v2/top-headlines")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "parametersMissing");
}

#[test(tokio::test)]
async fn headlines_unknown_country_is_empty() {
    let (status, body) = send(get("/v2/top-headlines?country=zz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalResults"], 0);
    assert!(body["articles"].as_array().unwrap().is_empty());
}

// --- sources ---

#[test(tokio::test)]
async fn sources_filter_by_language() {
    let (status, body) = send(get("/v2/top-headlines/sources?language=de")).await;
    assert_eq!(status, StatusCode::OK);
    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty());
    assert!(sources.iter().all(|s| s["language"] == "de"));
    assert_eq!(sources[0].as_object().unwrap().len(), 7);
}

#[test(tokio::test)]
async fn sources_ignore_unknown_filters() {
    let (_, all) = send(get("/v2/top-headlines/sources")).await;
    let (_, invalid) = send(get("/v2/top-headlines/sources?country=invalid")).await;
    assert_eq!(all["sources"].as_array().unwrap().len(), invalid["sources"].as_array().unwrap().len());
}

// --- fallback ---

#[test(tokio::test)]
async fn unknown_path_is_an_error_envelope() {
    let (status, body) = send(get("/v2/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}
