//! Async client backed by `reqwest`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::blocking::with_payload;
use crate::client::{ClientConfig, RequestBuilder, RequestCall};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryParams};
use crate::transport::AsyncTransport;

/// `reqwest` transport. The `reqwest::Client` is scoped to one call and
/// dropped with its connection pool when the call returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let url = request.url.clone();
        let client = reqwest::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| map_error(&url, e))?;

        let mut builder = client
            .request(method(request.method), &url)
            .query(&request.params.wire_pairs());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| map_error(&url, e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), value.to_str().unwrap_or_default().to_string())
            })
            .collect();
        let body = response.text().await.map_err(|e| map_error(&url, e))?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn map_error(url: &str, error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout { url: url.to_string() }
    } else if error.is_builder() {
        ClientError::InvalidRequest(error.to_string())
    } else {
        ClientError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Client whose calls suspend at a single await point until the response
/// arrives. Holds no mutable state, so one instance can serve many
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct AsyncClient<T = ReqwestTransport> {
    builder: RequestBuilder,
    transport: T,
}

impl AsyncClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport)
    }
}

impl<T: AsyncTransport> AsyncClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            builder: RequestBuilder::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.builder.config()
    }

    /// Build and execute `call`. Non-2xx responses are returned, not raised.
    pub async fn request(&self, call: RequestCall) -> Result<HttpResponse, ClientError> {
        let request = self.builder.build(call)?;
        debug!(method = request.method.as_str(), url = %request.url, "sending async request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub async fn get(&self, endpoint: &str, params: QueryParams) -> Result<HttpResponse, ClientError> {
        self.request(RequestCall::get(endpoint).params(params)).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        params: QueryParams,
        payload: Option<Value>,
    ) -> Result<HttpResponse, ClientError> {
        self.request(with_payload(RequestCall::new(HttpMethod::Post, endpoint).params(params), payload))
            .await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        params: QueryParams,
        payload: Option<Value>,
    ) -> Result<HttpResponse, ClientError> {
        self.request(with_payload(RequestCall::new(HttpMethod::Put, endpoint).params(params), payload))
            .await
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        params: QueryParams,
        payload: Option<Value>,
    ) -> Result<HttpResponse, ClientError> {
        self.request(with_payload(RequestCall::new(HttpMethod::Patch, endpoint).params(params), payload))
            .await
    }

    pub async fn delete(&self, endpoint: &str, params: QueryParams) -> Result<HttpResponse, ClientError> {
        self.request(RequestCall::new(HttpMethod::Delete, endpoint).params(params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl AsyncTransport for Unreachable {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            Err(ClientError::Transport {
                url: request.url,
                message: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn transport_failures_surface_as_errors() {
        let client = AsyncClient::with_transport(ClientConfig::new("http://localhost:1"), Unreachable);
        let err = client.get("everything", QueryParams::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { ref url, .. } if url == "http://localhost:1/everything"));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn unroutable_address_times_out_or_fails() {
        let client = AsyncClient::new(
            ClientConfig::new("http://127.0.0.1:9").with_timeout(std::time::Duration::from_millis(200)),
        );
        let err = client.get("everything", QueryParams::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. } | ClientError::Transport { .. }));
    }
}
