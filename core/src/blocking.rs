//! Blocking client backed by a `ureq` agent.

use serde_json::Value;
use tracing::debug;

use crate::client::{ClientConfig, RequestBuilder, RequestCall};
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryParams};
use crate::transport::Transport;

/// `ureq` transport. A fresh agent is built per call so no connection state
/// outlives the request.
///
/// ureq's status-code-as-error behavior is disabled, so 4xx/5xx responses are
/// returned as data rather than `Err`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(request.timeout))
            .build()
            .new_agent();

        let url = request.url.clone();
        let result = match request.method {
            HttpMethod::Get => decorate(agent.get(&url), &request).call(),
            HttpMethod::Delete => decorate(agent.delete(&url), &request).call(),
            HttpMethod::Post => send_with_body(decorate(agent.post(&url), &request), request.body.as_deref()),
            HttpMethod::Put => send_with_body(decorate(agent.put(&url), &request), request.body.as_deref()),
            HttpMethod::Patch => {
                send_with_body(decorate(agent.patch(&url), &request), request.body.as_deref())
            }
        };
        let mut response = result.map_err(|e| map_error(&url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_string(), value.to_str().unwrap_or_default().to_string())
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(|e| map_error(&url, e))?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn decorate<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    for (key, value) in request.params.wire_pairs() {
        builder = builder.query(key, value);
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn map_error(url: &str, error: ureq::Error) -> ClientError {
    match error {
        ureq::Error::Timeout(_) => ClientError::Timeout { url: url.to_string() },
        ureq::Error::Http(e) => ClientError::InvalidRequest(e.to_string()),
        other => ClientError::Transport {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

/// Client whose calls block the caller until the response arrives.
#[derive(Debug, Clone)]
pub struct BlockingClient<T = UreqTransport> {
    builder: RequestBuilder,
    transport: T,
}

impl BlockingClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport)
    }
}

impl<T: Transport> BlockingClient<T> {
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
    pub fn request(&self, call: RequestCall) -> Result<HttpResponse, ClientError> {
        let request = self.builder.build(call)?;
        debug!(method = request.method.as_str(), url = %request.url, "sending blocking request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub fn get(&self, endpoint: &str, params: QueryParams) -> Result<HttpResponse, ClientError> {
        self.request(RequestCall::get(endpoint).params(params))
    }

    pub fn post(&self, endpoint: &str, params: QueryParams, payload: Option<Value>) -> Result<HttpResponse, ClientError> {
        self.request(with_payload(RequestCall::new(HttpMethod::Post, endpoint).params(params), payload))
    }

    pub fn put(&self, endpoint: &str, params: QueryParams, payload: Option<Value>) -> Result<HttpResponse, ClientError> {
        self.request(with_payload(RequestCall::new(HttpMethod::Put, endpoint).params(params), payload))
    }

    pub fn patch(&self, endpoint: &str, params: QueryParams, payload: Option<Value>) -> Result<HttpResponse, ClientError> {
        self.request(with_payload(RequestCall::new(HttpMethod::Patch, endpoint).params(params), payload))
    }

    pub fn delete(&self, endpoint: &str, params: QueryParams) -> Result<HttpResponse, ClientError> {
        self.request(RequestCall::new(HttpMethod::Delete, endpoint).params(params))
    }
}

pub(crate) fn with_payload(call: RequestCall, payload: Option<Value>) -> RequestCall {
    match payload {
        Some(payload) => call.payload(payload),
        None => call,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records the request and answers with a canned 401.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Transport for Recording {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 401,
                headers: Vec::new(),
                body: r#"{"status":"error","code":"apiKeyMissing","message":"missing"}"#.to_string(),
            })
        }
    }

    #[test]
    fn error_statuses_are_returned_not_raised() {
        let transport = Recording::default();
        let client = BlockingClient::with_transport(ClientConfig::new("http://localhost:3000/v2/"), &transport);
        let response = client.get("/everything", QueryParams::new().with("q", "bitcoin")).unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(response.json().unwrap()["code"], "apiKeyMissing");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "http://localhost:3000/v2/everything");
    }

    #[test]
    fn patch_sends_json_body() {
        let transport = Recording::default();
        let client = BlockingClient::with_transport(ClientConfig::new("http://h"), &transport);
        client
            .patch("things", QueryParams::new(), Some(serde_json::json!({"a": 1})))
            .unwrap();
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Patch);
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"a":1}"#));
    }
}
