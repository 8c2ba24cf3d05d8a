//! Transport capabilities the clients are generic over.
//!
//! A transport executes one fully built `HttpRequest` and returns the raw
//! response for every status code. It owns query encoding and connection
//! handling; each call acquires its own connection resources and releases
//! them before returning.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a request on the calling thread.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Executes a request with a single suspend point.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        (**self).execute(request)
    }
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        (**self).execute(request).await
    }
}
