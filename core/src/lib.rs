//! Request client core for the news API conformance suite.
//!
//! # Overview
//! Builds requests against a configured base URL and returns raw responses
//! (status, headers, body) without interpreting them. Error statuses are
//! ordinary responses; only transport failures are `Err`.
//!
//! # Design
//! - `RequestBuilder` is stateless: it joins the URL, merges default and
//!   per-call headers and serializes the payload into an `HttpRequest`.
//! - `BlockingClient` and `AsyncClient` share that builder and differ only in
//!   how they execute: each is generic over a transport trait, defaulting to
//!   `ureq` and `reqwest` respectively.
//! - Query parameters stay in caller form until the transport flattens and
//!   encodes them.

pub mod async_client;
pub mod blocking;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;

pub use async_client::{AsyncClient, ReqwestTransport};
pub use blocking::{BlockingClient, UreqTransport};
pub use client::{join_url, ClientConfig, RequestBuilder, RequestCall, DEFAULT_TIMEOUT};
pub use error::ClientError;
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, ParamValue, QueryParams};
pub use transport::{AsyncTransport, Transport};
