//! Black-box conformance suite for the news API.
//!
//! # Overview
//! Scenarios are data: credentials, an endpoint, query parameters and the
//! expected outcome. The runner turns each one into a call through the
//! `newsapi-core` client and judges the response with a single assertion
//! routine, `expect::check`.
//!
//! # Design
//! - `Settings` is loaded once and passed down; nothing reads the
//!   environment behind the caller's back.
//! - Credentials are symbolic until a call is built, so the catalog can be
//!   listed and inspected without real keys.
//! - Mismatches are values, not panics: a batch run reports every failing
//!   scenario at once.

pub mod catalog;
pub mod credentials;
pub mod envelope;
pub mod expect;
pub mod fixtures;
pub mod runner;
pub mod settings;

pub use catalog::{Family, Scenario, Tag};
pub use credentials::{Credentials, KeyValue, Slot};
pub use envelope::{Endpoint, Envelope, ErrorCode, ResponseStatus};
pub use expect::{check, CountRule, FailureShape, MessageRule, Mismatch, Outcome, PublishedWindow, SuccessShape};
pub use fixtures::{blocking_session_client, client_with, session_client};
pub use runner::{failures, Runner, ScenarioReport, Verdict};
pub use settings::{Settings, SettingsError};
