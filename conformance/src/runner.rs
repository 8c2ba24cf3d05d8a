//! Executes scenarios and collects their verdicts.
//!
//! # Design
//! The runner is handed the session client once and reuses it for every
//! scenario that sends the session credentials. Any other scenario gets a
//! client of its own built from the immutable `Settings`. `run_all` keeps at
//! most `concurrency` calls in flight and returns reports in completion order.

use futures_util::{stream, StreamExt};
use newsapi_core::{AsyncClient, AsyncTransport, ClientError, ReqwestTransport, RequestCall};
use tracing::{info, warn};

use crate::catalog::Scenario;
use crate::credentials::Credentials;
use crate::expect::{check, Mismatch};
use crate::fixtures::{client_with, session_client};
use crate::settings::Settings;

#[derive(Debug)]
pub enum Verdict {
    Passed,
    /// The API answered, but not as expected.
    Failed(Mismatch),
    /// The call did not complete.
    Errored(ClientError),
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub status: Option<u16>,
    pub verdict: Verdict,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.verdict, Verdict::Passed)
    }
}

impl std::fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status.map_or_else(|| "-".to_string(), |s| s.to_string());
        match &self.verdict {
            Verdict::Passed => write!(f, "{} [{status}] passed", self.name),
            Verdict::Failed(mismatch) => write!(f, "{} [{status}] failed: {mismatch}", self.name),
            Verdict::Errored(error) => write!(f, "{} errored: {error}", self.name),
        }
    }
}

pub struct Runner<T = ReqwestTransport> {
    settings: Settings,
    session: AsyncClient<T>,
}

impl Runner {
    /// Runner with a session client of its own, built from `settings`.
    pub fn new(settings: Settings) -> Self {
        let session = session_client(&settings);
        Self::with_session_client(settings, session)
    }
}

impl<T: AsyncTransport> Runner<T> {
    /// Runner reusing `session` for every scenario that sends
    /// `Credentials::session()`.
    pub fn with_session_client(settings: Settings, session: AsyncClient<T>) -> Self {
        Self { settings, session }
    }

    /// The call a scenario issues: its parameters plus any query-slot key.
    pub fn call_for(&self, scenario: &Scenario) -> RequestCall {
        let credentials = scenario.credentials.resolve(&self.settings);
        RequestCall::get(scenario.endpoint.path()).params(scenario.params.merged(&credentials.params))
    }

    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let call = self.call_for(scenario);
        let result = if scenario.credentials == Credentials::session() {
            self.session.request(call).await
        } else {
            client_with(&self.settings, &scenario.credentials).request(call).await
        };
        let report = match result {
            Ok(response) => ScenarioReport {
                name: scenario.name.clone(),
                status: Some(response.status),
                verdict: match check(&scenario.outcome, &response) {
                    Ok(()) => Verdict::Passed,
                    Err(mismatch) => Verdict::Failed(mismatch),
                },
            },
            Err(error) => ScenarioReport {
                name: scenario.name.clone(),
                status: None,
                verdict: Verdict::Errored(error),
            },
        };
        if report.passed() {
            info!(scenario = %report.name, status = ?report.status, "passed");
        } else {
            warn!(scenario = %report.name, status = ?report.status, "{report}");
        }
        report
    }

    pub async fn run_all(&self, scenarios: &[Scenario], concurrency: usize) -> Vec<ScenarioReport> {
        stream::iter(scenarios)
            .map(|scenario| self.run(scenario))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}

/// Render the failing reports, one per line, for a test assertion message.
pub fn failures(reports: &[ScenarioReport]) -> Option<String> {
    let failed: Vec<String> = reports.iter().filter(|r| !r.passed()).map(ToString::to_string).collect();
    (!failed.is_empty()).then(|| failed.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use newsapi_core::{ClientConfig, HttpRequest, HttpResponse, ParamValue};

    use super::*;
    use crate::catalog::Family;
    use crate::credentials::{KeyValue, Slot, X_API_KEY};
    use crate::envelope::Endpoint;

    /// Answers every call with one article and counts the calls.
    #[derive(Clone, Default)]
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AsyncTransport for Counting {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            assert_eq!(request.headers.get(X_API_KEY), Some("primary"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: r#"{"status":"ok","totalResults":1,"articles":[{"title":"t"}]}"#.to_string(),
            })
        }
    }

    fn runner() -> Runner {
        Runner::new(Settings::new("http://127.0.0.1:9/v2", "primary", "limited"))
    }

    #[test]
    fn query_credentials_follow_scenario_params() {
        let scenario = Scenario::new(Family::Auth, "q", Endpoint::Everything)
            .credentials(Credentials::single(Slot::QueryParam, KeyValue::RateLimited))
            .param("q", "bitcoin");
        let call = runner().call_for(&scenario);
        assert_eq!(call.endpoint, "/everything");
        let pairs: Vec<_> = call.params.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(pairs, vec!["q".to_string(), "apiKey".to_string()]);
        assert_eq!(call.params.get("apiKey"), Some(&ParamValue::Text("limited".to_string())));
    }

    #[test]
    fn header_credentials_stay_off_the_call() {
        let scenario = Scenario::new(Family::Sources, "s", Endpoint::Sources);
        let call = runner().call_for(&scenario);
        assert!(call.params.is_empty());
        assert!(call.headers.is_empty());
    }

    #[test]
    fn failures_lists_only_failed_reports() {
        let reports = vec![
            ScenarioReport {
                name: "a".into(),
                status: Some(200),
                verdict: Verdict::Passed,
            },
            ScenarioReport {
                name: "b".into(),
                status: None,
                verdict: Verdict::Errored(ClientError::Timeout { url: "u".into() }),
            },
        ];
        assert_eq!(failures(&reports).as_deref(), Some("b errored: request to u timed out"));
        assert_eq!(failures(&reports[..1]), None);
    }

    #[tokio::test]
    async fn unreachable_server_is_an_errored_verdict() {
        let scenario = Scenario::new(Family::Everything, "unreachable", Endpoint::Everything).param("q", "x");
        let reports = runner().run_all(&[scenario], 4).await;
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].verdict, Verdict::Errored(_)), "{}", reports[0]);
    }

    #[tokio::test]
    async fn session_scenarios_reuse_the_injected_client() {
        let settings = Settings::new("http://127.0.0.1:9/v2", "primary", "limited");
        let transport = Counting::default();
        let session = AsyncClient::with_transport(
            ClientConfig::new(&settings.base_url).with_default_header(X_API_KEY, &settings.api_key),
            transport.clone(),
        );
        let runner = Runner::with_session_client(settings, session);

        let scenarios = vec![
            Scenario::new(Family::Everything, "first", Endpoint::Everything).param("q", "x"),
            Scenario::new(Family::Everything, "second", Endpoint::Everything).param("q", "y"),
        ];
        let reports = runner.run_all(&scenarios, 2).await;
        assert!(reports.iter().all(ScenarioReport::passed), "{reports:?}");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_credentials_get_a_client_of_their_own() {
        let settings = Settings::new("http://127.0.0.1:9/v2", "primary", "limited");
        let transport = Counting::default();
        let session = AsyncClient::with_transport(
            ClientConfig::new(&settings.base_url).with_default_header(X_API_KEY, &settings.api_key),
            transport.clone(),
        );
        let runner = Runner::with_session_client(settings, session);

        let scenario = Scenario::new(Family::Auth, "anonymous", Endpoint::Everything)
            .credentials(Credentials::none())
            .param("q", "x");
        let report = runner.run(&scenario).await;
        assert!(matches!(report.verdict, Verdict::Errored(_)), "{report}");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
