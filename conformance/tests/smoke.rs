//! Fast happy-path checks: `cargo test --test smoke`.

mod common;

use newsapi_conformance::{catalog, failures, Tag};
use test_log::test;

#[test(tokio::test)]
async fn smoke_scenarios_pass() {
    let scenarios = catalog::tagged(Tag::Smoke);
    assert!(!scenarios.is_empty());

    let runner = common::runner();
    let reports = runner.run_all(&scenarios, common::CONCURRENCY).await;
    assert_eq!(reports.len(), scenarios.len());
    if let Some(failed) = failures(&reports) {
        panic!("smoke scenarios failed:\n{failed}");
    }
}
