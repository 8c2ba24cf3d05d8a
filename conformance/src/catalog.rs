//! Scenario catalog: every conformance case as data.
//!
//! # Design
//! A scenario pairs inputs (credentials, endpoint, query parameters) with the
//! `Outcome` the API must produce. The catalog holds no logic beyond building
//! these values; the runner executes them and `expect::check` judges them.
//! Randomized inputs (page sizes, dates relative to now) are drawn once when
//! the catalog is built and appear in the scenario name.

use std::fmt;

use chrono::{Duration, Utc};
use newsapi_core::{ParamValue, QueryParams};
use rand::Rng;

use crate::credentials::{Credentials, KeyValue, Slot};
use crate::envelope::{Endpoint, ErrorCode};
use crate::expect::{parse_instant, CountRule, FailureShape, Outcome, PublishedWindow, SuccessShape};

pub const API_KEY_MISSING: &str =
    "Your API key is missing. Append this to the URL with the apiKey param, or use the x-api-key HTTP header.";
pub const API_KEY_INVALID: &str =
    "Your API key is invalid or incorrect. Check your key, or go to https://newsapi.org to create a free API key.";
pub const RATE_LIMITED: &str = "You have made too many requests recently. Developer accounts are limited to 100 \
     requests over a 24 hour period (50 requests available every 12 hours). Please upgrade to a paid plan if you \
     need more requests.";
pub const SCOPE_MISSING: &str = "Required parameters are missing, the scope of your search is too broad. Please \
     set any of the following required parameters and try again: q, qInTitle, sources, domains.";
pub const QUERY_MALFORMED: &str = "Your query may be malformed - please check that all special chars (including &) \
     in the query are URL escaped, and that it doesn't end with the OR or AND keyword.";
pub const QUERY_TOO_LONG: &str = "Your query is too long (501 chars). Please reduce your query to 500 chars, or \
     split it into multiple smaller requests.";
pub const SEARCH_IN_INVALID: &str = "The valid options for the searchIn parameter are: title, description, \
     content. You have entered 'invalid', which is not a valid field.";
// Generic message for non-integer paging values, expected to change upstream.
pub const REQUEST_INVALID: &str = "The request is invalid.";
pub const PAGE_SIZE_TOO_SMALL: &str = "The pageSize parameter cannot be less than 1.";
pub const TOO_MANY_RESULTS: &str = "You have requested too many results.";
pub const TOO_FAR_IN_THE_PAST: &str = "You are trying to request results too far in the past.";

pub const CATEGORIES: &[&str] = &["business", "entertainment", "general", "health", "science", "sports", "technology"];
pub const LANGUAGES: &[&str] = &["ar", "de", "en", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "sv", "ud", "zh"];
const SOURCE_COUNTRIES: &[&str] = &["ae", "ar", "at", "au", "be", "bg", "br"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Fast happy-path checks.
    Smoke,
    /// Error-path checks.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Auth,
    Everything,
    TopHeadlines,
    Sources,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Family::Auth => "auth",
            Family::Everything => "everything",
            Family::TopHeadlines => "top_headlines",
            Family::Sources => "sources",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub family: Family,
    pub tags: Vec<Tag>,
    pub credentials: Credentials,
    pub endpoint: Endpoint,
    pub params: QueryParams,
    pub outcome: Outcome,
}

impl Scenario {
    /// A scenario using the session credentials and expecting any successful list.
    pub fn new(family: Family, name: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            name: format!("{family}::{}", name.into()),
            family,
            tags: Vec::new(),
            credentials: Credentials::session(),
            endpoint,
            params: QueryParams::new(),
            outcome: SuccessShape::new(endpoint).into(),
        }
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn expect(mut self, outcome: impl Into<Outcome>) -> Self {
        self.outcome = outcome.into();
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

fn ok(endpoint: Endpoint, count: CountRule) -> SuccessShape {
    SuccessShape::new(endpoint).count(count)
}

fn failure(status: u16, code: ErrorCode) -> FailureShape {
    FailureShape::new(status).code(code)
}

fn invalid_keys() -> Vec<(&'static str, KeyValue)> {
    vec![
        ("invalid", KeyValue::literal("invalid_key")),
        ("empty", KeyValue::literal("")),
        ("null", KeyValue::Null),
        ("very_long", KeyValue::literal("a".repeat(1000))),
    ]
}

/// Absent-like values: empty string, null and an empty list.
fn nullish() -> Vec<(&'static str, ParamValue)> {
    vec![
        ("empty", ParamValue::Text(String::new())),
        ("null", ParamValue::Null),
        ("empty_list", ParamValue::List(Vec::new())),
    ]
}

fn slug(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

pub fn auth() -> Vec<Scenario> {
    let everything = |name: String| Scenario::new(Family::Auth, name, Endpoint::Everything).param("q", "bitcoin");
    let granted = || ok(Endpoint::Everything, CountRule::NonEmpty);
    let denied = || failure(401, ErrorCode::ApiKeyInvalid).message(API_KEY_INVALID);
    let header_slots = [Slot::XApiKey, Slot::Authorization { bearer: false }];

    let mut scenarios = vec![
        everything("valid_key_in_x_api_key_header".into()).tag(Tag::Smoke).expect(granted()),
        everything("valid_key_in_query_param".into())
            .credentials(Credentials::single(Slot::QueryParam, KeyValue::Valid))
            .expect(granted()),
        everything("missing_key".into())
            .tag(Tag::Error)
            .credentials(Credentials::none())
            .expect(failure(401, ErrorCode::ApiKeyMissing).message(API_KEY_MISSING)),
        everything("rate_limited_key".into())
            .tag(Tag::Error)
            .credentials(Credentials::single(Slot::QueryParam, KeyValue::RateLimited))
            .expect(failure(429, ErrorCode::RateLimited).message(RATE_LIMITED)),
    ];

    for bearer in [false, true] {
        let slot = Slot::Authorization { bearer };
        scenarios.push(
            everything(format!("valid_key_in_{slot}"))
                .credentials(Credentials::single(slot, KeyValue::Valid))
                .expect(granted()),
        );
    }

    for slot in header_slots {
        scenarios.push(
            everything(format!("valid_keys_in_query_param_and_{slot}"))
                .credentials(Credentials::single(slot, KeyValue::Valid).with(Slot::QueryParam, KeyValue::Valid))
                .expect(granted()),
        );
        // Precedence between a valid and an invalid slot is unverified
        // upstream, so either answer is accepted.
        scenarios.push(
            everything(format!("valid_query_param_despite_invalid_{slot}"))
                .credentials(
                    Credentials::single(slot, KeyValue::literal("invalid_api_key"))
                        .with(Slot::QueryParam, KeyValue::Valid),
                )
                .expect(Outcome::AnyOf(vec![granted().into(), denied().into()])),
        );
        scenarios.push(
            everything(format!("invalid_query_param_despite_valid_{slot}"))
                .credentials(
                    Credentials::single(slot, KeyValue::Valid)
                        .with(Slot::QueryParam, KeyValue::literal("invalid_api_key")),
                )
                .expect(Outcome::AnyOf(vec![denied().into(), granted().into()])),
        );
    }

    let invalid_slots =
        [Slot::XApiKey, Slot::Authorization { bearer: false }, Slot::Authorization { bearer: true }, Slot::QueryParam];
    for slot in invalid_slots {
        for (label, key) in invalid_keys() {
            scenarios.push(
                everything(format!("{label}_key_in_{slot}"))
                    .tag(Tag::Error)
                    .credentials(Credentials::single(slot, key))
                    .expect(denied()),
            );
        }
    }
    scenarios
}

pub fn everything() -> Vec<Scenario> {
    let scenario = |name: String| Scenario::new(Family::Everything, name, Endpoint::Everything);
    let any = || ok(Endpoint::Everything, CountRule::Any);
    let mut rng = rand::thread_rng();
    let page_size: i64 = rng.gen_range(1..=100);

    let mut scenarios = vec![
        scenario("simple_request".into()).tag(Tag::Smoke).param("q", "tesla").expect(
            ok(Endpoint::Everything, CountRule::Exactly(100))
                .with_total_results()
                .with_exact_fields(),
        ),
        scenario(format!("page_size_{page_size}"))
            .param("q", "ai")
            .param("page", 1)
            .param("pageSize", page_size)
            .expect(ok(Endpoint::Everything, CountRule::Exactly(page_size as usize))),
        scenario("missing_required_params".into())
            .tag(Tag::Error)
            .expect(failure(400, ErrorCode::ParametersMissing).message(SCOPE_MISSING)),
        scenario("query_too_long".into())
            .tag(Tag::Error)
            .param("q", "a".repeat(501))
            .param("pageSize", 5)
            .expect(failure(400, ErrorCode::QueryTooLong).message(QUERY_TOO_LONG)),
        scenario("unknown_language_is_empty".into())
            .tag(Tag::Error)
            .param("q", "radiohead")
            .param("language", "invalid")
            .param("pageSize", 5)
            .expect(ok(Endpoint::Everything, CountRule::Empty)),
    ];

    let valid_queries = [
        "bitcoin",
        "\"exact phrase\"",
        "+crypto",
        "-scam",
        "crypto AND (ethereum OR litecoin) NOT bitcoin",
        "blockchain technology",
        "crypto OR blockchain",
        "+finance +stocks -bonds",
        "\"advanced search\" AND (AI OR ML)",
    ];
    for q in valid_queries {
        scenarios.push(
            scenario(format!("valid_q_{}", slug(q)))
                .param("q", q)
                .param("pageSize", 5)
                .expect(ok(Endpoint::Everything, CountRule::NonEmpty)),
        );
    }

    for sort_by in ["relevancy", "popularity", "publishedAt"] {
        scenarios.push(
            scenario(format!("sort_by_{sort_by}"))
                .param("q", "pixies")
                .param("sortBy", sort_by)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for language in LANGUAGES {
        scenarios.push(
            scenario(format!("language_{language}"))
                .param("q", "radiohead")
                .param("language", *language)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for sources in ["abc-news", "die-zeit", "financial-post,handelsblatt"] {
        scenarios.push(
            scenario(format!("sources_{}", slug(sources)))
                .param("q", "ethereum")
                .param("sources", sources)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for domains in ["bbc.co.uk", "techcrunch.com", "engadget.com,bbc.co.uk"] {
        scenarios.push(
            scenario(format!("domains_{}", slug(domains)))
                .param("q", "ethereum")
                .param("domains", domains)
                .param("pageSize", 5)
                .expect(any()),
        );
        scenarios.push(
            scenario(format!("exclude_domains_{}", slug(domains)))
                .param("q", "ethereum")
                .param("excludeDomains", domains)
                .param("pageSize", 5)
                .expect(any()),
        );
    }

    let froms = ["2025-01-01", "2025-02-01T10:00:00", "2025-03-01T18:45:00"];
    let tos = ["2025-02-01", "2025-03-01T12:00:00", "2025-04-01T15:30:00"];
    let window = |from: Option<&str>, to: Option<&str>| PublishedWindow {
        from: from.and_then(parse_instant),
        to: to.and_then(parse_instant),
    };
    for from in froms {
        scenarios.push(
            scenario(format!("from_{}", slug(from)))
                .param("q", "solidity")
                .param("from", from)
                .param("pageSize", 5)
                .expect(any().published_within(window(Some(from), None))),
        );
    }
    for to in tos {
        scenarios.push(
            scenario(format!("to_{}", slug(to)))
                .param("q", "solidity")
                .param("to", to)
                .param("pageSize", 5)
                .expect(any().published_within(window(None, Some(to)))),
        );
    }
    for from in froms {
        for to in tos {
            scenarios.push(
                scenario(format!("from_{}_to_{}", slug(from), slug(to)))
                    .param("q", "solidity")
                    .param("to", to)
                    .param("from", from)
                    .param("pageSize", 5)
                    .expect(any().published_within(window(Some(from), Some(to)))),
            );
        }
    }
    for (from, to) in [("2025-02-01T10:00:00", "2025-01-01T10:00:00"), ("2025-01-01T10:00:00", "2025-01-01T09:59:59")] {
        scenarios.push(
            scenario(format!("from_after_to_{}", slug(from)))
                .param("q", "tesla")
                .param("from", from)
                .param("to", to)
                .param("pageSize", 5)
                .expect(ok(Endpoint::Everything, CountRule::Empty)),
        );
    }

    let search_fields = [
        "title",
        "description",
        "content",
        "title,content",
        "title,description",
        "description,content",
        "content,title",
        "description,title",
        "content,description",
    ];
    for search_in in search_fields {
        scenarios.push(
            scenario(format!("search_in_{}", slug(search_in)))
                .param("q", "silo")
                .param("searchIn", search_in)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for search_in in ["invalid", "title,invalid", "invalid,invalid"] {
        scenarios.push(
            scenario(format!("invalid_search_in_{}", slug(search_in)))
                .param("q", "silo")
                .param("searchIn", search_in)
                .param("pageSize", 5)
                .expect(failure(400, ErrorCode::ParameterInvalid).message(SEARCH_IN_INVALID)),
        );
    }

    for page in [0, -1, -100] {
        let page_size = 10;
        scenarios.push(
            scenario(format!("page_{page}"))
                .tag(Tag::Error)
                .param("q", "spain")
                .param("page", page)
                .param("pageSize", page_size)
                .expect(failure(400, ErrorCode::PageCannotBeLessThanOne).message(format!(
                    "The page parameter cannot be less than 1. You have requested {page_size}."
                ))),
        );
    }
    for (label, value) in [
        ("null", ParamValue::Null),
        ("empty", ParamValue::Text(String::new())),
        ("not_digits", ParamValue::from("not-digits")),
    ] {
        scenarios.push(
            scenario(format!("page_{label}"))
                .tag(Tag::Error)
                .param("q", "spain")
                .param("page", value.clone())
                .param("pageSize", 10)
                .expect(failure(400, ErrorCode::PageCannotBeLessThanOne).message(REQUEST_INVALID)),
        );
        // No error code asserted for pageSize until upstream settles on one.
        scenarios.push(
            scenario(format!("page_size_{label}"))
                .tag(Tag::Error)
                .param("q", "spain")
                .param("page", 1)
                .param("pageSize", value)
                .expect(FailureShape::new(400).message(REQUEST_INVALID)),
        );
    }
    for page_size in [-1, -100] {
        scenarios.push(
            scenario(format!("page_size_{page_size}"))
                .tag(Tag::Error)
                .param("q", "spain")
                .param("page", 1)
                .param("pageSize", page_size)
                .expect(FailureShape::new(400).message(PAGE_SIZE_TOO_SMALL)),
        );
    }
    for page_size in [101, 200, 1_000_000] {
        scenarios.push(
            scenario(format!("page_size_{page_size}_exceeds_limit"))
                .tag(Tag::Error)
                .param("q", "ai")
                .param("page", 1)
                .param("pageSize", page_size)
                .expect(failure(417, ErrorCode::MaximumResultsReached).message_containing(TOO_MANY_RESULTS)),
        );
    }

    for q in ["crypto AND OR", "bitcoin AND", "NOT OR", "(crypto", "crypto)"] {
        scenarios.push(
            scenario(format!("malformed_q_{}", slug(q)))
                .tag(Tag::Error)
                .param("q", q)
                .param("pageSize", 5)
                .expect(failure(400, ErrorCode::QueryMalformed).message(QUERY_MALFORMED)),
        );
    }
    for (label, value) in nullish() {
        scenarios.push(
            scenario(format!("q_{label}"))
                .tag(Tag::Error)
                .param("q", value.clone())
                .param("pageSize", 5)
                .expect(failure(400, ErrorCode::ParametersMissing).message(SCOPE_MISSING)),
        );
        scenarios.push(
            scenario(format!("language_{label}_is_ignored"))
                .tag(Tag::Error)
                .param("q", "bitcoin")
                .param("language", value)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for (label, value) in [
        ("invalid", ParamValue::from("invalid")),
        ("empty", ParamValue::Text(String::new())),
        ("null", ParamValue::Null),
    ] {
        scenarios.push(
            scenario(format!("sort_by_{label}_is_ignored"))
                .tag(Tag::Error)
                .param("q", "pixies")
                .param("sortBy", value)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for (label, value) in [
        ("not_a_domain", ParamValue::from("not-a-domain")),
        ("unknown_domain", ParamValue::from("this-domain-does-not-exist.com")),
        ("empty", ParamValue::Text(String::new())),
        ("null", ParamValue::Null),
        ("trailing_comma", ParamValue::from("bbc.co.uk,")),
    ] {
        scenarios.push(
            scenario(format!("exclude_domains_{label}_is_ignored"))
                .param("q", "ethereum")
                .param("excludeDomains", value)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for from in ["invalid-date-format", "2025-13-01", "2025-02-30T10:00:00"] {
        scenarios.push(
            scenario(format!("unparseable_from_{}", slug(from)))
                .param("q", "solidity")
                .param("from", from)
                .param("pageSize", 5)
                .expect(any()),
        );
    }
    for to in ["2025-02-01T25:00:00", "2025-03-01T18:61:00", "2025-04-01T15:30:61"] {
        scenarios.push(
            scenario(format!("unparseable_to_{}", slug(to)))
                .param("q", "solidity")
                .param("to", to)
                .param("pageSize", 5)
                .expect(any()),
        );
    }

    let now = Utc::now();
    for days in [5 * 365 + 1, 6 * 365] {
        scenarios.push(
            scenario(format!("from_{days}_days_ago"))
                .param("q", "solidity")
                .param("from", (now - Duration::days(days)).to_rfc3339())
                .param("pageSize", 5)
                .expect(failure(417, ErrorCode::ParameterInvalid).message_containing(TOO_FAR_IN_THE_PAST)),
        );
    }
    scenarios
}

pub fn top_headlines() -> Vec<Scenario> {
    let scenario = |name: &str| Scenario::new(Family::TopHeadlines, name, Endpoint::TopHeadlines);
    vec![
        scenario("simple_request").tag(Tag::Smoke).param("country", "us").expect(
            ok(Endpoint::TopHeadlines, CountRule::Exactly(20))
                .with_total_results()
                .with_exact_fields(),
        ),
        scenario("page_size_5")
            .param("country", "us")
            .param("pageSize", 5)
            .expect(ok(Endpoint::TopHeadlines, CountRule::Exactly(5))),
        scenario("category_filter")
            .param("category", "technology")
            .expect(ok(Endpoint::TopHeadlines, CountRule::NonEmpty)),
        scenario("missing_required_params")
            .tag(Tag::Error)
            .expect(failure(400, ErrorCode::ParametersMissing)),
        scenario("missing_key")
            .tag(Tag::Error)
            .credentials(Credentials::none())
            .param("country", "us")
            .expect(failure(401, ErrorCode::ApiKeyMissing).message(API_KEY_MISSING)),
    ]
}

pub fn sources() -> Vec<Scenario> {
    let scenario = |name: String| Scenario::new(Family::Sources, name, Endpoint::Sources);
    let non_empty = || ok(Endpoint::Sources, CountRule::NonEmpty);
    let mut scenarios = vec![scenario("simple_request".into())
        .tag(Tag::Smoke)
        .expect(non_empty().with_exact_fields())];

    let filters: [(&str, Vec<&str>); 3] = [
        ("category", CATEGORIES.to_vec()),
        ("language", LANGUAGES.to_vec()),
        ("country", SOURCE_COUNTRIES.to_vec()),
    ];
    for (field, values) in filters {
        for value in values {
            scenarios.push(
                scenario(format!("{field}_{value}"))
                    .param(field, value)
                    .expect(non_empty().where_field(field, value)),
            );
        }
        // `all` is not a filter value: the full listing comes back.
        scenarios.push(scenario(format!("{field}_all")).param(field, "all").expect(non_empty()));
    }

    let invalid: [(&str, &[&str]); 3] = [
        ("category", &["invalid_category", "BUSINESS", "123", "!@#$%", ""]),
        ("language", &["invalid_language", "EN", "123", "!@#$%", ""]),
        ("country", &["invalid_country", "US", "123", "!@#$%", ""]),
    ];
    for (field, values) in invalid {
        for value in values {
            let label = if value.is_empty() { "empty".to_string() } else { slug(value) };
            scenarios.push(
                scenario(format!("invalid_{field}_{label}_is_ignored"))
                    .param(field, *value)
                    .expect(non_empty()),
            );
        }
        scenarios.push(
            scenario(format!("invalid_{field}_null_is_ignored"))
                .param(field, ParamValue::Null)
                .expect(non_empty()),
        );
    }
    scenarios
}

/// The whole catalog, in family order.
pub fn all() -> Vec<Scenario> {
    [auth(), everything(), top_headlines(), sources()].into_iter().flatten().collect()
}

pub fn tagged(tag: Tag) -> Vec<Scenario> {
    all().into_iter().filter(|s| s.has_tag(tag)).collect()
}
