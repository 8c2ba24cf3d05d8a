//! Endpoint handlers and the request validation behind them.
//!
//! Validation is split from the handlers so the rules can be unit tested
//! without a router. For `/everything` the checks run in a fixed order:
//! required scope, `q` length, `q` syntax, `searchIn`, `page`, `pageSize`,
//! result window, `from` age. The first failing check decides the response.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::auth::authenticate;
use crate::corpus::{Corpus, StoredArticle, CATEGORIES, COUNTRIES, LANGUAGES};
use crate::error::{
    ApiError, EVERYTHING_SCOPE_MISSING, HEADLINES_SCOPE_MISSING, PAGE_SIZE_TOO_SMALL, QUERY_MALFORMED,
    REQUEST_INVALID,
};
use crate::model::{ArticlesPage, SourcesPage};
use crate::query::{is_well_formed, parse_datetime, Params};
use crate::SharedState;

pub const MAX_QUERY_CHARS: usize = 500;
pub const MAX_RESULTS: i64 = 100;
pub const EVERYTHING_PAGE_SIZE: i64 = 100;
pub const HEADLINES_PAGE_SIZE: i64 = 20;
pub const HISTORY_DAYS: i64 = 5 * 365;
const SEARCH_FIELDS: &[&str] = &["title", "description", "content"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Relevancy,
    Popularity,
    PublishedAt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageFilter {
    Any,
    Only(String),
    /// A language the index does not carry: matches nothing.
    Unknown,
}

/// A validated `/everything` request.
#[derive(Debug, Clone)]
pub struct Search {
    pub paging: Paging,
    pub language: LanguageFilter,
    pub sources: Vec<String>,
    pub domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort_by: SortBy,
}

fn parse_paging(params: &Params, default_page_size: i64) -> Result<Paging, ApiError> {
    let page = match params.first("page") {
        None => 1,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "pageCannotBeLessThanOne", REQUEST_INVALID))?,
    };
    if page < 1 {
        let requested = params.first("pageSize").map_or_else(|| default_page_size.to_string(), str::to_string);
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "pageCannotBeLessThanOne",
            format!("The page parameter cannot be less than 1. You have requested {requested}."),
        ));
    }

    let page_size = match params.first("pageSize") {
        None => default_page_size,
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| ApiError::parameter_invalid(REQUEST_INVALID))?,
    };
    if page_size < 1 {
        return Err(ApiError::parameter_invalid(PAGE_SIZE_TOO_SMALL));
    }

    let last = page.saturating_mul(page_size);
    if page_size > MAX_RESULTS || last > MAX_RESULTS {
        let first = (page - 1).saturating_mul(page_size).saturating_add(1);
        return Err(ApiError::new(
            StatusCode::EXPECTATION_FAILED,
            "maximumResultsReached",
            format!(
                "You have requested too many results. Developer accounts are limited to a max of {MAX_RESULTS} \
                 results. You are trying to request results {first} to {last}. Please upgrade to a paid plan if \
                 you need more results."
            ),
        ));
    }
    Ok(Paging { page, page_size })
}

pub fn validate_everything(params: &Params, now: DateTime<Utc>) -> Result<Search, ApiError> {
    let scoped = ["q", "qInTitle", "sources", "domains"].iter().any(|key| params.non_empty(key).is_some());
    if !scoped {
        return Err(ApiError::parameters_missing(EVERYTHING_SCOPE_MISSING));
    }

    if let Some(q) = params.non_empty("q") {
        let length = q.chars().count();
        if length > MAX_QUERY_CHARS {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "queryTooLong",
                format!(
                    "Your query is too long ({length} chars). Please reduce your query to {MAX_QUERY_CHARS} chars, \
                     or split it into multiple smaller requests."
                ),
            ));
        }
        if !is_well_formed(q) {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "queryMalformed", QUERY_MALFORMED));
        }
    }

    if let Some(invalid) = params.list("searchIn").into_iter().find(|f| !SEARCH_FIELDS.contains(&f.as_str())) {
        return Err(ApiError::parameter_invalid(format!(
            "The valid options for the searchIn parameter are: title, description, content. You have entered \
             '{invalid}', which is not a valid field."
        )));
    }

    let paging = parse_paging(params, EVERYTHING_PAGE_SIZE)?;

    let from = params.non_empty("from").and_then(parse_datetime);
    let to = params.non_empty("to").and_then(parse_datetime);
    if let Some(from) = from {
        let cutoff = now - Duration::days(HISTORY_DAYS);
        if from < cutoff {
            return Err(ApiError::new(
                StatusCode::EXPECTATION_FAILED,
                "parameterInvalid",
                format!(
                    "You are trying to request results too far in the past. Your plan permits you to request \
                     articles as far back as {}, but you have requested {}.",
                    cutoff.format("%Y-%m-%d"),
                    from.format("%Y-%m-%d")
                ),
            ));
        }
    }

    let language = match params.non_empty("language") {
        None => LanguageFilter::Any,
        Some(lang) if LANGUAGES.contains(&lang) => LanguageFilter::Only(lang.to_string()),
        Some(_) => LanguageFilter::Unknown,
    };
    let sort_by = match params.first("sortBy") {
        Some("relevancy") => SortBy::Relevancy,
        Some("popularity") => SortBy::Popularity,
        _ => SortBy::PublishedAt,
    };

    Ok(Search {
        paging,
        language,
        sources: params.list("sources"),
        domains: params.list("domains"),
        exclude_domains: params.list("excludeDomains"),
        from,
        to,
        sort_by,
    })
}

fn domain_matches(domain: &str, wanted: &str) -> bool {
    domain == wanted || domain.ends_with(&format!(".{wanted}"))
}

fn matches(article: &StoredArticle, search: &Search) -> bool {
    let language_ok = match &search.language {
        LanguageFilter::Any => true,
        LanguageFilter::Only(lang) => article.language == *lang,
        LanguageFilter::Unknown => false,
    };
    language_ok
        && (search.sources.is_empty() || search.sources.contains(&article.source_id))
        && (search.domains.is_empty() || search.domains.iter().any(|d| domain_matches(&article.domain, d)))
        && !search.exclude_domains.iter().any(|d| domain_matches(&article.domain, d))
        && search.from.is_none_or(|from| article.published >= from)
        && search.to.is_none_or(|to| article.published <= to)
}

fn page_of(mut hits: Vec<&StoredArticle>, sort_by: SortBy, paging: Paging) -> ArticlesPage {
    match sort_by {
        SortBy::Relevancy => hits.sort_by_key(|a| a.rank),
        SortBy::Popularity => hits.sort_by(|a, b| b.popularity.cmp(&a.popularity).then(a.rank.cmp(&b.rank))),
        SortBy::PublishedAt => hits.sort_by(|a, b| b.published.cmp(&a.published)),
    }
    let total_results = hits.len();
    let skip = usize::try_from((paging.page - 1) * paging.page_size).unwrap_or(usize::MAX);
    let take = usize::try_from(paging.page_size).unwrap_or_default();
    ArticlesPage {
        status: "ok".to_string(),
        total_results,
        articles: hits.into_iter().skip(skip).take(take).map(|a| a.article.clone()).collect(),
    }
}

pub fn search_everything(corpus: &Corpus, search: &Search) -> ArticlesPage {
    let hits = corpus.articles.iter().filter(|a| matches(a, search)).collect();
    page_of(hits, search.sort_by, search.paging)
}

pub fn search_headlines(corpus: &Corpus, params: &Params) -> Result<ArticlesPage, ApiError> {
    let scoped = ["country", "category", "sources", "q"].iter().any(|key| params.non_empty(key).is_some());
    if !scoped {
        return Err(ApiError::parameters_missing(HEADLINES_SCOPE_MISSING));
    }
    let paging = parse_paging(params, HEADLINES_PAGE_SIZE)?;
    let country = params.non_empty("country");
    let category = params.non_empty("category");
    let sources = params.list("sources");
    let hits = corpus
        .articles
        .iter()
        .filter(|a| country.is_none_or(|c| a.country == c))
        .filter(|a| category.is_none_or(|c| a.category == c))
        .filter(|a| sources.is_empty() || sources.contains(&a.source_id))
        .collect();
    Ok(page_of(hits, SortBy::PublishedAt, paging))
}

pub fn list_sources(corpus: &Corpus, params: &Params) -> SourcesPage {
    // Values outside the known sets do not filter.
    let known = |key: &str, allowed: &[&str]| params.non_empty(key).filter(|v| allowed.contains(v)).map(str::to_string);
    let category = known("category", CATEGORIES);
    let language = known("language", LANGUAGES);
    let country = known("country", COUNTRIES);
    SourcesPage {
        status: "ok".to_string(),
        sources: corpus
            .sources
            .iter()
            .filter(|s| category.as_ref().is_none_or(|c| s.category == *c))
            .filter(|s| language.as_ref().is_none_or(|l| s.language == *l))
            .filter(|s| country.as_ref().is_none_or(|c| s.country == *c))
            .cloned()
            .collect(),
    }
}

pub async fn everything(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ArticlesPage>, ApiError> {
    let params = Params::new(pairs);
    authenticate(&state.config, &headers, &params)?;
    let search = validate_everything(&params, Utc::now())?;
    let page = search_everything(&state.corpus, &search);
    debug!(total = page.total_results, returned = page.articles.len(), "everything");
    Ok(Json(page))
}

pub async fn top_headlines(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ArticlesPage>, ApiError> {
    let params = Params::new(pairs);
    authenticate(&state.config, &headers, &params)?;
    let page = search_headlines(&state.corpus, &params)?;
    debug!(total = page.total_results, returned = page.articles.len(), "top-headlines");
    Ok(Json(page))
}

pub async fn sources(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SourcesPage>, ApiError> {
    let params = Params::new(pairs);
    authenticate(&state.config, &headers, &params)?;
    Ok(Json(list_sources(&state.corpus, &params)))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        Params::new(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-19T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn error(pairs: &[(&str, &str)]) -> ApiError {
        validate_everything(&params(pairs), now()).unwrap_err()
    }

    #[test]
    fn scope_is_required() {
        assert_eq!(error(&[("pageSize", "5")]).code, "parametersMissing");
        assert_eq!(error(&[("q", "")]).code, "parametersMissing");
        assert!(validate_everything(&params(&[("domains", "bbc.co.uk")]), now()).is_ok());
    }

    #[test]
    fn long_query_reports_its_length() {
        let q = "a".repeat(501);
        let err = error(&[("q", q.as_str())]);
        assert_eq!(err.code, "queryTooLong");
        assert!(err.message.starts_with("Your query is too long (501 chars)."));
        assert!(validate_everything(&params(&[("q", "a".repeat(500).as_str())]), now()).is_ok());
    }

    #[test]
    fn page_errors_quote_the_page_size() {
        let err = error(&[("q", "spain"), ("page", "0"), ("pageSize", "10")]);
        assert_eq!(err.code, "pageCannotBeLessThanOne");
        assert_eq!(err.message, "The page parameter cannot be less than 1. You have requested 10.");
        let err = error(&[("q", "spain"), ("page", "not-digits"), ("pageSize", "10")]);
        assert_eq!(err.code, "pageCannotBeLessThanOne");
        assert_eq!(err.message, REQUEST_INVALID);
    }

    #[test]
    fn page_size_limits() {
        let err = error(&[("q", "ai"), ("pageSize", "-1")]);
        assert_eq!(err.message, PAGE_SIZE_TOO_SMALL);
        let err = error(&[("q", "ai"), ("pageSize", "")]);
        assert_eq!(err.message, REQUEST_INVALID);
        let err = error(&[("q", "ai"), ("page", "1"), ("pageSize", "1000000")]);
        assert_eq!(err.status, StatusCode::EXPECTATION_FAILED);
        assert_eq!(err.code, "maximumResultsReached");
        let err = error(&[("q", "ai"), ("page", "2"), ("pageSize", "100")]);
        assert_eq!(err.code, "maximumResultsReached");
    }

    #[test]
    fn from_older_than_five_years_is_rejected() {
        let err = error(&[("q", "solidity"), ("from", "2021-10-18")]);
        assert_eq!(err.status, StatusCode::EXPECTATION_FAILED);
        assert_eq!(err.code, "parameterInvalid");
        assert!(validate_everything(&params(&[("q", "solidity"), ("from", "2021-10-21")]), now()).is_ok());
    }

    #[test]
    fn invalid_search_in_names_the_field() {
        let err = error(&[("q", "silo"), ("searchIn", "title,invalid")]);
        assert_eq!(err.code, "parameterInvalid");
        assert!(err.message.contains("You have entered 'invalid'"));
    }

    #[test]
    fn date_window_is_inclusive() {
        let corpus = Corpus::generate();
        let first = corpus.articles[0].article.published_at.clone();
        let search =
            validate_everything(&params(&[("q", "x"), ("from", first.as_str()), ("to", first.as_str())]), now()).unwrap();
        let page = search_everything(&corpus, &search);
        assert_eq!(page.total_results, 1);
    }

    #[test]
    fn unknown_language_matches_nothing() {
        let corpus = Corpus::generate();
        let search = validate_everything(&params(&[("q", "radiohead"), ("language", "invalid")]), now()).unwrap();
        assert_eq!(search_everything(&corpus, &search).total_results, 0);
        let search = validate_everything(&params(&[("q", "radiohead"), ("language", "")]), now()).unwrap();
        assert_eq!(search_everything(&corpus, &search).total_results, corpus.articles.len());
    }

    #[test]
    fn headlines_default_to_twenty() {
        let corpus = Corpus::generate();
        let page = search_headlines(&corpus, &params(&[("country", "us")])).unwrap();
        assert_eq!(page.articles.len(), 20);
        assert!(search_headlines(&corpus, &params(&[])).is_err());
    }

    #[test]
    fn unknown_source_filters_are_ignored() {
        let corpus = Corpus::generate();
        let all = list_sources(&corpus, &params(&[("category", "all")]));
        assert_eq!(all.sources.len(), corpus.sources.len());
        let sports = list_sources(&corpus, &params(&[("category", "sports")]));
        assert!(!sports.sources.is_empty());
        assert!(sports.sources.iter().all(|s| s.category == "sports"));
    }
}
