//! Wire types served by the reference server.
//!
//! # Design
//! These mirror the public news API schema but are defined independently of
//! the conformance crate's envelope model. The conformance tests run against
//! this server, so any drift between the two shows up as a failing scenario.

use serde::Serialize;

/// The `source` object embedded in an article.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: SourceRef,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: String,
    pub content: Option<String>,
}

/// An entry of the sources listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub language: String,
    pub country: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesPage {
    pub status: String,
    pub total_results: usize,
    pub articles: Vec<Article>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourcesPage {
    pub status: String,
    pub sources: Vec<Source>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_keeps_null_fields() {
        let article = Article {
            source: SourceRef {
                id: None,
                name: "Wire".to_string(),
            },
            author: None,
            title: "Title".to_string(),
            description: None,
            url: "https://example.com/a".to_string(),
            url_to_image: None,
            published_at: "2025-01-01T00:00:00Z".to_string(),
            content: None,
        };
        let json = serde_json::to_value(&article).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 8);
        assert!(object["author"].is_null());
        assert!(object.contains_key("urlToImage"));
        assert!(object.contains_key("publishedAt"));
        assert!(json["source"]["id"].is_null());
    }

    #[test]
    fn articles_page_uses_camel_case_total() {
        let page = ArticlesPage {
            status: "ok".to_string(),
            total_results: 0,
            articles: Vec::new(),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalResults"], 0);
        assert_eq!(json["status"], "ok");
    }
}
