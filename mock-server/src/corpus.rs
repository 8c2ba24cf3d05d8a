//! Deterministic synthetic data behind the reference server.
//!
//! The corpus is generated once at startup from fixed tables, so every run
//! serves byte-identical results for the same request.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Article, Source, SourceRef};

pub const CATEGORIES: &[&str] =
    &["business", "entertainment", "general", "health", "science", "sports", "technology"];

pub const LANGUAGES: &[&str] =
    &["ar", "de", "en", "es", "fr", "he", "it", "nl", "no", "pt", "ru", "sv", "ud", "zh"];

pub const COUNTRIES: &[&str] = &[
    "ae", "ar", "at", "au", "be", "bg", "br", "ca", "ch", "cn", "co", "cu", "cz", "de", "eg", "fr", "gb", "gr",
    "hk", "hu", "id", "ie", "il", "in", "it", "jp", "kr", "lt", "lv", "ma", "mx", "my", "ng", "nl", "no", "nz",
    "ph", "pl", "pt", "ro", "rs", "ru", "sa", "se", "sg", "si", "sk", "th", "tr", "tw", "ua", "us", "ve", "za",
];

/// (id, name, url, category, language, country)
const NAMED_SOURCES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("abc-news", "ABC News", "https://abcnews.go.com", "general", "en", "us"),
    ("associated-press", "Associated Press", "https://apnews.com/", "general", "en", "us"),
    ("bbc-news", "BBC News", "https://www.bbc.co.uk/news", "general", "en", "gb"),
    ("die-zeit", "Die Zeit", "https://www.zeit.de/index", "business", "de", "de"),
    ("engadget", "Engadget", "https://www.engadget.com", "technology", "en", "us"),
    ("financial-post", "Financial Post", "https://business.financialpost.com", "business", "en", "ca"),
    ("handelsblatt", "Handelsblatt", "https://www.handelsblatt.com", "business", "de", "de"),
    ("techcrunch", "TechCrunch", "https://techcrunch.com", "technology", "en", "us"),
    ("the-verge", "The Verge", "https://www.theverge.com", "technology", "en", "us"),
];

const GENERATED_SOURCES: usize = 132;
const ARTICLE_COUNT: usize = 1200;
const ARTICLE_SPACING_MINUTES: i64 = 217;
/// 2025-01-01T00:00:00Z
const CORPUS_EPOCH_SECS: i64 = 1_735_689_600;

/// An article plus the metadata the server filters and sorts on.
#[derive(Clone, Debug)]
pub struct StoredArticle {
    pub article: Article,
    pub published: DateTime<Utc>,
    pub source_id: String,
    pub language: String,
    pub country: String,
    pub category: String,
    pub domain: String,
    pub popularity: u32,
    pub rank: usize,
}

#[derive(Clone, Debug)]
pub struct Corpus {
    pub sources: Vec<Source>,
    pub articles: Vec<StoredArticle>,
}

impl Corpus {
    pub fn generate() -> Self {
        let sources = generate_sources();
        let articles = generate_articles(&sources);
        Self { sources, articles }
    }
}

fn generate_sources() -> Vec<Source> {
    let named = NAMED_SOURCES.iter().map(|(id, name, url, category, language, country)| Source {
        id: (*id).to_string(),
        name: (*name).to_string(),
        description: format!("{name} delivers {category} coverage."),
        url: (*url).to_string(),
        category: (*category).to_string(),
        language: (*language).to_string(),
        country: (*country).to_string(),
    });
    let generated = (0..GENERATED_SOURCES).map(|i| {
        let category = CATEGORIES[i % CATEGORIES.len()];
        let language = LANGUAGES[(i * 5) % LANGUAGES.len()];
        let country = COUNTRIES[(i * 11) % COUNTRIES.len()];
        let id = format!("{country}-{category}-wire-{i}");
        let name = format!("{} {} Wire {}", country.to_uppercase(), title_case(category), i + 1);
        Source {
            description: format!("{name} delivers {category} coverage."),
            url: format!("https://{id}.example.com"),
            id,
            name,
            category: category.to_string(),
            language: language.to_string(),
            country: country.to_string(),
        }
    });
    named.chain(generated).collect()
}

fn generate_articles(sources: &[Source]) -> Vec<StoredArticle> {
    let epoch = DateTime::<Utc>::from_timestamp(CORPUS_EPOCH_SECS, 0).unwrap_or_default();
    (0..ARTICLE_COUNT)
        .map(|i| {
            let source = &sources[i % sources.len()];
            let published = epoch + Duration::minutes(ARTICLE_SPACING_MINUTES * i as i64);
            let named = NAMED_SOURCES.iter().any(|(id, ..)| *id == source.id);
            let domain = domain_of(&source.url);
            let slug = format!("story-{i}");
            let article = Article {
                source: SourceRef {
                    id: named.then(|| source.id.clone()),
                    name: source.name.clone(),
                },
                author: (i % 3 != 0).then(|| format!("Reporter {}", i % 41 + 1)),
                title: format!("{} report #{i}", title_case(&source.category)),
                description: (i % 5 != 0).then(|| format!("Summary of {} story {i}.", source.category)),
                url: format!("https://{domain}/{slug}"),
                url_to_image: (i % 4 != 0).then(|| format!("https://{domain}/images/{slug}.jpg")),
                published_at: published.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                content: (i % 7 != 0).then(|| format!("Full text of story {i} [+{} chars]", 1000 + i)),
            };
            StoredArticle {
                article,
                published,
                source_id: source.id.clone(),
                language: source.language.clone(),
                country: source.country.clone(),
                category: source.category.clone(),
                domain,
                popularity: ((i * 7919) % 1000) as u32,
                rank: i,
            }
        })
        .collect()
}

/// Host of `url` without scheme, path or a leading `www.`.
pub fn domain_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = without_scheme.split('/').next().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_ascii_lowercase()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
