// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NewsAPI adapter: top headlines, full-text search and source listings.

use crate::services::fetch::{Fetched, Upstream};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://newsapi.org/v2";

/// Sent as a header so the key never shows up in logged request URLs.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Categories supported by the headlines endpoint.
pub const CATEGORIES: &[&str] = &[
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// NewsAPI client. Requires an API key.
#[derive(Clone)]
pub struct NewsClient {
    upstream: Upstream,
    api_key: Option<String>,
}

/// Parameters for `/top-headlines`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeadlinesParams {
    pub country: String,
    pub category: Option<String>,
    #[serde(rename = "q")]
    pub query: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for HeadlinesParams {
    fn default() -> Self {
        Self {
            country: "us".to_string(),
            category: None,
            query: None,
            page: 1,
            page_size: 20,
        }
    }
}

/// Parameters for `/everything`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[serde(rename = "q")]
    pub query: String,
    #[serde(rename = "from")]
    pub from_date: Option<String>,
    #[serde(rename = "to")]
    pub to_date: Option<String>,
    pub language: String,
    pub sort_by: String,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            from_date: None,
            to_date: None,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            page: 1,
            page_size: 20,
        }
    }
}

/// Parameters for `/top-headlines/sources`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesParams {
    pub category: Option<String>,
    pub language: String,
    pub country: Option<String>,
}

impl Default for SourcesParams {
    fn default() -> Self {
        Self {
            category: None,
            language: "en".to_string(),
            country: None,
        }
    }
}

impl NewsClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            upstream: Upstream::new(http, "news", BASE_URL),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.upstream.set_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream.set_timeout(timeout);
        self
    }

    /// Usable when a key is configured.
    pub fn check_status(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build an authenticated request, or `None` without a key.
    fn authed(&self, path: &str) -> Option<reqwest::RequestBuilder> {
        let key = self.api_key.as_deref()?;
        Some(self.upstream.get(path).header(API_KEY_HEADER, key))
    }

    pub async fn top_headlines(&self, params: &HeadlinesParams) -> Fetched<NewsPage> {
        let Some(request) = self.authed("/top-headlines") else {
            return self.upstream.missing_credential("top_headlines");
        };

        let mut query = vec![
            ("country", params.country.clone()),
            ("page", params.page.to_string()),
            ("pageSize", params.page_size.to_string()),
        ];
        if let Some(category) = &params.category {
            query.push(("category", category.clone()));
        }
        if let Some(q) = &params.query {
            query.push(("q", q.clone()));
        }

        self.upstream
            .fetch("top_headlines", request.query(&query), RawPage::into_page)
            .await
    }

    pub async fn search_everything(&self, params: &SearchParams) -> Fetched<NewsPage> {
        let Some(request) = self.authed("/everything") else {
            return self.upstream.missing_credential("search_everything");
        };

        let mut query = vec![
            ("q", params.query.clone()),
            ("language", params.language.clone()),
            ("sortBy", params.sort_by.clone()),
            ("page", params.page.to_string()),
            ("pageSize", params.page_size.to_string()),
        ];
        if let Some(from) = &params.from_date {
            query.push(("from", from.clone()));
        }
        if let Some(to) = &params.to_date {
            query.push(("to", to.clone()));
        }

        self.upstream
            .fetch("search_everything", request.query(&query), RawPage::into_page)
            .await
    }

    /// Short search used by the dashboard widgets.
    pub async fn search(&self, query: &str, page_size: u32) -> Fetched<NewsPage> {
        let params = SearchParams {
            query: query.to_string(),
            page_size,
            ..SearchParams::default()
        };
        self.search_everything(&params).await
    }

    pub async fn sources(&self, params: &SourcesParams) -> Fetched<Vec<NewsSource>> {
        let Some(request) = self.authed("/top-headlines/sources") else {
            return self.upstream.missing_credential("sources");
        };

        let mut query = vec![("language", params.language.clone())];
        if let Some(category) = &params.category {
            query.push(("category", category.clone()));
        }
        if let Some(country) = &params.country {
            query.push(("country", country.clone()));
        }

        self.upstream
            .fetch("sources", request.query(&query), |raw: RawSources| {
                raw.sources
                    .unwrap_or_default()
                    .into_iter()
                    .map(RawSource::into_source)
                    .collect()
            })
            .await
    }
}

// ─── Output Shapes ───────────────────────────────────────────

/// One page of articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total_results: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    /// Publisher name
    pub source: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub language: String,
    pub country: String,
}

// ─── Provider Payloads ───────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage {
    articles: Option<Vec<RawArticle>>,
    total_results: Option<u64>,
}

#[derive(Deserialize)]
struct RawArticleSource {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    source: Option<RawArticleSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

impl RawPage {
    fn into_page(self) -> NewsPage {
        NewsPage {
            articles: self
                .articles
                .unwrap_or_default()
                .into_iter()
                .map(|a| Article {
                    title: a.title.unwrap_or_default(),
                    description: a.description,
                    url: a.url.unwrap_or_default(),
                    image_url: a.url_to_image,
                    source: a.source.and_then(|s| s.name).unwrap_or_default(),
                    published_at: a.published_at,
                })
                .collect(),
            total_results: self.total_results.unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct RawSources {
    sources: Option<Vec<RawSource>>,
}

#[derive(Deserialize)]
struct RawSource {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    url: Option<String>,
    category: Option<String>,
    language: Option<String>,
    country: Option<String>,
}

impl RawSource {
    fn into_source(self) -> NewsSource {
        NewsSource {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_reshape_flattens_source() {
        let raw: RawPage = serde_json::from_value(serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": { "id": null, "name": "The Verge" },
                    "title": "Rust 2.0 announced",
                    "url": "https://example.com/rust",
                    "urlToImage": "https://example.com/rust.png",
                    "publishedAt": "2024-04-01T10:00:00Z"
                },
                { "title": "Untitled source" }
            ]
        }))
        .unwrap();

        let page = raw.into_page();
        assert_eq!(page.total_results, 2);
        assert_eq!(page.articles[0].source, "The Verge");
        assert_eq!(
            page.articles[0].image_url.as_deref(),
            Some("https://example.com/rust.png")
        );
        assert_eq!(page.articles[1].source, "");
        assert_eq!(page.articles[1].url, "");
        assert!(page.articles[1].description.is_none());
    }

    #[test]
    fn test_headline_defaults() {
        let params: HeadlinesParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.country, "us");
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
    }
}
