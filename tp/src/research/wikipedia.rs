//! Wikipedia encyclopedia client
//!
//! Looks up destinations through the MediaWiki API in two phases: a title
//! search, then plain-text intro extracts for the matched articles.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{Encyclopedia, ResearchError};

/// Articles fetched per lookup
const SEARCH_LIMIT: &str = "3";

/// Returned as ordinary text when the search matches nothing
pub const NO_ARTICLE_NOTICE: &str = "該当する記事が見つかりませんでした";

/// Client for a language-specific Wikipedia API endpoint
pub struct WikipediaClient {
    api_url: String,
    http: Client,
}

impl WikipediaClient {
    pub fn new(lang: &str, timeout: Duration) -> Result<Self, ResearchError> {
        debug!(%lang, "WikipediaClient::new: called");
        let http = Client::builder().timeout(timeout).build().map_err(ResearchError::Network)?;
        Ok(Self {
            api_url: format!("https://{}.wikipedia.org/w/api.php", lang),
            http,
        })
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, ResearchError> {
        debug!(%query, "search_titles: called");
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", SEARCH_LIMIT),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ResearchError::ApiError { status, message: text });
        }

        let api_response: SearchResponse = response.json().await?;
        Ok(titles_from_search(api_response))
    }

    async fn fetch_extracts(&self, titles: &[String]) -> Result<String, ResearchError> {
        debug!(title_count = titles.len(), "fetch_extracts: called");
        let joined = titles.join("|");
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", joined.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ResearchError::ApiError { status, message: text });
        }

        let api_response: ExtractResponse = response.json().await?;
        Ok(assemble_extracts(api_response))
    }
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    async fn lookup(&self, query: &str) -> Result<String, ResearchError> {
        debug!(%query, "lookup: called");
        let titles = self.search_titles(query).await?;
        if titles.is_empty() {
            debug!("lookup: no matching articles");
            return Ok(NO_ARTICLE_NOTICE.to_string());
        }

        let text = self.fetch_extracts(&titles).await?;
        if text.is_empty() {
            debug!("lookup: matched articles had no extracts");
            return Ok(NO_ARTICLE_NOTICE.to_string());
        }
        Ok(text)
    }
}

fn titles_from_search(response: SearchResponse) -> Vec<String> {
    response
        .query
        .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
        .unwrap_or_default()
}

/// Render each article as a `## title` section, skipping empty extracts
fn assemble_extracts(response: ExtractResponse) -> String {
    let pages = response.query.map(|q| q.pages).unwrap_or_default();
    let sections: Vec<String> = pages
        .into_iter()
        .filter_map(|page| {
            let extract = page.extract?;
            let trimmed = extract.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(format!("## {}\n{}", page.title, trimmed))
            }
        })
        .collect();
    sections.join("\n\n")
}

// MediaWiki API response types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    extract: Option<String>,
}
