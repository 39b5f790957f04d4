//! SerpAPI web search client
//!
//! Fetches Google results localized to Japan and condenses them into a
//! short text block for prompt context.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ResearchError, WebSearch};

/// Organic results folded into the summary at most
const MAX_SNIPPETS: usize = 5;

/// Returned as ordinary text when nothing useful came back
pub const NO_RESULT_NOTICE: &str = "検索結果が見つかりませんでした";

/// Client for the SerpAPI search endpoint
pub struct SerpApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl SerpApiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ResearchError> {
        let api_key = api_key.into();
        debug!("SerpApiClient::new: called");
        if api_key.trim().is_empty() {
            return Err(ResearchError::InvalidResponse("SerpAPI key is empty".to_string()));
        }

        let http = Client::builder().timeout(timeout).build().map_err(ResearchError::Network)?;
        Ok(Self {
            api_key,
            base_url: base_url.into(),
            http,
        })
    }
}

#[async_trait]
impl WebSearch for SerpApiClient {
    async fn search(&self, query: &str) -> Result<String, ResearchError> {
        debug!(%query, "search: called");
        let url = format!("{}/search.json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("engine", "google"),
                ("hl", "ja"),
                ("gl", "jp"),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ResearchError::ApiError { status, message: text });
        }

        let api_response: SerpResponse = response.json().await?;
        Ok(summarize(api_response))
    }
}

/// Pick the most direct answer available: answer box, then knowledge graph,
/// then a handful of organic snippets
fn summarize(response: SerpResponse) -> String {
    if let Some(answer_box) = response.answer_box {
        if let Some(answer) = non_empty(answer_box.answer) {
            return answer;
        }
        if let Some(snippet) = non_empty(answer_box.snippet) {
            return snippet;
        }
    }

    if let Some(graph) = response.knowledge_graph {
        if let Some(description) = non_empty(graph.description) {
            return description;
        }
    }

    let snippets: Vec<String> = response
        .organic_results
        .into_iter()
        .filter_map(|result| non_empty(result.snippet))
        .take(MAX_SNIPPETS)
        .collect();

    if snippets.is_empty() {
        NO_RESULT_NOTICE.to_string()
    } else {
        snippets.join("\n")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// SerpAPI response types

#[derive(Debug, Deserialize)]
struct SerpResponse {
    answer_box: Option<AnswerBox>,
    knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct AnswerBox {
    answer: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KnowledgeGraph {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = SerpApiClient::new("", "https://serpapi.com", Duration::from_secs(10));
        assert!(matches!(result, Err(ResearchError::InvalidResponse(_))));
    }

    #[test]
    fn test_summarize_prefers_answer_box_answer() {
        let json = r#"{
            "answer_box": {"answer": "桜の見頃は3月下旬です", "snippet": "こちらは使いません"},
            "organic_results": [{"snippet": "これも使いません"}]
        }"#;
        let response: SerpResponse = serde_json::from_str(json).unwrap();

        assert_eq!(summarize(response), "桜の見頃は3月下旬です");
    }

    #[test]
    fn test_summarize_falls_back_to_answer_box_snippet() {
        let json = r#"{"answer_box": {"snippet": "京都のおすすめスポット一覧"}}"#;
        let response: SerpResponse = serde_json::from_str(json).unwrap();

        assert_eq!(summarize(response), "京都のおすすめスポット一覧");
    }

    #[test]
    fn test_summarize_uses_knowledge_graph_description() {
        let json = r#"{"knowledge_graph": {"description": "京都は千年の都です"}}"#;
        let response: SerpResponse = serde_json::from_str(json).unwrap();

        assert_eq!(summarize(response), "京都は千年の都です");
    }

    #[test]
    fn test_summarize_joins_limited_organic_snippets() {
        let json = r#"{"organic_results": [
            {"snippet": "一"}, {"snippet": "二"}, {"snippet": "三"},
            {"snippet": "四"}, {"snippet": "五"}, {"snippet": "六"}
        ]}"#;
        let response: SerpResponse = serde_json::from_str(json).unwrap();

        let summary = summarize(response);
        assert_eq!(summary, "一\n二\n三\n四\n五");
    }

    #[test]
    fn test_summarize_empty_response_yields_notice() {
        let response: SerpResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(summarize(response), NO_RESULT_NOTICE);
    }
}
