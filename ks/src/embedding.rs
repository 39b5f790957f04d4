//! Embedding client trait and the hosted OpenAI implementation
//!
//! Embeddings are load-bearing for every query, so construction fails fast
//! when the backend cannot be reached or configured, unlike the optional
//! research providers upstream.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Errors that can occur during embedding operations
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding backend misconfigured: {0}")]
    Configuration(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Turns text into fixed-length vectors
///
/// One vector per input text, returned in input order. Implementations are
/// stateless per call and shared across requests behind an `Arc`.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Hosted embedding client for the OpenAI `/v1/embeddings` endpoint
pub struct OpenAIEmbeddings {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenAIEmbeddings {
    /// Create a new client; fails if the API key is empty or the HTTP client
    /// cannot be built
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let api_key = api_key.into();
        let model = model.into();
        debug!(%model, "OpenAIEmbeddings::new: called");

        if api_key.trim().is_empty() {
            return Err(EmbeddingError::Configuration("API key is empty".to_string()));
        }

        let http = Client::builder().timeout(timeout).build().map_err(EmbeddingError::Network)?;

        Ok(Self {
            model,
            api_key,
            base_url: base_url.into(),
            http,
        })
    }

    fn build_request_body(&self, texts: &[String]) -> serde_json::Value {
        debug!(%self.model, input_count = texts.len(), "build_request_body: called");
        serde_json::json!({
            "model": self.model,
            "input": texts,
        })
    }

    /// Order vectors by the API's `index` field and check the count
    fn parse_response(&self, api_response: EmbeddingsResponse, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(returned = api_response.data.len(), expected, "parse_response: called");
        if api_response.data.len() != expected {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                expected,
                api_response.data.len()
            )));
        }

        let mut data = api_response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingClient for OpenAIEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(%self.model, input_count = texts.len(), "embed: called");
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = self.build_request_body(texts);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "embed: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "embed: network error");
                    last_error = Some(EmbeddingError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("embed: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                return Err(EmbeddingError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "embed: retryable error");
                last_error = Some(EmbeddingError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(%status, "embed: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::ApiError { status, message: text });
            }

            debug!("embed: success");
            let api_response: EmbeddingsResponse = response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
            return self.parse_response(api_response, texts.len());
        }

        Err(last_error.unwrap_or_else(|| EmbeddingError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = OpenAIEmbeddings::new("", "text-embedding-3-small", "https://api.openai.com", Duration::from_secs(10));
        assert!(matches!(result, Err(EmbeddingError::Configuration(_))));
    }

    #[test]
    fn test_build_request_body() {
        let client = OpenAIEmbeddings::new(
            "test-key",
            "text-embedding-3-small",
            "https://api.openai.com",
            Duration::from_secs(10),
        )
        .unwrap();

        let texts = vec!["京都".to_string(), "温泉".to_string()];
        let body = client.build_request_body(&texts);

        assert_eq!(body["model"], "text-embedding-3-small");
        assert_eq!(body["input"][0], "京都");
        assert_eq!(body["input"][1], "温泉");
    }

    #[test]
    fn test_parse_response_restores_input_order() {
        let client = OpenAIEmbeddings::new(
            "test-key",
            "text-embedding-3-small",
            "https://api.openai.com",
            Duration::from_secs(10),
        )
        .unwrap();

        let api_response = EmbeddingsResponse {
            data: vec![
                EmbeddingData {
                    index: 1,
                    embedding: vec![1.0, 0.0],
                },
                EmbeddingData {
                    index: 0,
                    embedding: vec![0.0, 1.0],
                },
            ],
        };

        let vectors = client.parse_response(api_response, 2).unwrap();
        assert_eq!(vectors[0], vec![0.0, 1.0]);
        assert_eq!(vectors[1], vec![1.0, 0.0]);
    }

    #[test]
    fn test_parse_response_rejects_count_mismatch() {
        let client = OpenAIEmbeddings::new(
            "test-key",
            "text-embedding-3-small",
            "https://api.openai.com",
            Duration::from_secs(10),
        )
        .unwrap();

        let api_response = EmbeddingsResponse {
            data: vec![EmbeddingData {
                index: 0,
                embedding: vec![1.0],
            }],
        };

        assert!(matches!(
            client.parse_response(api_response, 2),
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_embeddings_deterministic() {
        let mock = mock::MockEmbeddings::new();
        let texts = vec!["京都の観光".to_string()];

        let a = mock.embed(&texts).await.unwrap();
        let b = mock.embed(&texts).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_embeddings_failing_after() {
        let mock = mock::MockEmbeddings::failing_after(1);
        let texts = vec!["test".to_string()];

        assert!(mock.embed(&texts).await.is_ok());
        assert!(mock.embed(&texts).await.is_err());
    }
}
