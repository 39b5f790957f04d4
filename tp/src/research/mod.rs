//! External research providers
//!
//! Thin clients over an encyclopedic lookup and a web search. The workflow
//! engine only sees the capability traits; web search is optional and the
//! engine runs without it when no credential is configured.

use async_trait::async_trait;

mod error;
mod serpapi;
mod wikipedia;

pub use error::ResearchError;
pub use serpapi::{NO_RESULT_NOTICE, SerpApiClient};
pub use wikipedia::{NO_ARTICLE_NOTICE, WikipediaClient};

/// Encyclopedic destination lookup
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Look up reference information for a free-text query
    async fn lookup(&self, query: &str) -> Result<String, ResearchError>;
}

/// Web search for current, season-dependent information
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, ResearchError>;
}
