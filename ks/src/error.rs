//! KnowledgeStore error types

use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Errors that can occur while building or querying the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
