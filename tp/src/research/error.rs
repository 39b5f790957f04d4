//! Research provider error types

use thiserror::Error;

/// Errors from the encyclopedia and web-search providers
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
