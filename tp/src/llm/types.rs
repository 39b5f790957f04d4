//! Request and response types for LLM completions

use serde::{Deserialize, Serialize};

/// A single completion request: one system prompt, one user message
///
/// Every call is independent. No conversation state is carried between
/// requests; each workflow step supplies the full context it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Role and formatting instructions for the model
    pub system_prompt: String,
    /// The task itself, with any gathered context inlined
    pub user_message: String,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub content: String,
    /// Token usage for the request
    pub usage: TokenUsage,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_new() {
        let req = CompletionRequest::new("あなたは旅行の専門家です。", "京都のプランを作成してください。");
        assert_eq!(req.system_prompt, "あなたは旅行の専門家です。");
        assert_eq!(req.user_message, "京都のプランを作成してください。");
    }

    #[test]
    fn test_token_usage_default_is_zero() {
        let usage = TokenUsage::default();
        assert_eq!(usage.input_tokens, 0);
        assert_eq!(usage.output_tokens, 0);
    }
}
