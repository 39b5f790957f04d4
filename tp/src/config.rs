//! Trip planner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main trip planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level override (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Research source configuration
    pub research: ResearchConfig,

    /// Knowledge base configuration
    pub knowledge: KnowledgeConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks chunking parameters and required environment variables.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(eyre::eyre!(
                "knowledge chunk-overlap ({}) must be smaller than chunk-size ({})",
                self.knowledge.chunk_overlap,
                self.knowledge.chunk_size
            ));
        }

        // The same key authenticates chat completions and embeddings
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .tripplanner.yml
        let local_config = PathBuf::from(".tripplanner.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/tripplanner/tripplanner.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tripplanner").join("tripplanner.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to load config from {}: {}",
                            user_config.display(),
                            e
                        );
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Best-effort read of the log level from the config file, usable
    /// before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Research source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Wikipedia language edition
    #[serde(rename = "wikipedia-lang")]
    pub wikipedia_lang: String,

    /// Environment variable containing the SerpAPI key
    ///
    /// Web search is skipped entirely when the variable is unset.
    #[serde(rename = "serpapi-key-env")]
    pub serpapi_key_env: String,

    /// SerpAPI base URL
    #[serde(rename = "serpapi-base-url")]
    pub serpapi_base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            wikipedia_lang: "ja".to_string(),
            serpapi_key_env: "SERPAPI_API_KEY".to_string(),
            serpapi_base_url: "https://serpapi.com".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ResearchConfig {
    /// Get the research request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Knowledge base configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Directory holding the markdown and text documents
    pub dir: PathBuf,

    /// Chunk size in characters
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(rename = "chunk-overlap")]
    pub chunk_overlap: usize,

    /// Number of hits fed into plan generation
    #[serde(rename = "top-k")]
    pub top_k: usize,

    /// Embedding model identifier
    #[serde(rename = "embedding-model")]
    pub embedding_model: String,

    /// Embedding request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("knowledge_base"),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            embedding_model: "text-embedding-3-small".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl KnowledgeConfig {
    /// Get the embedding request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
