//! Trip planner - AI-assisted Japan travel itineraries
//!
//! The planner runs a directed workflow over each trip request: research the
//! destination, retrieve local knowledge, generate an itinerary, then add
//! travel advice. A step failure never aborts the run; it routes through an
//! error handler that still produces a renderable plan.
//!
//! # Core Concepts
//!
//! - **State as Data**: Each step consumes the planning state and returns the
//!   next one, errors included
//! - **Degraded over Dead**: Retrieval failures and missing search keys reduce
//!   the plan's inputs, never the availability of a plan
//! - **Japanese Throughout**: Prompts, plans, and error text are all Japanese
//!
//! # Modules
//!
//! - [`workflow`] - Planning state machine, prompts, and the engine
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`research`] - Wikipedia and SerpAPI research sources
//! - [`domain`] - Trip request types and form bands
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod research;
pub mod workflow;

// Re-export commonly used types
pub use config::{Config, KnowledgeConfig, LlmConfig, ResearchConfig};
pub use domain::{BudgetBand, DurationBand, TripRequest};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use research::{Encyclopedia, ResearchError, SerpApiClient, WebSearch, WikipediaClient};
pub use workflow::{
    PlannerEngine, PlanningResult, PlanningState, WorkflowError, WorkflowStep,
};
