//! Planning workflow engine
//!
//! Drives the state machine over the trip request: research, knowledge
//! retrieval, plan generation, recommendation, and the error handler. Step
//! failures are captured into state and routed; only routing bugs surface
//! as `Err` from [`PlannerEngine::run`].

use std::collections::HashMap;
use std::sync::Arc;

use knowledgestore::KnowledgeStore;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::TripRequest;
use crate::llm::{CompletionRequest, LlmClient};
use crate::research::{Encyclopedia, WebSearch};
use crate::workflow::prompts;
use crate::workflow::state::{
    PlanningState, SOURCE_ENCYCLOPEDIA, SOURCE_WEB_SEARCH, WorkflowStep,
};

/// Upper bound on router transitions for one request
///
/// The graph is acyclic, so reaching this means a routing bug rather than a
/// slow request.
const MAX_TRANSITIONS: usize = 8;

/// Default number of knowledge-base hits fed into plan generation
pub const DEFAULT_TOP_K: usize = 3;

/// Errors that escape the workflow graph
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Transition limit of {limit} exceeded, routing is stuck")]
    TransitionLimit { limit: usize },
}

/// Final payload handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlanningResult {
    /// A renderable plan, possibly the fallback
    Complete {
        travel_plan: String,
        additional_info: String,
    },
    /// Failure outside the graph, nothing renderable
    Failed { error: String },
}

/// Sequences the planning steps for one trip request at a time
pub struct PlannerEngine {
    llm: Arc<dyn LlmClient>,
    encyclopedia: Arc<dyn Encyclopedia>,
    web_search: Option<Arc<dyn WebSearch>>,
    knowledge: Arc<KnowledgeStore>,
    top_k: usize,
}

impl PlannerEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        encyclopedia: Arc<dyn Encyclopedia>,
        web_search: Option<Arc<dyn WebSearch>>,
        knowledge: Arc<KnowledgeStore>,
    ) -> Self {
        Self {
            llm,
            encyclopedia,
            web_search,
            knowledge,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Full planning entry point: build the initial state, run the graph,
    /// extract the payload
    pub async fn generate_plan(&self, request: TripRequest) -> PlanningResult {
        let plan_id = Uuid::now_v7();
        info!(%plan_id, destination = %request.destination, "generate_plan: called");

        let state = PlanningState::new(request);
        match self.run(state).await {
            Ok(final_state) => {
                info!(%plan_id, "generate_plan: workflow complete");
                PlanningResult::Complete {
                    travel_plan: final_state.travel_plan,
                    additional_info: final_state.additional_info,
                }
            }
            Err(e) => {
                warn!(%plan_id, error = %e, "generate_plan: workflow failed");
                PlanningResult::Failed {
                    error: format!("旅行プランの生成中にエラーが発生しました: {}", e),
                }
            }
        }
    }

    /// Run the workflow to completion and return the final state
    ///
    /// Step failures route through the error handler and still end in a
    /// renderable plan.
    pub async fn run(&self, state: PlanningState) -> Result<PlanningState, WorkflowError> {
        let mut state = state.route_entry();
        let mut transitions = 0;

        loop {
            transitions += 1;
            if transitions > MAX_TRANSITIONS {
                warn!(limit = MAX_TRANSITIONS, "run: transition limit exceeded");
                return Err(WorkflowError::TransitionLimit {
                    limit: MAX_TRANSITIONS,
                });
            }

            debug!(step = %state.next_step, transitions, "run: entering step");
            state = match state.next_step {
                WorkflowStep::Research => self.research(state).await,
                WorkflowStep::Retrieval => self.retrieve(state).await,
                WorkflowStep::PlanGeneration => self.generate(state).await,
                WorkflowStep::Recommendation => self.recommend(state).await,
                WorkflowStep::ErrorHandler => self.handle_error(state),
                WorkflowStep::End => break,
            };
        }

        Ok(state)
    }

    /// Gather destination information from the encyclopedia and, when
    /// configured, the web
    async fn research(&self, state: PlanningState) -> PlanningState {
        let destination = state.trip_request.destination.clone();
        let wiki_query = format!("{}の観光情報、見どころ、アクセス", destination);
        debug!(%wiki_query, "research: called");

        let encyclopedia_text = match self.encyclopedia.lookup(&wiki_query).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "research: encyclopedia lookup failed");
                return state.with_error(format!("研究中にエラーが発生しました: {}", e));
            }
        };

        let mut results = HashMap::new();
        results.insert(SOURCE_ENCYCLOPEDIA.to_string(), encyclopedia_text);

        if let Some(web_search) = &self.web_search {
            let web_query = format!("{} 観光 おすすめ スポット", destination);
            match web_search.search(&web_query).await {
                Ok(text) => {
                    results.insert(SOURCE_WEB_SEARCH.to_string(), text);
                }
                Err(e) => {
                    warn!(error = %e, "research: web search failed");
                    return state.with_error(format!("研究中にエラーが発生しました: {}", e));
                }
            }
        } else {
            debug!("research: web search not configured, skipping");
        }

        state.with_research_results(results)
    }

    /// Query the knowledge base for destination references
    ///
    /// A failure here degrades to zero hits instead of aborting the
    /// workflow.
    async fn retrieve(&self, state: PlanningState) -> PlanningState {
        let request = &state.trip_request;
        let query = format!(
            "{} {} {}",
            request.destination, request.purpose, request.duration
        );
        debug!(%query, top_k = self.top_k, "retrieve: called");

        match self.knowledge.query(&query, self.top_k).await {
            Ok(hits) => {
                debug!(hit_count = hits.len(), "retrieve: search complete");
                state.with_retrieval_hits(hits)
            }
            Err(e) => {
                warn!(error = %e, "retrieve: knowledge base query failed, continuing without hits");
                state.with_retrieval_degraded(format!(
                    "ナレッジベース検索中にエラーが発生しました: {}",
                    e
                ))
            }
        }
    }

    async fn generate(&self, state: PlanningState) -> PlanningState {
        debug!("generate: called");
        let request =
            CompletionRequest::new(prompts::PLAN_SYSTEM_PROMPT, prompts::plan_user_message(&state));

        match self.llm.complete(request).await {
            Ok(response) => {
                debug!(
                    output_tokens = response.usage.output_tokens,
                    "generate: plan received"
                );
                state.with_travel_plan(response.content)
            }
            Err(e) => {
                warn!(error = %e, "generate: plan generation failed");
                state.with_error(format!("旅行プラン生成中にエラーが発生しました: {}", e))
            }
        }
    }

    async fn recommend(&self, state: PlanningState) -> PlanningState {
        debug!("recommend: called");
        let request = CompletionRequest::new(
            prompts::RECOMMENDATION_SYSTEM_PROMPT,
            prompts::recommendation_user_message(&state),
        );

        match self.llm.complete(request).await {
            Ok(response) => {
                debug!(
                    output_tokens = response.usage.output_tokens,
                    "recommend: advice received"
                );
                state.with_additional_info(response.content)
            }
            Err(e) => {
                warn!(error = %e, "recommend: recommendation failed");
                state.with_error(format!("追加情報生成中にエラーが発生しました: {}", e))
            }
        }
    }

    /// Produce the fallback plan from whatever the state already holds
    fn handle_error(&self, state: PlanningState) -> PlanningState {
        debug!(error = %state.error, "handle_error: called");
        let fallback = prompts::fallback_plan(&state);
        state.with_fallback_plan(fallback)
    }
}
