//! Planning workflow state and transitions

use std::collections::HashMap;

use knowledgestore::RetrievalHit;

use crate::domain::TripRequest;

/// Research result key for the encyclopedia lookup
pub const SOURCE_ENCYCLOPEDIA: &str = "encyclopedia";
/// Research result key for the web search
pub const SOURCE_WEB_SEARCH: &str = "web_search";

/// Steps of the planning workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowStep {
    Research,
    Retrieval,
    PlanGeneration,
    Recommendation,
    ErrorHandler,
    End,
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::Research => "research",
            Self::Retrieval => "retrieval",
            Self::PlanGeneration => "plan_generation",
            Self::Recommendation => "recommendation",
            Self::ErrorHandler => "error_handler",
            Self::End => "end",
        };
        write!(f, "{}", token)
    }
}

/// State threaded through the workflow
///
/// Immutable-update style: every transition consumes the previous state and
/// returns the next one with `next_step` already routed. Step failures are
/// recorded in `error` and routed, never raised across step boundaries.
#[derive(Clone, Debug)]
pub struct PlanningState {
    /// What the traveler asked for, read-only after construction
    pub trip_request: TripRequest,
    /// Guards re-entry into the research step
    pub research_done: bool,
    /// Raw text per research source
    pub research_results: HashMap<String, String>,
    /// Knowledge-base hits, descending relevance
    pub retrieval_results: Vec<RetrievalHit>,
    /// Primary itinerary text, possibly the fallback
    pub travel_plan: String,
    /// Supplementary advice
    pub additional_info: String,
    /// Last step failure, empty while everything succeeds
    pub error: String,
    /// Where the router goes next
    pub next_step: WorkflowStep,
}

impl PlanningState {
    pub fn new(trip_request: TripRequest) -> Self {
        Self {
            trip_request,
            research_done: false,
            research_results: HashMap::new(),
            retrieval_results: Vec::new(),
            travel_plan: String::new(),
            additional_info: String::new(),
            error: String::new(),
            next_step: WorkflowStep::Research,
        }
    }

    /// Entry routing: skip straight to generation when research is already
    /// done
    pub fn route_entry(mut self) -> Self {
        self.next_step = if self.research_done {
            WorkflowStep::PlanGeneration
        } else {
            WorkflowStep::Research
        };
        self
    }

    pub fn with_research_results(mut self, results: HashMap<String, String>) -> Self {
        self.research_results = results;
        self.research_done = true;
        self.next_step = WorkflowStep::Retrieval;
        self
    }

    /// Record a step failure and route to the error handler
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = message.into();
        self.next_step = WorkflowStep::ErrorHandler;
        self
    }

    pub fn with_retrieval_hits(mut self, hits: Vec<RetrievalHit>) -> Self {
        self.retrieval_results = hits;
        self.next_step = WorkflowStep::PlanGeneration;
        self
    }

    /// Degraded retrieval: keep the failure on record but continue to
    /// generation with zero hits
    pub fn with_retrieval_degraded(mut self, message: impl Into<String>) -> Self {
        self.error = message.into();
        self.retrieval_results = Vec::new();
        self.next_step = WorkflowStep::PlanGeneration;
        self
    }

    pub fn with_travel_plan(mut self, plan: impl Into<String>) -> Self {
        self.travel_plan = plan.into();
        self.next_step = WorkflowStep::Recommendation;
        self
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = info.into();
        self.next_step = WorkflowStep::End;
        self
    }

    /// Error handler output: the fallback is still a renderable plan
    pub fn with_fallback_plan(mut self, plan: impl Into<String>) -> Self {
        self.travel_plan = plan.into();
        self.next_step = WorkflowStep::End;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BudgetBand, DurationBand};

    fn request() -> TripRequest {
        TripRequest {
            origin: "東京".to_string(),
            destination: "京都".to_string(),
            budget: BudgetBand::Between50kAnd100k,
            duration: DurationBand::TwoNights,
            purpose: "観光".to_string(),
        }
    }

    #[test]
    fn test_new_state_starts_at_research() {
        let state = PlanningState::new(request());

        assert!(!state.research_done);
        assert!(state.research_results.is_empty());
        assert!(state.retrieval_results.is_empty());
        assert!(state.travel_plan.is_empty());
        assert!(state.additional_info.is_empty());
        assert!(state.error.is_empty());
        assert_eq!(state.next_step, WorkflowStep::Research);
    }

    #[test]
    fn test_route_entry_skips_research_when_done() {
        let fresh = PlanningState::new(request()).route_entry();
        assert_eq!(fresh.next_step, WorkflowStep::Research);

        let mut done = PlanningState::new(request());
        done.research_done = true;
        assert_eq!(done.route_entry().next_step, WorkflowStep::PlanGeneration);
    }

    #[test]
    fn test_research_results_route_to_retrieval() {
        let mut results = HashMap::new();
        results.insert(SOURCE_ENCYCLOPEDIA.to_string(), "京都の概要".to_string());

        let state = PlanningState::new(request()).with_research_results(results);

        assert!(state.research_done);
        assert_eq!(
            state.research_results.get(SOURCE_ENCYCLOPEDIA),
            Some(&"京都の概要".to_string())
        );
        assert_eq!(state.next_step, WorkflowStep::Retrieval);
    }

    #[test]
    fn test_error_routes_to_error_handler() {
        let state = PlanningState::new(request()).with_error("研究中にエラーが発生しました: timeout");

        assert_eq!(state.error, "研究中にエラーが発生しました: timeout");
        assert_eq!(state.next_step, WorkflowStep::ErrorHandler);
    }

    #[test]
    fn test_retrieval_hits_route_to_generation() {
        let hits = vec![RetrievalHit {
            content: "清水寺の情報".to_string(),
            source: "kyoto.md".to_string(),
            similarity_score: 0.9,
        }];

        let state = PlanningState::new(request()).with_retrieval_hits(hits);

        assert_eq!(state.retrieval_results.len(), 1);
        assert_eq!(state.next_step, WorkflowStep::PlanGeneration);
    }

    #[test]
    fn test_degraded_retrieval_continues_to_generation() {
        let state = PlanningState::new(request())
            .with_retrieval_degraded("ナレッジベース検索中にエラーが発生しました: down");

        assert!(state.retrieval_results.is_empty());
        assert!(!state.error.is_empty());
        assert_eq!(state.next_step, WorkflowStep::PlanGeneration);
    }

    #[test]
    fn test_plan_then_info_reach_end() {
        let state = PlanningState::new(request())
            .with_travel_plan("# プラン")
            .with_additional_info("## アドバイス");

        assert_eq!(state.travel_plan, "# プラン");
        assert_eq!(state.additional_info, "## アドバイス");
        assert_eq!(state.next_step, WorkflowStep::End);
    }

    #[test]
    fn test_fallback_plan_reaches_end() {
        let state = PlanningState::new(request())
            .with_error("何かが壊れました")
            .with_fallback_plan("# 代替プラン");

        assert_eq!(state.travel_plan, "# 代替プラン");
        assert_eq!(state.error, "何かが壊れました");
        assert_eq!(state.next_step, WorkflowStep::End);
    }

    #[test]
    fn test_workflow_step_display_tokens() {
        assert_eq!(WorkflowStep::Research.to_string(), "research");
        assert_eq!(WorkflowStep::Retrieval.to_string(), "retrieval");
        assert_eq!(WorkflowStep::PlanGeneration.to_string(), "plan_generation");
        assert_eq!(WorkflowStep::Recommendation.to_string(), "recommendation");
        assert_eq!(WorkflowStep::ErrorHandler.to_string(), "error_handler");
        assert_eq!(WorkflowStep::End.to_string(), "end");
    }
}
