//! Planning workflow: state machine, prompt assembly, and the engine

mod engine;
pub mod prompts;
mod state;

pub use engine::{DEFAULT_TOP_K, PlannerEngine, PlanningResult, WorkflowError};
pub use state::{PlanningState, SOURCE_ENCYCLOPEDIA, SOURCE_WEB_SEARCH, WorkflowStep};
