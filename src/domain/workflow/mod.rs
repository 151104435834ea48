//! Workflow domain module
//!
//! A workflow run creates one agent, feeds it one document and asks it one
//! question:
//!
//! `Start -> Configured -> AgentCreated -> KnowledgeIngested -> Answered`
//!
//! Any failure moves the run to `Failed` and is returned to the caller.

mod driver;
mod error;
mod plan;
mod state;

pub use driver::{run_workflow, WorkflowDriver, WorkflowOutcome};
pub use error::WorkflowError;
pub use plan::{
    IngestionPolicy, WorkflowPlan, DEFAULT_AGENT_NAME, DEFAULT_DOCUMENT_PATH,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL, DEFAULT_QUERY, DEFAULT_SYSTEM_PROMPT,
};
pub use state::WorkflowState;
