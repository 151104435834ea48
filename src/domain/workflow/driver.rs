//! Workflow driver: create agent, ingest one document, ask one question

use std::io::Write;

use tracing::{debug, error, info, warn};

use super::error::WorkflowError;
use super::plan::WorkflowPlan;
use super::state::WorkflowState;
use crate::domain::agent::{AgentFactory, AgentResponse};
use crate::domain::ingestion::IngestionResult;

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub ingestion: IngestionResult,
    pub response: AgentResponse,
}

/// Runs a [`WorkflowPlan`] step by step, tracking its state
#[derive(Debug)]
pub struct WorkflowDriver<'a> {
    factory: &'a dyn AgentFactory,
    state: WorkflowState,
}

impl<'a> WorkflowDriver<'a> {
    pub fn new(factory: &'a dyn AgentFactory) -> Self {
        Self {
            factory,
            state: WorkflowState::Start,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Run the plan, writing the answer followed by a newline to `out`.
    ///
    /// Stops at the first failure; the driver is left in `Failed`. Each call
    /// starts over from `Start`, so a driver can run several plans in turn.
    pub async fn run<W: Write>(
        &mut self,
        plan: WorkflowPlan,
        out: &mut W,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if self.state != WorkflowState::Start {
            debug!(previous = %self.state, "Restarting workflow driver");
            self.state = WorkflowState::Start;
        }

        match self.execute(plan, out).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(failed_at = %e.failed_at(), error = %e, "Workflow failed");
                self.transition(WorkflowState::Failed);
                Err(e)
            }
        }
    }

    async fn execute<W: Write>(
        &mut self,
        plan: WorkflowPlan,
        out: &mut W,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        plan.validate()?;
        self.transition(WorkflowState::Configured);

        let WorkflowPlan {
            agent: agent_config,
            document,
            query,
            ingestion_policy,
        } = plan;

        info!(
            agent = %agent_config.name,
            model = %agent_config.model,
            knowledge = agent_config.knowledge,
            "Creating agent"
        );
        let agent = self
            .factory
            .create(agent_config)
            .await
            .map_err(WorkflowError::AgentCreation)?;
        self.transition(WorkflowState::AgentCreated);

        info!(
            path = %document.path.display(),
            tags = document.metadata.len(),
            "Ingesting document"
        );
        let ingestion = agent
            .add_knowledge_from_file(&document.path, &document.metadata)
            .await
            .map_err(WorkflowError::Ingestion)?;

        if !ingestion_policy.accepts(&ingestion) {
            return Err(WorkflowError::NotIndexed {
                path: document.path,
                chunks_created: ingestion.chunks_created,
                chunks_failed: ingestion.chunks_failed,
            });
        }
        if ingestion.has_errors() {
            warn!(
                chunks_created = ingestion.chunks_created,
                chunks_failed = ingestion.chunks_failed,
                policy = %ingestion_policy,
                "Continuing despite incomplete ingestion"
            );
        }
        self.transition(WorkflowState::KnowledgeIngested);

        info!(query = %query, "Asking question");
        let response = agent.ask(&query).await.map_err(WorkflowError::Query)?;

        writeln!(out, "{}", response)?;
        out.flush()?;
        self.transition(WorkflowState::Answered);

        Ok(WorkflowOutcome {
            ingestion,
            response,
        })
    }

    fn transition(&mut self, next: WorkflowState) {
        debug_assert!(self.state.can_transition_to(next));
        debug!(from = %self.state, to = %next, "Workflow state transition");
        self.state = next;
    }
}

/// Run a plan with a fresh driver
pub async fn run_workflow<W: Write>(
    factory: &dyn AgentFactory,
    plan: WorkflowPlan,
    out: &mut W,
) -> Result<WorkflowOutcome, WorkflowError> {
    WorkflowDriver::new(factory).run(plan, out).await
}
