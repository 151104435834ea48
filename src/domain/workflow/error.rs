//! Workflow error types

use std::path::PathBuf;

use thiserror::Error;

use super::state::WorkflowState;
use crate::domain::agent::AgentError;

/// The first failure of a workflow run
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid workflow configuration: {0}")]
    Configuration(String),

    #[error("Agent creation failed: {0}")]
    AgentCreation(AgentError),

    #[error("Document ingestion failed: {0}")]
    Ingestion(AgentError),

    #[error(
        "Document '{}' was not indexed: {chunks_created} chunks indexed, {chunks_failed} failed",
        .path.display()
    )]
    NotIndexed {
        path: PathBuf,
        chunks_created: usize,
        chunks_failed: usize,
    },

    #[error("Question could not be answered: {0}")]
    Query(AgentError),

    #[error("Failed to write response: {0}")]
    Output(#[from] std::io::Error),
}

impl WorkflowError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// State the workflow was in when this error stopped it
    pub fn failed_at(&self) -> WorkflowState {
        match self {
            Self::Configuration(_) => WorkflowState::Start,
            Self::AgentCreation(_) => WorkflowState::Configured,
            Self::Ingestion(_) | Self::NotIndexed { .. } => WorkflowState::AgentCreated,
            Self::Query(_) | Self::Output(_) => WorkflowState::KnowledgeIngested,
        }
    }
}
