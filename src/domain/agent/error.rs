//! Agent error types

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::DomainError;

/// Errors surfaced by an agent, one class per agent operation
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to initialize agent '{agent}': {message}")]
    Initialization { agent: String, message: String },

    #[error("Failed to ingest '{}': {message}", .path.display())]
    Ingestion { path: PathBuf, message: String },

    #[error("Query failed: {message}")]
    Query { message: String },
}

impl AgentError {
    pub fn initialization(agent: impl Into<String>, message: impl ToString) -> Self {
        Self::Initialization {
            agent: agent.into(),
            message: message.to_string(),
        }
    }

    pub fn ingestion(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Ingestion {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn query(message: impl ToString) -> Self {
        Self::Query {
            message: message.to_string(),
        }
    }
}

impl From<DomainError> for AgentError {
    /// Errors reaching the agent boundary without context are query failures
    fn from(error: DomainError) -> Self {
        Self::query(error)
    }
}
