//! Workflow plan: everything one run needs, fixed before it starts

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::WorkflowError;
use crate::domain::agent::{AgentConfig, IngestionRequest};
use crate::domain::ingestion::IngestionResult;

pub const DEFAULT_AGENT_NAME: &str = "CosmosBot";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You can search and retrieve information from scientific knowledge bases about the cosmos and universe.";
pub const DEFAULT_DOCUMENT_PATH: &str = "./data/The Sun's Light and Heat.pdf";
pub const DEFAULT_QUERY: &str = "What is Correction for Atmospheric Absorption? Explain.";

/// What the driver does with the ingestion result before asking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionPolicy {
    /// Fail unless at least one chunk was indexed and none failed
    RequireIndexed,
    /// Wait for ingestion to finish and ignore its result
    #[default]
    AwaitOnly,
}

impl IngestionPolicy {
    /// Whether the result allows the workflow to continue
    pub fn accepts(&self, result: &IngestionResult) -> bool {
        match self {
            Self::RequireIndexed => result.chunks_created > 0 && result.is_success(),
            Self::AwaitOnly => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequireIndexed => "require-indexed",
            Self::AwaitOnly => "await-only",
        }
    }
}

impl FromStr for IngestionPolicy {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "require-indexed" => Ok(Self::RequireIndexed),
            "await-only" => Ok(Self::AwaitOnly),
            other => Err(WorkflowError::configuration(format!(
                "unknown ingestion policy '{}' (expected require-indexed or await-only)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for IngestionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of one workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    pub agent: AgentConfig,
    pub document: IngestionRequest,
    pub query: String,
    pub ingestion_policy: IngestionPolicy,
}

impl Default for WorkflowPlan {
    fn default() -> Self {
        Self {
            agent: AgentConfig {
                name: DEFAULT_AGENT_NAME.to_string(),
                model: DEFAULT_MODEL.to_string(),
                embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
                knowledge: true,
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            },
            document: IngestionRequest::new(DEFAULT_DOCUMENT_PATH)
                .with_metadata("category", "solar-physics")
                .with_metadata("version", "1.0"),
            query: DEFAULT_QUERY.to_string(),
            ingestion_policy: IngestionPolicy::default(),
        }
    }
}

impl WorkflowPlan {
    pub fn with_document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document.path = path.into();
        self
    }

    /// Replace the document tags
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.document.metadata = metadata;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_ingestion_policy(mut self, policy: IngestionPolicy) -> Self {
        self.ingestion_policy = policy;
        self
    }

    /// Check that the plan is fully populated
    pub fn validate(&self) -> Result<(), WorkflowError> {
        self.agent
            .validate()
            .map_err(|e| WorkflowError::configuration(e.to_string()))?;

        if self.document.path.as_os_str().is_empty() {
            return Err(WorkflowError::configuration("document path cannot be empty"));
        }

        if self.document.metadata.keys().any(|k| k.trim().is_empty()) {
            return Err(WorkflowError::configuration(
                "document metadata keys cannot be empty",
            ));
        }

        if self.query.trim().is_empty() {
            return Err(WorkflowError::configuration("query cannot be empty"));
        }

        Ok(())
    }
}
