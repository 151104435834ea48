//! Agent traits

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::config::AgentConfig;
use super::error::AgentError;
use super::response::AgentResponse;
use crate::domain::ingestion::IngestionResult;

/// A conversational agent backed by a knowledge store
#[async_trait]
pub trait KnowledgeAgent: Send + Sync + Debug {
    /// The configuration the agent was created with
    fn config(&self) -> &AgentConfig;

    /// Parse, chunk and index a file, tagging every chunk with `metadata`.
    ///
    /// Returns once indexing has finished.
    async fn add_knowledge_from_file(
        &self,
        path: &Path,
        metadata: &BTreeMap<String, String>,
    ) -> Result<IngestionResult, AgentError>;

    /// Answer a natural-language question
    async fn ask(&self, question: &str) -> Result<AgentResponse, AgentError>;
}

/// Creates agents from a configuration record
#[async_trait]
pub trait AgentFactory: Send + Sync + Debug {
    async fn create(&self, config: AgentConfig) -> Result<Arc<dyn KnowledgeAgent>, AgentError>;
}
