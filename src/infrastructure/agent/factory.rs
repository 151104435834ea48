//! Agent factory wired to OpenAI-compatible chat and embedding APIs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::rag_agent::{RagAgent, RetrievalSettings};
use crate::config::AppConfig;
use crate::domain::agent::{AgentConfig, AgentError, AgentFactory, KnowledgeAgent};
use crate::domain::knowledge_base::{KnowledgeBaseId, KnowledgeBaseProvider};
use crate::domain::DomainError;
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::knowledge_base::InMemoryVectorKnowledgeBase;
use crate::infrastructure::llm::{HttpClient, OpenAiProvider};

/// Builds [`RagAgent`]s from the application configuration
#[derive(Debug, Clone)]
pub struct OpenAiAgentFactory {
    config: AppConfig,
}

impl OpenAiAgentFactory {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    async fn knowledge_base(
        &self,
        agent: &AgentConfig,
        client: HttpClient,
    ) -> Result<Arc<dyn KnowledgeBaseProvider>, DomainError> {
        let openai = &self.config.openai;
        let api_key = openai.embedding_api_key().ok_or_else(|| {
            DomainError::credential("OPENAI_EMBEDDING_API_KEY or OPENAI_API_KEY is not set")
        })?;

        let id = KnowledgeBaseId::from_name(&agent.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let embeddings =
            OpenAiEmbeddingProvider::with_base_url(client, api_key, openai.embedding_base_url());
        let knowledge_base = InMemoryVectorKnowledgeBase::new(id, embeddings, &agent.embedding_model)
            .with_embed_batch_size(self.config.knowledge.batch_size);

        if !knowledge_base.health_check().await? {
            return Err(DomainError::knowledge_base("knowledge store failed its health check"));
        }

        debug!(
            knowledge_base = %knowledge_base.knowledge_base_id(),
            embedding_model = %agent.embedding_model,
            "Knowledge store ready"
        );

        Ok(Arc::new(knowledge_base))
    }
}

#[async_trait]
impl AgentFactory for OpenAiAgentFactory {
    async fn create(&self, config: AgentConfig) -> Result<Arc<dyn KnowledgeAgent>, AgentError> {
        config.validate()?;

        let name = config.name.clone();
        let fail = |e: DomainError| AgentError::initialization(&name, e);

        let openai = &self.config.openai;
        let api_key = openai
            .chat_api_key()
            .ok_or_else(|| DomainError::credential("OPENAI_API_KEY is not set"))
            .map_err(fail)?;
        let client = HttpClient::with_timeout(openai.timeout()).map_err(fail)?;

        let knowledge_base = if config.knowledge {
            Some(self.knowledge_base(&config, client.clone()).await.map_err(fail)?)
        } else {
            None
        };

        let llm = OpenAiProvider::with_base_url(client, api_key, openai.chat_base_url());

        info!(
            agent = %name,
            model = %config.model,
            knowledge = config.knowledge,
            "Agent created"
        );

        let mut agent = RagAgent::new(config, Arc::new(llm))
            .with_retrieval(RetrievalSettings::from(&self.config.knowledge))
            .with_ingestion_config(self.config.knowledge.ingestion_config())
            .with_sampling(openai.temperature, openai.max_tokens);
        if let Some(knowledge_base) = knowledge_base {
            agent = agent.with_knowledge_base(knowledge_base);
        }

        Ok(Arc::new(agent))
    }
}
