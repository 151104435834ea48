//! Retrieval-augmented agent

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::prompt::{build_context_block, compose_system_prompt};
use crate::config::KnowledgeConfig;
use crate::domain::agent::{AgentConfig, AgentError, AgentResponse, KnowledgeAgent, KnowledgeSource};
use crate::domain::ingestion::{IngestionConfig, IngestionResult, ParserInput};
use crate::domain::knowledge_base::{KnowledgeBaseProvider, SearchParams};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::DomainError;
use crate::infrastructure::ingestion::IngestionPipeline;

/// How many chunks to retrieve and how much of them to show the model
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    pub top_k: u32,
    pub similarity_threshold: f32,
    pub max_context_chars: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self::from(&KnowledgeConfig::default())
    }
}

impl From<&KnowledgeConfig> for RetrievalSettings {
    fn from(config: &KnowledgeConfig) -> Self {
        Self {
            top_k: config.top_k,
            similarity_threshold: config.similarity_threshold,
            max_context_chars: config.max_context_chars,
        }
    }
}

/// Agent answering with a chat model, optionally grounded in a knowledge store
#[derive(Debug)]
pub struct RagAgent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    pipeline: Option<IngestionPipeline>,
    retrieval: RetrievalSettings,
    ingestion: IngestionConfig,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl RagAgent {
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            config,
            llm,
            pipeline: None,
            retrieval: RetrievalSettings::default(),
            ingestion: IngestionConfig::default(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_knowledge_base(mut self, knowledge_base: Arc<dyn KnowledgeBaseProvider>) -> Self {
        self.pipeline = Some(IngestionPipeline::new(knowledge_base));
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_ingestion_config(mut self, ingestion: IngestionConfig) -> Self {
        self.ingestion = ingestion;
        self
    }

    /// Sampling limits sent with every question; `None` keeps the model default
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// The knowledge store, when knowledge is enabled and attached
    fn knowledge_pipeline(&self) -> Option<&IngestionPipeline> {
        if self.config.knowledge {
            self.pipeline.as_ref()
        } else {
            None
        }
    }

    async fn read_file(path: &Path) -> Result<Vec<u8>, AgentError> {
        tokio::fs::read(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AgentError::ingestion(
                path,
                DomainError::not_found(format!("File '{}' does not exist", path.display())),
            ),
            _ => AgentError::ingestion(path, e),
        })
    }
}

#[async_trait]
impl KnowledgeAgent for RagAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn add_knowledge_from_file(
        &self,
        path: &Path,
        metadata: &BTreeMap<String, String>,
    ) -> Result<IngestionResult, AgentError> {
        let pipeline = self.knowledge_pipeline().ok_or_else(|| {
            AgentError::ingestion(path, "knowledge is not enabled for this agent")
        })?;

        let bytes = Self::read_file(path).await?;

        let mut input = ParserInput::from_bytes(bytes);
        if let Some(name) = path.file_name() {
            input = input.with_filename(name.to_string_lossy());
        }

        let config = metadata.iter().fold(
            self.ingestion
                .clone()
                .with_source_id(path.display().to_string()),
            |config, (key, value)| {
                config.with_metadata(key.clone(), serde_json::Value::String(value.clone()))
            },
        );

        debug!(agent = %self.config.name, path = %path.display(), "Reading document");
        let result = pipeline
            .ingest(input, &config)
            .await
            .map_err(|e| AgentError::ingestion(path, e))?;

        if let Some(error) = result.document_error() {
            return Err(AgentError::ingestion(path, error));
        }

        let stored = pipeline.knowledge_base().document_count().await.ok();
        info!(
            agent = %self.config.name,
            path = %path.display(),
            chunks_created = result.chunks_created,
            chunks_failed = result.chunks_failed,
            stored = ?stored,
            "Knowledge added"
        );

        Ok(result)
    }

    async fn ask(&self, question: &str) -> Result<AgentResponse, AgentError> {
        if question.trim().is_empty() {
            return Err(AgentError::query("question cannot be empty"));
        }

        let mut sources = Vec::new();
        let mut context = None;

        if let Some(pipeline) = self.knowledge_pipeline() {
            let params = SearchParams::new(question)
                .with_top_k(self.retrieval.top_k)
                .with_similarity_threshold(self.retrieval.similarity_threshold);
            let results = pipeline.knowledge_base().search(params).await?;

            context = build_context_block(&results, self.retrieval.max_context_chars);
            let used = context.as_ref().map_or(0, |block| block.used);

            sources = results
                .into_iter()
                .take(used)
                .map(|r| KnowledgeSource {
                    chunk_id: r.id,
                    source: r.source,
                    score: r.score,
                })
                .collect();

            debug!(agent = %self.config.name, sources = sources.len(), "Retrieved knowledge");
        }

        let system_prompt = compose_system_prompt(&self.config.system_prompt, context.as_ref());

        let request = LlmRequest::question(&system_prompt, question)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        debug!(
            agent = %self.config.name,
            provider = self.llm.provider_name(),
            model = %self.config.model,
            "Asking model"
        );
        let response = self.llm.chat(&self.config.model, request).await?;

        if response.is_truncated() {
            warn!(
                agent = %self.config.name,
                model = %response.model,
                max_tokens = ?self.max_tokens,
                "Answer was cut off by the token limit"
            );
        }

        info!(
            agent = %self.config.name,
            model = %response.model,
            sources = sources.len(),
            "Question answered"
        );

        let mut answer = AgentResponse::new(response.content, response.model).with_sources(sources);
        if let Some(usage) = response.usage {
            answer = answer.with_usage(usage);
        }

        Ok(answer)
    }
}
