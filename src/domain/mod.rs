//! Domain layer - Core business logic and entities

pub mod agent;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod knowledge_base;
pub mod llm;
pub mod workflow;

pub use agent::{
    AgentConfig, AgentError, AgentFactory, AgentResponse, IngestionRequest, KnowledgeAgent,
    KnowledgeSource,
};
pub use embedding::{cosine_similarity, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use ingestion::{
    Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy, ChunkingType, DocumentMetadata,
    DocumentParser, IngestionConfig, IngestionError, IngestionResult, ParsedDocument,
    ParserContent, ParserInput, ParserType,
};
pub use knowledge_base::{
    AddDocumentsResult, Document, KnowledgeBaseId, KnowledgeBaseProvider,
    KnowledgeBaseValidationError, MetadataFilter, SearchParams, SearchResult,
};
pub use llm::{FinishReason, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole, Usage};
pub use workflow::{
    run_workflow, IngestionPolicy, WorkflowDriver, WorkflowError, WorkflowOutcome, WorkflowPlan,
    WorkflowState,
};
