//! Knowledge base provider trait

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{KnowledgeBaseId, SearchResult};
use super::filter::MetadataFilter;
use crate::domain::error::DomainError;

/// Document to be added to a knowledge base
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
    /// Optional source reference (file name or path)
    pub source: Option<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
            source: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_all_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Search parameters for knowledge base queries
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    /// Number of results to return
    pub top_k: u32,
    /// Minimum similarity score (0.0 - 1.0)
    pub similarity_threshold: f32,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: 5,
            similarity_threshold: 0.3,
        }
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// Result of adding documents to a knowledge base
#[derive(Debug, Clone, PartialEq)]
pub struct AddDocumentsResult {
    pub added: usize,
    pub failed: usize,
    /// (document id, error message) for every rejected document
    pub errors: Vec<(String, String)>,
}

impl AddDocumentsResult {
    pub fn success(added: usize) -> Self {
        Self {
            added,
            failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn partial(added: usize, errors: Vec<(String, String)>) -> Self {
        Self {
            added,
            failed: errors.len(),
            errors,
        }
    }
}

/// Provider trait for knowledge base operations
#[async_trait]
pub trait KnowledgeBaseProvider: Send + Sync + Debug {
    /// Get the knowledge base ID this provider is configured for
    fn knowledge_base_id(&self) -> &KnowledgeBaseId;

    /// Get the provider type name
    fn provider_type(&self) -> &'static str;

    /// Search the knowledge base, best matches first
    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, DomainError>;

    /// Add documents to the knowledge base
    async fn add_documents(
        &self,
        documents: Vec<Document>,
    ) -> Result<AddDocumentsResult, DomainError>;

    /// Delete every document matching a non-empty metadata filter,
    /// returning how many were removed
    async fn delete_by_filter(&self, filter: MetadataFilter) -> Result<usize, DomainError>;

    /// Number of documents currently stored
    async fn document_count(&self) -> Result<usize, DomainError>;

    /// Check if the knowledge base is healthy and accessible
    async fn health_check(&self) -> Result<bool, DomainError>;
}
