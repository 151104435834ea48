//! In-memory vector knowledge base
//!
//! Chunks are embedded on insert and kept with their vectors behind a
//! `tokio::sync::RwLock`. Searches embed the query and rank every stored
//! chunk by cosine similarity.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::embedding::{cosine_similarity, EmbeddingProvider, EmbeddingRequest};
use crate::domain::knowledge_base::{
    validate_similarity_threshold, validate_top_k, AddDocumentsResult, Document,
    KnowledgeBaseId, KnowledgeBaseProvider, MetadataFilter, SearchParams, SearchResult,
};
use crate::domain::DomainError;

/// Default number of texts sent per embedding call
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct StoredChunk {
    id: String,
    content: String,
    metadata: HashMap<String, serde_json::Value>,
    source: Option<String>,
    vector: Vec<f32>,
}

impl StoredChunk {
    fn to_result(&self, score: f32) -> SearchResult {
        let result = SearchResult::new(&self.id, &self.content, score)
            .with_all_metadata(self.metadata.clone());
        match &self.source {
            Some(source) => result.with_source(source),
            None => result,
        }
    }
}

/// Vector knowledge base held entirely in process memory
#[derive(Debug)]
pub struct InMemoryVectorKnowledgeBase<E: EmbeddingProvider> {
    id: KnowledgeBaseId,
    embedding_provider: E,
    embedding_model: String,
    embed_batch_size: usize,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl<E: EmbeddingProvider> InMemoryVectorKnowledgeBase<E> {
    pub fn new(
        id: KnowledgeBaseId,
        embedding_provider: E,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            id,
            embedding_provider,
            embedding_model: embedding_model.into(),
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Set how many texts go into one embedding call
    pub fn with_embed_batch_size(mut self, batch_size: usize) -> Self {
        self.embed_batch_size = batch_size.max(1);
        self
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.embed_batch_size) {
            let request = EmbeddingRequest::new(self.embedding_model.as_str(), batch.to_vec());
            let response = self.embedding_provider.embed(request).await?;
            debug!(
                provider = self.embedding_provider.provider_name(),
                model = response.model(),
                inputs = batch.len(),
                prompt_tokens = response.prompt_tokens(),
                "Embedded batch"
            );
            let batch_vectors = response.into_vectors();

            if batch_vectors.len() != batch.len() {
                return Err(DomainError::knowledge_base(format!(
                    "Embedding count mismatch: sent {}, received {}",
                    batch.len(),
                    batch_vectors.len()
                )));
            }
            vectors.extend(batch_vectors);
        }

        Ok(vectors)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(self.embedding_model.as_str(), query);
        self.embedding_provider
            .embed(request)
            .await?
            .into_vectors()
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::knowledge_base("Failed to generate query embedding"))
    }
}

#[async_trait]
impl<E: EmbeddingProvider> KnowledgeBaseProvider for InMemoryVectorKnowledgeBase<E> {
    fn knowledge_base_id(&self) -> &KnowledgeBaseId {
        &self.id
    }

    fn provider_type(&self) -> &'static str {
        "in_memory"
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<SearchResult>, DomainError> {
        validate_top_k(params.top_k).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_similarity_threshold(params.similarity_threshold)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if params.query.trim().is_empty() {
            return Err(DomainError::validation("Search query cannot be empty"));
        }

        if self.chunks.read().await.is_empty() {
            debug!(kb_id = %self.id, "Search on empty knowledge base");
            return Ok(Vec::new());
        }

        let query_vector = self.embed_query(&params.query).await?;

        let chunks = self.chunks.read().await;
        let mut scored: Vec<(f32, &StoredChunk)> = chunks
            .iter()
            .filter(|chunk| chunk.vector.len() == query_vector.len())
            .map(|chunk| (cosine_similarity(&query_vector, &chunk.vector), chunk))
            .filter(|(score, _)| *score >= params.similarity_threshold)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(params.top_k as usize);

        debug!(
            kb_id = %self.id,
            candidates = chunks.len(),
            results = scored.len(),
            top_score = scored.first().map(|(s, _)| *s).unwrap_or(0.0),
            "Knowledge base search complete"
        );

        Ok(scored
            .into_iter()
            .map(|(score, chunk)| chunk.to_result(score))
            .collect())
    }

    async fn add_documents(
        &self,
        documents: Vec<Document>,
    ) -> Result<AddDocumentsResult, DomainError> {
        let mut errors: Vec<(String, String)> = Vec::new();
        let documents: Vec<Document> = documents
            .into_iter()
            .filter_map(|doc| {
                if doc.content.trim().is_empty() {
                    errors.push((doc.id, "Document content is empty".to_string()));
                    None
                } else {
                    Some(doc)
                }
            })
            .collect();

        if documents.is_empty() {
            return Ok(AddDocumentsResult::partial(0, errors));
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embed_texts(texts).await?;

        let mut chunks = self.chunks.write().await;
        let expected_dims = chunks.first().map(|c| c.vector.len());
        let mut added = 0;

        for (doc, vector) in documents.into_iter().zip(vectors) {
            if let Some(dims) = expected_dims.filter(|dims| *dims != vector.len()) {
                errors.push((
                    doc.id,
                    format!("Embedding has {} dimensions, expected {}", vector.len(), dims),
                ));
                continue;
            }

            let stored = StoredChunk {
                id: doc.id,
                content: doc.content,
                metadata: doc.metadata,
                source: doc.source,
                vector,
            };

            match chunks.iter_mut().find(|c| c.id == stored.id) {
                Some(existing) => *existing = stored,
                None => chunks.push(stored),
            }
            added += 1;
        }

        if !errors.is_empty() {
            warn!(kb_id = %self.id, added, failed = errors.len(), "Some documents were rejected");
        }

        Ok(AddDocumentsResult::partial(added, errors))
    }

    async fn delete_by_filter(&self, filter: MetadataFilter) -> Result<usize, DomainError> {
        if filter.is_empty() {
            return Err(DomainError::validation("Delete filter cannot be empty"));
        }

        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|chunk| !filter.matches(&chunk.metadata));

        let deleted = before - chunks.len();
        if deleted > 0 {
            debug!(kb_id = %self.id, %filter, deleted, "Deleted chunks");
        }
        Ok(deleted)
    }

    async fn document_count(&self) -> Result<usize, DomainError> {
        Ok(self.chunks.read().await.len())
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        let chunks = self.chunks.read().await;
        let consistent = chunks
            .first()
            .map(|first| chunks.iter().all(|c| c.vector.len() == first.vector.len()))
            .unwrap_or(true);
        Ok(consistent && !self.embedding_model.trim().is_empty())
    }
}

/// Filter matching every chunk of one ingested document
pub fn document_filter(document_id: &str) -> MetadataFilter {
    MetadataFilter::new().eq("document_id", document_id)
}
