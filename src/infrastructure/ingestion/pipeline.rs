//! Ingestion pipeline service

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ingestion::{
    validate_batch_size, validate_chunk_params, validate_document_id, Chunk, IngestionConfig,
    IngestionError, IngestionResult, ParserInput,
};
use crate::domain::knowledge_base::{Document, KnowledgeBaseProvider};
use crate::domain::DomainError;
use crate::infrastructure::knowledge_base::document_filter;

use super::factory::{ChunkerFactory, ParserFactory};

const CHUNK_ID_SEPARATOR: &str = "_chunk_";

/// Ingestion pipeline: parse, chunk and index documents into a knowledge base
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    knowledge_base: Arc<dyn KnowledgeBaseProvider>,
}

impl IngestionPipeline {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBaseProvider>) -> Self {
        Self { knowledge_base }
    }

    pub fn knowledge_base(&self) -> &Arc<dyn KnowledgeBaseProvider> {
        &self.knowledge_base
    }

    /// Ingest a single document.
    ///
    /// Chunks from an earlier ingestion of the same document are replaced.
    /// Parse and chunking problems are reported in the returned
    /// [`IngestionResult`]; invalid configuration and knowledge base
    /// failures are returned as errors.
    pub async fn ingest(
        &self,
        input: ParserInput,
        config: &IngestionConfig,
    ) -> Result<IngestionResult, DomainError> {
        let document_id = Self::document_id(&input, config);
        validate_document_id(&document_id)?;
        validate_batch_size(config.batch_size)?;
        validate_chunk_params(
            config.chunking_config.chunk_size,
            config.chunking_config.chunk_overlap,
        )?;

        let parser_type = match ParserFactory::resolve(config.parser_type, input.filename.as_deref())
        {
            Ok(parser_type) => parser_type,
            Err(e) => {
                return Ok(IngestionResult::failed(
                    document_id,
                    IngestionError::document(e.to_string()),
                ));
            }
        };

        debug!(document_id = %document_id, parser = %parser_type, "Parsing document");
        let parsed = match ParserFactory::create(parser_type).parse(input).await {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(IngestionResult::failed(
                    document_id,
                    IngestionError::document(format!("Parsing failed: {}", e)),
                ));
            }
        };

        let chunker = ChunkerFactory::create(config.chunking_type);
        let chunks = match chunker.chunk(&parsed.content, &config.chunking_config) {
            Ok(chunks) => chunks,
            Err(e) => {
                return Ok(IngestionResult::failed(
                    document_id,
                    IngestionError::document(format!("Chunking failed: {}", e)),
                ));
            }
        };

        let replaced = self.delete_document(&document_id).await?;
        if replaced > 0 {
            debug!(document_id = %document_id, replaced, "Replacing previously ingested chunks");
        }

        if chunks.is_empty() {
            warn!(document_id = %document_id, "Document produced no chunks");
            return Ok(IngestionResult::success(&document_id, 0));
        }

        let documents = Self::create_documents(
            &document_id,
            &chunks,
            &parsed.metadata.to_json_map(),
            &config.metadata,
        );

        let mut result = IngestionResult::success(&document_id, 0);

        for batch in documents.chunks(config.batch_size) {
            let add_result = self.knowledge_base.add_documents(batch.to_vec()).await?;
            result.chunks_created += add_result.added;
            result.chunks_failed += add_result.failed;

            for (chunk_id, error) in add_result.errors {
                let chunk_index = Self::extract_chunk_index(&chunk_id).unwrap_or(0);
                result.add_error(IngestionError::chunk(chunk_index, error));
            }
        }

        info!(
            document_id = %document_id,
            chunker = chunker.name(),
            chunks_created = result.chunks_created,
            chunks_failed = result.chunks_failed,
            "Document ingested"
        );

        Ok(result)
    }

    /// Delete all chunks for a document
    pub async fn delete_document(&self, document_id: &str) -> Result<usize, DomainError> {
        self.knowledge_base
            .delete_by_filter(document_filter(document_id))
            .await
    }

    fn document_id(input: &ParserInput, config: &IngestionConfig) -> String {
        if let Some(id) = &config.source_id {
            return id.clone();
        }

        if let Some(filename) = &input.filename {
            return filename.clone();
        }

        uuid::Uuid::new_v4().to_string()
    }

    fn create_documents(
        document_id: &str,
        chunks: &[Chunk],
        doc_metadata: &HashMap<String, serde_json::Value>,
        custom_metadata: &HashMap<String, serde_json::Value>,
    ) -> Vec<Document> {
        chunks
            .iter()
            .map(|chunk| {
                // chunk placement keys win over caller tags of the same name
                let mut metadata = doc_metadata.clone();
                metadata.extend(
                    custom_metadata
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone())),
                );
                metadata.extend(chunk.metadata.to_json_map());
                metadata.insert(
                    "document_id".to_string(),
                    serde_json::Value::String(document_id.to_string()),
                );

                Document::new(
                    format!("{}{}{}", document_id, CHUNK_ID_SEPARATOR, chunk.index()),
                    chunk.content.clone(),
                )
                .with_all_metadata(metadata)
                .with_source(document_id)
            })
            .collect()
    }

    fn extract_chunk_index(chunk_id: &str) -> Option<usize> {
        chunk_id
            .rsplit_once(CHUNK_ID_SEPARATOR)
            .and_then(|(_, index)| index.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge_base::{KnowledgeBaseId, MockKnowledgeBaseProvider};

    fn create_mock_kb() -> Arc<MockKnowledgeBaseProvider> {
        let id = KnowledgeBaseId::new("test-kb").unwrap();
        Arc::new(MockKnowledgeBaseProvider::new(id))
    }

    fn long_text() -> String {
        "The solar constant is about 1361 watts per square metre. ".repeat(40)
    }

    #[tokio::test]
    async fn test_ingest_simple_document() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());

        let input = ParserInput::from_text("Hello, World!");
        let result = pipeline.ingest(input, &IngestionConfig::new()).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.chunks_created, 1);
        assert_eq!(kb.documents().len(), 1);
    }

    #[tokio::test]
    async fn test_document_id_and_source_from_filename() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());

        let input = ParserInput::from_text("Test content").with_filename("document.txt");
        let result = pipeline.ingest(input, &IngestionConfig::new()).await.unwrap();

        assert_eq!(result.document_id, "document.txt");
        let docs = kb.documents();
        assert_eq!(docs[0].id, "document.txt_chunk_0");
        assert_eq!(docs[0].source.as_deref(), Some("document.txt"));
    }

    #[tokio::test]
    async fn test_source_id_overrides_filename() {
        let pipeline = IngestionPipeline::new(create_mock_kb());

        let input = ParserInput::from_text("Test content").with_filename("document.txt");
        let config = IngestionConfig::new().with_source_id("my-doc-123");

        let result = pipeline.ingest(input, &config).await.unwrap();

        assert_eq!(result.document_id, "my-doc-123");
    }

    #[tokio::test]
    async fn test_chunk_metadata_layers() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());

        let input = ParserInput::from_text("# Solar Notes\n\nThe Sun is a star.")
            .with_filename("notes.md");
        let config = IngestionConfig::new()
            .with_metadata("category", serde_json::json!("solar-physics"))
            .with_metadata("format", serde_json::json!("overridden"));

        pipeline.ingest(input, &config).await.unwrap();

        let documents = kb.documents();
        let doc = &documents[0];
        assert_eq!(doc.metadata["category"], serde_json::json!("solar-physics"));
        assert_eq!(doc.metadata["format"], serde_json::json!("overridden"));
        assert_eq!(doc.metadata["title"], serde_json::json!("Solar Notes"));
        assert_eq!(doc.metadata["chunk_index"], serde_json::json!(0));
        assert_eq!(doc.metadata["document_id"], serde_json::json!("notes.md"));
    }

    #[tokio::test]
    async fn test_caller_tags_cannot_move_chunks() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());

        let input = ParserInput::from_text("The Sun is a star.").with_filename("sun.txt");
        let config = IngestionConfig::new()
            .with_metadata("chunk_index", serde_json::json!(42))
            .with_metadata("char_start", serde_json::json!(-1))
            .with_metadata("total_chunks", serde_json::json!("many"))
            .with_metadata("document_id", serde_json::json!("elsewhere"));

        pipeline.ingest(input, &config).await.unwrap();

        let documents = kb.documents();
        let doc = &documents[0];
        assert_eq!(doc.metadata["chunk_index"], serde_json::json!(0));
        assert_eq!(doc.metadata["char_start"], serde_json::json!(0));
        assert_eq!(doc.metadata["total_chunks"], serde_json::json!(1));
        assert_eq!(doc.metadata["document_id"], serde_json::json!("sun.txt"));
    }

    #[tokio::test]
    async fn test_empty_document_creates_no_chunks() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());

        let result = pipeline
            .ingest(ParserInput::from_text(""), &IngestionConfig::new())
            .await
            .unwrap();

        assert_eq!(result.chunks_created, 0);
        assert_eq!(kb.add_count(), 0);
    }

    #[tokio::test]
    async fn test_chunks_are_added_in_batches() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());

        let config = IngestionConfig::new()
            .with_chunk_size(100)
            .with_chunk_overlap(20)
            .with_batch_size(3);

        let result = pipeline
            .ingest(ParserInput::from_text(long_text()), &config)
            .await
            .unwrap();

        assert!(result.is_success());
        assert!(result.chunks_created > 3);
        assert_eq!(kb.documents().len(), result.chunks_created);
        assert_eq!(kb.add_count(), result.chunks_created.div_ceil(3));
    }

    #[tokio::test]
    async fn test_reingest_replaces_previous_chunks() {
        let kb = create_mock_kb();
        let pipeline = IngestionPipeline::new(kb.clone());
        let config = IngestionConfig::new().with_chunk_size(100).with_chunk_overlap(10);

        let input = ParserInput::from_text(long_text()).with_filename("sun.txt");
        let first = pipeline.ingest(input, &config).await.unwrap();

        let input = ParserInput::from_text("Short replacement text.").with_filename("sun.txt");
        let second = pipeline.ingest(input, &config).await.unwrap();

        assert!(first.chunks_created > 1);
        assert_eq!(second.chunks_created, 1);
        assert_eq!(kb.documents().len(), 1);
        assert_eq!(kb.documents()[0].content, "Short replacement text.");
    }

    #[tokio::test]
    async fn test_rejected_chunks_are_reported() {
        let id = KnowledgeBaseId::new("test-kb").unwrap();
        let kb = Arc::new(
            MockKnowledgeBaseProvider::new(id)
                .with_rejected_ids(vec!["sun.txt_chunk_1".to_string()]),
        );
        let pipeline = IngestionPipeline::new(kb);
        let config = IngestionConfig::new().with_chunk_size(100).with_chunk_overlap(10);

        let input = ParserInput::from_text(long_text()).with_filename("sun.txt");
        let result = pipeline.ingest(input, &config).await.unwrap();

        assert_eq!(result.chunks_failed, 1);
        assert_eq!(result.errors, vec![IngestionError::chunk(1, "rejected")]);
        assert!(result.document_error().is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let id = KnowledgeBaseId::new("test-kb").unwrap();
        let kb = Arc::new(MockKnowledgeBaseProvider::new(id).with_add_failure());
        let pipeline = IngestionPipeline::new(kb);

        let result = pipeline
            .ingest(ParserInput::from_text("content"), &IngestionConfig::new())
            .await;

        assert!(matches!(result, Err(DomainError::KnowledgeBase(_))));
    }

    #[tokio::test]
    async fn test_parse_failure_yields_failed_result() {
        let pipeline = IngestionPipeline::new(create_mock_kb());

        let input = ParserInput::from_bytes(vec![0xff, 0xfe]).with_filename("broken.txt");
        let result = pipeline.ingest(input, &IngestionConfig::new()).await.unwrap();

        assert_eq!(result.chunks_created, 0);
        let error = result.document_error().unwrap();
        assert!(error.message.starts_with("Parsing failed"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_yields_failed_result() {
        let pipeline = IngestionPipeline::new(create_mock_kb());

        let input = ParserInput::from_text("a,b,c").with_filename("table.csv");
        let result = pipeline.ingest(input, &IngestionConfig::new()).await.unwrap();

        assert!(result.document_error().is_some());
    }

    #[tokio::test]
    async fn test_invalid_config_is_an_error() {
        let pipeline = IngestionPipeline::new(create_mock_kb());

        let config = IngestionConfig::new().with_chunk_size(100).with_chunk_overlap(100);
        let result = pipeline.ingest(ParserInput::from_text("text"), &config).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let config = IngestionConfig::new().with_batch_size(0);
        let result = pipeline.ingest(ParserInput::from_text("text"), &config).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_extract_chunk_index() {
        assert_eq!(IngestionPipeline::extract_chunk_index("doc123_chunk_5"), Some(5));
        assert_eq!(IngestionPipeline::extract_chunk_index("my_chunk_doc_chunk_0"), Some(0));
        assert_eq!(IngestionPipeline::extract_chunk_index("invalid"), None);
    }
}
