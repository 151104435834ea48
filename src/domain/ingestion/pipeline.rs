//! Ingestion pipeline types and configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::chunker::ChunkingConfig;

/// Type of document parser to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParserType {
    PlainText,
    Markdown,
    Pdf,
}

impl ParserType {
    /// File extensions associated with this parser type
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::PlainText => &["txt", "text"],
            Self::Markdown => &["md", "markdown"],
            Self::Pdf => &["pdf"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain_text",
            Self::Markdown => "markdown",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ParserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of chunking strategy to use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingType {
    /// Recursive splitting (headers -> paragraphs -> sentences -> words)
    #[default]
    Recursive,
    /// Overlapping fixed-size windows
    FixedSize,
}

/// Configuration for ingesting one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Parser type, auto-detected from the filename when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser_type: Option<ParserType>,
    #[serde(default)]
    pub chunking_type: ChunkingType,
    #[serde(flatten)]
    pub chunking_config: ChunkingConfig,
    /// Number of chunks handed to the knowledge base per call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Metadata added to every chunk, overriding parsed metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Stable identifier for the document; derived from the filename when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

fn default_batch_size() -> usize {
    100
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            parser_type: None,
            chunking_type: ChunkingType::default(),
            chunking_config: ChunkingConfig::default(),
            batch_size: default_batch_size(),
            metadata: HashMap::new(),
            source_id: None,
        }
    }
}

impl IngestionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser_type(mut self, parser_type: ParserType) -> Self {
        self.parser_type = Some(parser_type);
        self
    }

    pub fn with_chunking_type(mut self, chunking_type: ChunkingType) -> Self {
        self.chunking_type = chunking_type;
        self
    }

    pub fn with_chunking_config(mut self, chunking_config: ChunkingConfig) -> Self {
        self.chunking_config = chunking_config;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunking_config.chunk_size = size;
        self
    }

    pub fn with_chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunking_config.chunk_overlap = overlap;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

/// Error that occurred while ingesting a document or one of its chunks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionError {
    /// Chunk index where the error occurred (None if document-level)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    pub message: String,
}

impl IngestionError {
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            chunk_index: None,
            message: message.into(),
        }
    }

    pub fn chunk(index: usize, message: impl Into<String>) -> Self {
        Self {
            chunk_index: Some(index),
            message: message.into(),
        }
    }

    pub fn is_document_level(&self) -> bool {
        self.chunk_index.is_none()
    }
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.chunk_index {
            Some(index) => write!(f, "chunk {}: {}", index, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of ingesting a single document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub document_id: String,
    /// Number of chunks indexed and searchable
    pub chunks_created: usize,
    pub chunks_failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IngestionError>,
}

impl IngestionResult {
    pub fn success(document_id: impl Into<String>, chunks_created: usize) -> Self {
        Self {
            document_id: document_id.into(),
            chunks_created,
            chunks_failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn failed(document_id: impl Into<String>, error: IngestionError) -> Self {
        Self {
            document_id: document_id.into(),
            chunks_created: 0,
            chunks_failed: 0,
            errors: vec![error],
        }
    }

    /// True when every chunk was indexed and nothing failed
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.chunks_failed == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.is_success()
    }

    /// The error that stopped the document before any chunk was stored
    pub fn document_error(&self) -> Option<&IngestionError> {
        self.errors.iter().find(|e| e.is_document_level())
    }

    pub fn add_error(&mut self, error: IngestionError) {
        self.errors.push(error);
    }
}
