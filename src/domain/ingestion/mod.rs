//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `DocumentParser` trait for turning raw files into text
//! - `ChunkingStrategy` trait for splitting text into chunks
//! - Configuration and result types for the ingestion pipeline

pub mod chunker;
pub mod parser;
pub mod pipeline;
pub mod validation;

pub use chunker::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
pub use parser::{DocumentMetadata, DocumentParser, ParsedDocument, ParserContent, ParserInput};
pub use pipeline::{ChunkingType, IngestionConfig, IngestionError, IngestionResult, ParserType};
pub use validation::{
    detect_parser_from_filename, validate_batch_size, validate_chunk_params,
    validate_document_id,
};

#[cfg(test)]
pub use chunker::mock::MockChunkingStrategy;
#[cfg(test)]
pub use parser::mock::MockDocumentParser;
