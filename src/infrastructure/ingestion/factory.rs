//! Factory for creating parsers and chunkers

use std::sync::Arc;

use crate::domain::ingestion::{
    detect_parser_from_filename, ChunkingStrategy, ChunkingType, DocumentParser, ParserType,
};
use crate::domain::DomainError;

use super::chunkers::{FixedSizeChunker, RecursiveChunker};
use super::parsers::{MarkdownParser, PdfParser, PlainTextParser};

/// Factory for creating document parsers
#[derive(Debug, Default)]
pub struct ParserFactory;

impl ParserFactory {
    pub fn create(parser_type: ParserType) -> Arc<dyn DocumentParser> {
        match parser_type {
            ParserType::PlainText => Arc::new(PlainTextParser::new()),
            ParserType::Markdown => Arc::new(MarkdownParser::new()),
            ParserType::Pdf => Arc::new(PdfParser::new()),
        }
    }

    /// Pick the parser type: an explicit choice wins, then the filename
    /// extension. Content without a filename is treated as plain text.
    pub fn resolve(
        explicit: Option<ParserType>,
        filename: Option<&str>,
    ) -> Result<ParserType, DomainError> {
        if let Some(parser_type) = explicit {
            return Ok(parser_type);
        }

        match filename {
            None => Ok(ParserType::PlainText),
            Some(name) => detect_parser_from_filename(name).ok_or_else(|| {
                DomainError::validation(format!(
                    "Unsupported document type '{}' (supported extensions: {})",
                    name,
                    Self::supported_extensions().join(", ")
                ))
            }),
        }
    }

    pub fn supported_extensions() -> Vec<&'static str> {
        [ParserType::PlainText, ParserType::Markdown, ParserType::Pdf]
            .iter()
            .flat_map(|t| t.extensions().iter().copied())
            .collect()
    }
}

/// Factory for creating chunking strategies
#[derive(Debug, Default)]
pub struct ChunkerFactory;

impl ChunkerFactory {
    pub fn create(chunking_type: ChunkingType) -> Arc<dyn ChunkingStrategy> {
        match chunking_type {
            ChunkingType::FixedSize => Arc::new(FixedSizeChunker::new()),
            ChunkingType::Recursive => Arc::new(RecursiveChunker::new()),
        }
    }
}
