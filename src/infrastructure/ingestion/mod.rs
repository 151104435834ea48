//! Document ingestion infrastructure
//!
//! Parsers, chunkers and the pipeline that feeds chunks into a knowledge base.

pub mod chunkers;
pub mod factory;
pub mod parsers;
pub mod pipeline;

pub use chunkers::{FixedSizeChunker, RecursiveChunker};
pub use factory::{ChunkerFactory, ParserFactory};
pub use parsers::{MarkdownParser, PdfParser, PlainTextParser};
pub use pipeline::IngestionPipeline;
