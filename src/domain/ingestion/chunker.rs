//! Chunking strategy trait and types
//!
//! All sizes and offsets are measured in characters, never bytes.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Chunks shorter than this are merged into a neighbour
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            min_chunk_size: 50.min(chunk_size),
        }
    }

    pub fn with_min_chunk_size(mut self, min_size: usize) -> Self {
        self.min_chunk_size = min_size;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        if self.min_chunk_size > self.chunk_size {
            return Err(DomainError::validation(
                "min_chunk_size must be less than or equal to chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// Position of a chunk within its document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// 0-based
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Character offset where this chunk starts
    pub char_start: usize,
    /// Character offset where this chunk ends (exclusive)
    pub char_end: usize,
}

impl ChunkMetadata {
    pub fn new(
        chunk_index: usize,
        total_chunks: usize,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        Self {
            chunk_index,
            total_chunks,
            char_start,
            char_end,
        }
    }

    pub fn to_json_map(&self) -> HashMap<String, serde_json::Value> {
        HashMap::from([
            ("chunk_index".to_string(), serde_json::json!(self.chunk_index)),
            ("total_chunks".to_string(), serde_json::json!(self.total_chunks)),
            ("char_start".to_string(), serde_json::json!(self.char_start)),
            ("char_end".to_string(), serde_json::json!(self.char_end)),
        ])
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn index(&self) -> usize {
        self.metadata.chunk_index
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into chunks
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError>;

    fn name(&self) -> &'static str;
}

/// Character-safe text helpers shared by the chunkers
pub mod helpers {
    /// Number of characters in `text`
    pub fn char_len(text: &str) -> usize {
        text.chars().count()
    }

    /// Byte offset of the `char_idx`-th character, or `text.len()` past the end
    pub fn byte_offset(text: &str, char_idx: usize) -> usize {
        text.char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    }

    /// Largest char boundary not greater than `pos`
    pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
        if pos >= text.len() {
            return text.len();
        }
        let mut pos = pos;
        while !text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// Byte position of the start of the word containing `pos`.
    ///
    /// Falls back to `pos` when no whitespace precedes it.
    pub fn find_word_boundary_before(text: &str, pos: usize) -> usize {
        if pos >= text.len() {
            return text.len();
        }
        let pos = floor_char_boundary(text, pos);

        match text[..pos].char_indices().rev().find(|(_, c)| c.is_whitespace()) {
            Some((i, c)) => i + c.len_utf8(),
            None => pos,
        }
    }

    /// Byte position of the first whitespace at or after `pos`
    pub fn find_word_boundary_after(text: &str, pos: usize) -> usize {
        if pos >= text.len() {
            return text.len();
        }
        let pos = floor_char_boundary(text, pos);

        text[pos..]
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, _)| pos + i)
            .unwrap_or(text.len())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock chunking strategy for testing
    #[derive(Debug)]
    pub struct MockChunkingStrategy {
        result: Mutex<Option<Result<Vec<Chunk>, String>>>,
    }

    impl MockChunkingStrategy {
        pub fn new() -> Self {
            Self {
                result: Mutex::new(None),
            }
        }

        pub fn with_result(self, chunks: Vec<Chunk>) -> Self {
            *self.result.lock().unwrap() = Some(Ok(chunks));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.result.lock().unwrap() = Some(Err(error.into()));
            self
        }
    }

    impl Default for MockChunkingStrategy {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ChunkingStrategy for MockChunkingStrategy {
        fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
            if let Some(result) = self.result.lock().unwrap().take() {
                return result.map_err(DomainError::validation);
            }

            config.validate()?;

            if content.is_empty() {
                return Ok(vec![]);
            }

            Ok(vec![Chunk::new(
                content,
                ChunkMetadata::new(0, 1, 0, helpers::char_len(content)),
            )])
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}
