//! Recursive chunking strategy

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{chunker::helpers, Chunk, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

use super::{build_chunks, merge_small, span_chars, span_of, trim_span, Span};

const HEADER_LEVEL: usize = 0;
const PARAGRAPH_LEVEL: usize = 1;
const SENTENCE_LEVEL: usize = 2;
const WORD_LEVEL: usize = 3;

/// Chunking strategy that recursively splits text hierarchically
///
/// Splitting order: headers -> paragraphs -> sentences -> words -> characters.
/// Neighbouring pieces are packed together while they fit in `chunk_size`.
#[derive(Debug, Clone, Default)]
pub struct RecursiveChunker;

impl RecursiveChunker {
    pub fn new() -> Self {
        Self
    }

    fn is_header(line: &str) -> bool {
        let line = line.trim_start();
        let hashes = line.chars().take_while(|c| *c == '#').count();
        (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
    }

    /// Sections that each begin at a Markdown header line
    fn split_by_headers(text: &str) -> Vec<&str> {
        let mut sections = Vec::new();
        let mut start = 0;

        for line in text.lines() {
            let offset = line.as_ptr() as usize - text.as_ptr() as usize;
            if offset > start && Self::is_header(line) {
                sections.push(&text[start..offset]);
                start = offset;
            }
        }
        sections.push(&text[start..]);

        sections
    }

    fn split(root: &str, span: Span, level: usize) -> Vec<Span> {
        let text = &root[span];
        let parts: Vec<&str> = match level {
            HEADER_LEVEL => Self::split_by_headers(text),
            PARAGRAPH_LEVEL => text.split("\n\n").collect(),
            SENTENCE_LEVEL => text.unicode_sentences().collect(),
            _ => text.split_whitespace().collect(),
        };

        parts
            .into_iter()
            .filter_map(|part| trim_span(root, span_of(root, part)))
            .collect()
    }

    fn chunk_span(root: &str, span: Span, chunk_size: usize, level: usize, out: &mut Vec<Span>) {
        if span_chars(root, &span) <= chunk_size {
            out.push(span);
            return;
        }

        if level > WORD_LEVEL {
            Self::split_by_chars(root, span, chunk_size, out);
            return;
        }

        let parts = Self::split(root, span.clone(), level);
        if parts.len() <= 1 {
            Self::chunk_span(root, span, chunk_size, level + 1, out);
            return;
        }

        let mut current: Option<Span> = None;
        for part in parts {
            current = match current {
                None => Some(part),
                Some(cur) => {
                    let packed = cur.start..part.end;
                    if span_chars(root, &packed) <= chunk_size {
                        Some(packed)
                    } else {
                        Self::chunk_span(root, cur, chunk_size, level + 1, out);
                        Some(part)
                    }
                }
            };
        }

        if let Some(cur) = current {
            Self::chunk_span(root, cur, chunk_size, level + 1, out);
        }
    }

    /// Last resort for a single word longer than `chunk_size`
    fn split_by_chars(root: &str, span: Span, chunk_size: usize, out: &mut Vec<Span>) {
        let mut start = span.start;
        let mut count = 0;

        for (i, _) in root[span.clone()].char_indices() {
            if count == chunk_size {
                out.push(start..span.start + i);
                start = span.start + i;
                count = 0;
            }
            count += 1;
        }

        if start < span.end {
            out.push(start..span.end);
        }
    }
}

impl ChunkingStrategy for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let Some(root_span) = trim_span(content, 0..content.len()) else {
            return Ok(vec![]);
        };

        let mut spans = Vec::new();
        Self::chunk_span(content, root_span, config.chunk_size, HEADER_LEVEL, &mut spans);
        let spans = merge_small(content, spans, config);

        debug_assert!(
            spans
                .iter()
                .all(|s| helpers::char_len(&content[s.clone()]) <= config.chunk_size)
        );

        Ok(build_chunks(content, &spans))
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}
