//! Fixed-size chunking strategy

use crate::domain::ingestion::{chunker::helpers, Chunk, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

use super::{build_chunks, merge_small, trim_span, Span};

/// Chunking strategy producing overlapping windows of at most `chunk_size`
/// characters, cut on word boundaries where possible
#[derive(Debug, Clone, Default)]
pub struct FixedSizeChunker;

impl FixedSizeChunker {
    pub fn new() -> Self {
        Self
    }
}

/// Byte position where the window starting at `start` ends
fn window_end(text: &str, start: usize, limit: usize, chunk_size: usize) -> usize {
    let target = start + helpers::byte_offset(&text[start..limit], chunk_size);
    if target >= limit {
        return limit;
    }

    if text[target..].starts_with(char::is_whitespace) {
        return target;
    }

    let boundary = helpers::find_word_boundary_before(text, target);
    if boundary <= start {
        // a single word longer than the window gets a hard cut
        target
    } else {
        boundary
    }
}

/// Start of the next window, stepping back `overlap` chars from `end`
fn next_start(text: &str, start: usize, end: usize, overlap: usize) -> usize {
    if overlap == 0 {
        return end;
    }

    let window = &text[start..end];
    let back = start + helpers::byte_offset(window, helpers::char_len(window).saturating_sub(overlap));

    let candidate = if text[..back].chars().next_back().is_none_or(char::is_whitespace) {
        back
    } else {
        helpers::find_word_boundary_after(text, back)
    };

    if candidate <= start || candidate >= end {
        end
    } else {
        candidate
    }
}

impl ChunkingStrategy for FixedSizeChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let Some(root) = trim_span(content, 0..content.len()) else {
            return Ok(vec![]);
        };

        let mut spans: Vec<Span> = Vec::new();
        let mut start = root.start;

        while start < root.end {
            let end = window_end(content, start, root.end, config.chunk_size);

            if let Some(span) = trim_span(content, start..end) {
                spans.push(span);
            }

            if end >= root.end {
                break;
            }

            start = next_start(content, start, end, config.chunk_overlap);
        }

        let spans = merge_small(content, spans, config);
        Ok(build_chunks(content, &spans))
    }

    fn name(&self) -> &'static str {
        "fixed_size"
    }
}
