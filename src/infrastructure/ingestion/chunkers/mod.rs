//! Chunking strategy implementations
//!
//! Both chunkers work on byte spans into the source text and only convert
//! to owned strings at the end, so chunk content is always a verbatim slice
//! of the input and char offsets are exact.

use std::ops::Range;

use crate::domain::ingestion::{chunker::helpers, Chunk, ChunkMetadata, ChunkingConfig};

mod fixed_size;
mod recursive;

pub use fixed_size::FixedSizeChunker;
pub use recursive::RecursiveChunker;

type Span = Range<usize>;

/// Byte span of `part` inside `root`; `part` must be a subslice of `root`
fn span_of(root: &str, part: &str) -> Span {
    let start = part.as_ptr() as usize - root.as_ptr() as usize;
    start..start + part.len()
}

/// Span with surrounding whitespace removed, `None` when nothing is left
fn trim_span(root: &str, span: Span) -> Option<Span> {
    let trimmed = root[span].trim();
    (!trimmed.is_empty()).then(|| span_of(root, trimmed))
}

fn span_chars(root: &str, span: &Span) -> usize {
    helpers::char_len(&root[span.clone()])
}

/// Fold spans shorter than `min_chunk_size` into their predecessor when the
/// combined span still fits in `chunk_size`
fn merge_small(root: &str, spans: Vec<Span>, config: &ChunkingConfig) -> Vec<Span> {
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(last) = merged.last_mut() {
            let small = span_chars(root, last) < config.min_chunk_size
                || span_chars(root, &span) < config.min_chunk_size;
            let combined = last.start..span.end.max(last.end);

            if small && span_chars(root, &combined) <= config.chunk_size {
                *last = combined;
                continue;
            }
        }
        merged.push(span);
    }

    merged
}

/// Turn ordered spans (starts non-decreasing) into chunks with char offsets
fn build_chunks(root: &str, spans: &[Span]) -> Vec<Chunk> {
    let total = spans.len();
    let mut byte_pos = 0;
    let mut char_pos = 0;

    spans
        .iter()
        .enumerate()
        .map(|(index, span)| {
            char_pos += helpers::char_len(&root[byte_pos..span.start]);
            byte_pos = span.start;

            let content = &root[span.clone()];
            let char_end = char_pos + helpers::char_len(content);
            Chunk::new(content, ChunkMetadata::new(index, total, char_pos, char_end))
        })
        .collect()
}
