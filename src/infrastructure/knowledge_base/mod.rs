//! Knowledge base provider implementations

mod in_memory;

pub use in_memory::{document_filter, InMemoryVectorKnowledgeBase, DEFAULT_EMBED_BATCH_SIZE};
