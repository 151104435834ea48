//! Agent implementations

mod factory;
mod prompt;
mod rag_agent;

pub use factory::OpenAiAgentFactory;
pub use prompt::{build_context_block, compose_system_prompt, ContextBlock};
pub use rag_agent::{RagAgent, RetrievalSettings};
