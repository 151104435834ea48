//! Knowledge agent: ingest a document into a vector knowledge store and
//! answer questions about it with an OpenAI-compatible chat model.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
