//! Agent domain - configuration, errors and the traits the workflow talks to

mod config;
mod error;
mod response;
mod traits;

pub use config::AgentConfig;
pub use error::AgentError;
pub use response::{AgentResponse, IngestionRequest, KnowledgeSource};
pub use traits::{AgentFactory, KnowledgeAgent};

#[cfg(test)]
pub use traits::mock::{AgentCall, MockAgent, MockAgentFactory};
