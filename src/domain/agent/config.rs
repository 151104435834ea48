//! Agent configuration

use serde::{Deserialize, Serialize};

use super::error::AgentError;

/// Fixed-shape agent configuration.
///
/// Every field is mandatory; the record is built once and handed to an
/// [`AgentFactory`](super::AgentFactory) by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Display name, also used to derive the knowledge base id
    pub name: String,
    /// Chat model identifier
    pub model: String,
    /// Embedding model identifier
    pub embedding_model: String,
    /// Whether the agent owns a searchable knowledge store
    pub knowledge: bool,
    pub system_prompt: String,
}

impl AgentConfig {
    /// Reject configurations that cannot produce a working agent
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.name.trim().is_empty() {
            return Err(AgentError::initialization(
                &self.name,
                "agent name cannot be empty",
            ));
        }

        if self.model.trim().is_empty() {
            return Err(AgentError::initialization(
                &self.name,
                "model cannot be empty",
            ));
        }

        if self.knowledge && self.embedding_model.trim().is_empty() {
            return Err(AgentError::initialization(
                &self.name,
                "embedding model is required when knowledge is enabled",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentConfig {
        AgentConfig {
            name: "CosmosBot".to_string(),
            model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            knowledge: true,
            system_prompt: "You answer questions.".to_string(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let cfg = AgentConfig {
            name: "  ".to_string(),
            ..config()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AgentError::Initialization { .. })
        ));
    }

    #[test]
    fn test_empty_model_rejected() {
        let cfg = AgentConfig {
            model: String::new(),
            ..config()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to initialize agent 'CosmosBot': model cannot be empty"
        );
    }

    #[test]
    fn test_embedding_model_only_required_with_knowledge() {
        let cfg = AgentConfig {
            embedding_model: String::new(),
            ..config()
        };
        assert!(cfg.validate().is_err());

        let cfg = AgentConfig {
            embedding_model: String::new(),
            knowledge: false,
            ..config()
        };
        assert!(cfg.validate().is_ok());
    }
}
