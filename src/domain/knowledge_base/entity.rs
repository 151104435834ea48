//! Knowledge base identity and search result types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::validation::{
    validate_knowledge_base_id, KnowledgeBaseValidationError, MAX_KB_ID_LENGTH,
};

/// Knowledge base identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KnowledgeBaseId(String);

impl KnowledgeBaseId {
    /// Create a new KnowledgeBaseId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, KnowledgeBaseValidationError> {
        let id = id.into();
        validate_knowledge_base_id(&id)?;
        Ok(Self(id))
    }

    /// Derive an identifier from a free-form display name.
    ///
    /// Letters and digits are lowercased, every other run of characters
    /// collapses into a single hyphen, and the result is cut to the
    /// maximum id length. Names without any usable character are rejected.
    pub fn from_name(name: &str) -> Result<Self, KnowledgeBaseValidationError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        slug.truncate(MAX_KB_ID_LENGTH);
        let slug = slug.trim_end_matches('-').to_string();

        Self::new(slug)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KnowledgeBaseId {
    type Error = KnowledgeBaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KnowledgeBaseId> for String {
    fn from(id: KnowledgeBaseId) -> Self {
        id.0
    }
}

impl std::fmt::Display for KnowledgeBaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Search result from a knowledge base query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Unique identifier of the chunk
    pub id: String,
    pub content: String,
    /// Similarity score, higher is more similar
    pub score: f32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Source document reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score,
            metadata: HashMap::new(),
            source: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_all_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Metadata value rendered as plain text, if present
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_base_id_valid() {
        let id = KnowledgeBaseId::new("product-docs").unwrap();
        assert_eq!(id.as_str(), "product-docs");
        assert_eq!(id.to_string(), "product-docs");
    }

    #[test]
    fn test_knowledge_base_id_invalid() {
        assert!(KnowledgeBaseId::new("").is_err());
        assert!(KnowledgeBaseId::new("under_score").is_err());
    }

    #[test]
    fn test_from_name_slugs() {
        assert_eq!(
            KnowledgeBaseId::from_name("CosmosBot").unwrap().as_str(),
            "cosmosbot"
        );
        assert_eq!(
            KnowledgeBaseId::from_name("  Solar  Physics / Archive ").unwrap().as_str(),
            "solar-physics-archive"
        );
        assert_eq!(
            KnowledgeBaseId::from_name("Bot_v2.0").unwrap().as_str(),
            "bot-v2-0"
        );
    }

    #[test]
    fn test_from_name_truncates() {
        let long_name = format!("{}-tail", "x".repeat(60));
        let id = KnowledgeBaseId::from_name(&long_name).unwrap();
        assert_eq!(id.as_str().len(), MAX_KB_ID_LENGTH);
    }

    #[test]
    fn test_from_name_without_alphanumerics() {
        assert!(KnowledgeBaseId::from_name("***").is_err());
        assert!(KnowledgeBaseId::from_name("Ωμέγα").is_err());
    }

    #[test]
    fn test_serde_rejects_invalid_id() {
        let parsed: Result<KnowledgeBaseId, _> = serde_json::from_str("\"bad id\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_search_result_builder() {
        let result = SearchResult::new("doc-1", "Bolometer readings", 0.95)
            .with_metadata("category", serde_json::json!("solar-physics"))
            .with_metadata("chunk_index", serde_json::json!(2))
            .with_source("sun.pdf");

        assert_eq!(result.metadata_text("category").as_deref(), Some("solar-physics"));
        assert_eq!(result.metadata_text("chunk_index").as_deref(), Some("2"));
        assert_eq!(result.metadata_text("missing"), None);
        assert_eq!(result.source.as_deref(), Some("sun.pdf"));
    }
}
