//! Knowledge base validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for knowledge base IDs
pub const MAX_KB_ID_LENGTH: usize = 50;

/// Upper bound for the number of results a single search may return
pub const MAX_TOP_K: u32 = 100;

static KB_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]$|^[a-zA-Z0-9]$")
        .expect("knowledge base id pattern is a valid regex")
});

/// Knowledge base validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeBaseValidationError {
    EmptyId,
    IdTooLong { length: usize, max: usize },
    InvalidIdFormat { id: String },
    InvalidTopK { value: u32, min: u32, max: u32 },
    InvalidSimilarityThreshold { value: f32 },
}

impl fmt::Display for KnowledgeBaseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Knowledge base ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(
                    f,
                    "Knowledge base ID too long: {} characters (max {})",
                    length, max
                )
            }
            Self::InvalidIdFormat { id } => {
                write!(
                    f,
                    "Invalid knowledge base ID format '{}': must be alphanumeric with hyphens",
                    id
                )
            }
            Self::InvalidTopK { value, min, max } => {
                write!(
                    f,
                    "Invalid top_k {}: must be between {} and {}",
                    value, min, max
                )
            }
            Self::InvalidSimilarityThreshold { value } => {
                write!(
                    f,
                    "Invalid similarity threshold {}: must be between 0.0 and 1.0",
                    value
                )
            }
        }
    }
}

impl std::error::Error for KnowledgeBaseValidationError {}

/// Validate a knowledge base ID
pub fn validate_knowledge_base_id(id: &str) -> Result<(), KnowledgeBaseValidationError> {
    if id.is_empty() {
        return Err(KnowledgeBaseValidationError::EmptyId);
    }

    if id.len() > MAX_KB_ID_LENGTH {
        return Err(KnowledgeBaseValidationError::IdTooLong {
            length: id.len(),
            max: MAX_KB_ID_LENGTH,
        });
    }

    if !KB_ID_PATTERN.is_match(id) {
        return Err(KnowledgeBaseValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Validate the number of results requested by a search
pub fn validate_top_k(top_k: u32) -> Result<(), KnowledgeBaseValidationError> {
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(KnowledgeBaseValidationError::InvalidTopK {
            value: top_k,
            min: 1,
            max: MAX_TOP_K,
        });
    }
    Ok(())
}

/// Validate a similarity threshold (0.0 - 1.0)
pub fn validate_similarity_threshold(threshold: f32) -> Result<(), KnowledgeBaseValidationError> {
    if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
        return Err(KnowledgeBaseValidationError::InvalidSimilarityThreshold { value: threshold });
    }
    Ok(())
}
