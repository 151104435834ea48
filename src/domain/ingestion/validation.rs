//! Validation helpers for ingestion

use crate::domain::DomainError;

use super::pipeline::ParserType;

/// Maximum accepted chunk size in characters
pub const MAX_CHUNK_SIZE: usize = 100_000;

/// Maximum number of chunks per knowledge base call
pub const MAX_BATCH_SIZE: usize = 1000;

/// Detect parser type from filename extension
pub fn detect_parser_from_filename(filename: &str) -> Option<ParserType> {
    let (_, ext) = filename.rsplit_once('.')?;

    match ext.to_lowercase().as_str() {
        "txt" | "text" => Some(ParserType::PlainText),
        "md" | "markdown" => Some(ParserType::Markdown),
        "pdf" => Some(ParserType::Pdf),
        _ => None,
    }
}

/// Validate document ID format
pub fn validate_document_id(id: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("Document ID cannot be empty"));
    }

    if id.len() > 255 {
        return Err(DomainError::validation(
            "Document ID cannot exceed 255 characters",
        ));
    }

    Ok(())
}

/// Validate chunk size parameters
pub fn validate_chunk_params(chunk_size: usize, chunk_overlap: usize) -> Result<(), DomainError> {
    if chunk_size == 0 {
        return Err(DomainError::validation("Chunk size must be greater than 0"));
    }

    if chunk_size > MAX_CHUNK_SIZE {
        return Err(DomainError::validation(format!(
            "Chunk size cannot exceed {} characters",
            MAX_CHUNK_SIZE
        )));
    }

    if chunk_overlap >= chunk_size {
        return Err(DomainError::validation(
            "Chunk overlap must be less than chunk size",
        ));
    }

    Ok(())
}

/// Validate batch size
pub fn validate_batch_size(batch_size: usize) -> Result<(), DomainError> {
    if batch_size == 0 {
        return Err(DomainError::validation("Batch size must be greater than 0"));
    }

    if batch_size > MAX_BATCH_SIZE {
        return Err(DomainError::validation(format!(
            "Batch size cannot exceed {}",
            MAX_BATCH_SIZE
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_parser_from_filename() {
        assert_eq!(
            detect_parser_from_filename("file.txt"),
            Some(ParserType::PlainText)
        );
        assert_eq!(
            detect_parser_from_filename("notes.MARKDOWN"),
            Some(ParserType::Markdown)
        );
        assert_eq!(
            detect_parser_from_filename("./data/The Sun's Light and Heat.pdf"),
            Some(ParserType::Pdf)
        );
        assert_eq!(detect_parser_from_filename("page.html"), None);
        assert_eq!(detect_parser_from_filename("noextension"), None);
        assert_eq!(detect_parser_from_filename("pdf"), None);
    }

    #[test]
    fn test_validate_document_id() {
        assert!(validate_document_id("sun").is_ok());
        assert!(validate_document_id("").is_err());
        assert!(validate_document_id("   ").is_err());
        assert!(validate_document_id(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_chunk_params() {
        assert!(validate_chunk_params(1000, 200).is_ok());
        assert!(validate_chunk_params(0, 0).is_err());
        assert!(validate_chunk_params(100, 100).is_err());
        assert!(validate_chunk_params(MAX_CHUNK_SIZE + 1, 0).is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(100).is_ok());
        assert!(validate_batch_size(0).is_err());
        assert!(validate_batch_size(MAX_BATCH_SIZE + 1).is_err());
    }
}
