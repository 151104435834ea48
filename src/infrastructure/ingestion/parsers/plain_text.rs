//! Plain text document parser

use async_trait::async_trait;

use crate::domain::ingestion::{DocumentMetadata, DocumentParser, ParsedDocument, ParserInput};
use crate::domain::DomainError;

/// Parser for plain text files
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let title = input.file_stem();
        let filename = input.filename;
        let content = input
            .content
            .into_text()?
            .trim_start_matches('\u{feff}')
            .replace("\r\n", "\n");

        let mut metadata = DocumentMetadata::new().with_format("text");

        if let Some(title) = title {
            metadata = metadata.with_title(title);
        }

        if let Some(filename) = filename {
            metadata = metadata.with_source(filename);
        }

        Ok(ParsedDocument::new(content, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_text_content() {
        let parser = PlainTextParser::new();
        let result = parser
            .parse(ParserInput::from_text("Hello, World!"))
            .await
            .unwrap();

        assert_eq!(result.content, "Hello, World!");
        assert_eq!(result.metadata.format.as_deref(), Some("text"));
        assert!(result.metadata.title.is_none());
    }

    #[tokio::test]
    async fn test_parse_bytes_normalizes_line_endings_and_bom() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_bytes("\u{feff}line one\r\nline two".as_bytes().to_vec());

        let result = parser.parse(input).await.unwrap();

        assert_eq!(result.content, "line one\nline two");
    }

    #[tokio::test]
    async fn test_parse_with_filename() {
        let parser = PlainTextParser::new();
        let input = ParserInput::from_text("content").with_filename("solar notes.txt");

        let result = parser.parse(input).await.unwrap();

        assert_eq!(result.metadata.source.as_deref(), Some("solar notes.txt"));
        assert_eq!(result.metadata.title.as_deref(), Some("solar notes"));
    }

    #[tokio::test]
    async fn test_parse_invalid_utf8() {
        let parser = PlainTextParser::new();
        let result = parser.parse(ParserInput::from_bytes(vec![0xff, 0xfe, 0xfd])).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_supported_extensions() {
        let parser = PlainTextParser::new();
        assert!(parser.supports_file("readme.txt"));
        assert!(parser.supports_file("NOTES.TEXT"));
        assert!(!parser.supports_file("doc.pdf"));
    }
}
