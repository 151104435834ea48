//! Document parser trait and types

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Raw document content handed to a parser
#[derive(Debug, Clone)]
pub enum ParserContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl ParserContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn bytes(content: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(content.into())
    }

    /// Decode the content as UTF-8 text
    pub fn into_text(self) -> Result<String, DomainError> {
        match self {
            Self::Text(s) => Ok(s),
            Self::Bytes(b) => String::from_utf8(b)
                .map_err(|e| DomainError::validation(format!("Invalid UTF-8: {}", e))),
        }
    }

    /// Raw bytes, encoding text as UTF-8
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(s) => s.into_bytes(),
            Self::Bytes(b) => b,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
        }
    }
}

/// Input for document parsing
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub content: ParserContent,
    /// File name, used for type detection and as the default title
    pub filename: Option<String>,
}

impl ParserInput {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: ParserContent::text(content),
            filename: None,
        }
    }

    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: ParserContent::bytes(content),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// File name without its extension
    pub fn file_stem(&self) -> Option<String> {
        self.filename.as_deref().map(|name| match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        })
    }
}

/// Metadata extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Number of pages, for paginated formats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Format that produced the text, e.g. "pdf"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }

    /// Flatten into a metadata map suitable for chunk documents
    pub fn to_json_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = self.custom.clone();

        let fields = [
            ("title", self.title.clone()),
            ("author", self.author.clone()),
            ("source", self.source.clone()),
            ("format", self.format.clone()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key.to_string(), serde_json::Value::String(value));
            }
        }

        if let Some(page_count) = self.page_count {
            map.insert("page_count".to_string(), serde_json::json!(page_count));
        }

        map
    }
}

/// Result of parsing a document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Extracted text content
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl ParsedDocument {
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn from_content(content: impl Into<String>) -> Self {
        Self::new(content, DocumentMetadata::new())
    }
}

/// Trait for document parsers
#[async_trait]
pub trait DocumentParser: Send + Sync + Debug {
    /// Supported file extensions, lowercase, without the dot
    fn supported_extensions(&self) -> &[&str];

    /// Parse a document and extract text content and metadata
    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError>;

    /// Check if this parser supports a given filename
    fn supports_file(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };

        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock document parser for testing
    #[derive(Debug)]
    pub struct MockDocumentParser {
        extensions: Vec<&'static str>,
        result: Mutex<Option<Result<ParsedDocument, String>>>,
    }

    impl MockDocumentParser {
        pub fn new() -> Self {
            Self {
                extensions: vec!["txt"],
                result: Mutex::new(None),
            }
        }

        pub fn with_extensions(mut self, extensions: Vec<&'static str>) -> Self {
            self.extensions = extensions;
            self
        }

        pub fn with_result(self, result: ParsedDocument) -> Self {
            *self.result.lock().unwrap() = Some(Ok(result));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.result.lock().unwrap() = Some(Err(error.into()));
            self
        }
    }

    impl Default for MockDocumentParser {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DocumentParser for MockDocumentParser {
        fn supported_extensions(&self) -> &[&str] {
            &self.extensions
        }

        async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
            if let Some(result) = self.result.lock().unwrap().take() {
                return result.map_err(DomainError::validation);
            }

            let content = input.content.into_text()?;
            Ok(ParsedDocument::from_content(content))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_content_decoding() {
        assert_eq!(ParserContent::text("sun").into_text().unwrap(), "sun");
        assert_eq!(
            ParserContent::bytes(b"corona".to_vec()).into_text().unwrap(),
            "corona"
        );
        assert!(ParserContent::bytes(vec![0xff, 0xfe]).into_text().is_err());
        assert_eq!(ParserContent::text("ab").into_bytes(), b"ab".to_vec());
    }

    #[test]
    fn test_file_stem() {
        let input = ParserInput::from_text("").with_filename("The Sun's Light and Heat.pdf");
        assert_eq!(input.file_stem().as_deref(), Some("The Sun's Light and Heat"));

        let input = ParserInput::from_text("").with_filename(".env");
        assert_eq!(input.file_stem().as_deref(), Some(".env"));

        assert_eq!(ParserInput::from_text("").file_stem(), None);
    }

    #[test]
    fn test_document_metadata_to_json() {
        let meta = DocumentMetadata::new()
            .with_title("Test")
            .with_source("file.txt")
            .with_page_count(3)
            .with_custom("language", serde_json::json!("en"));

        let map = meta.to_json_map();
        assert_eq!(map.get("title"), Some(&serde_json::json!("Test")));
        assert_eq!(map.get("source"), Some(&serde_json::json!("file.txt")));
        assert_eq!(map.get("page_count"), Some(&serde_json::json!(3)));
        assert_eq!(map.get("language"), Some(&serde_json::json!("en")));
        assert!(!map.contains_key("author"));
    }

    #[test]
    fn test_supports_file() {
        let parser = mock::MockDocumentParser::new().with_extensions(vec!["md", "markdown"]);
        assert!(parser.supports_file("notes.MD"));
        assert!(parser.supports_file("a.b.markdown"));
        assert!(!parser.supports_file("notes.txt"));
        assert!(!parser.supports_file("md"));
    }

    #[tokio::test]
    async fn test_mock_parser() {
        let parser = mock::MockDocumentParser::new()
            .with_result(ParsedDocument::from_content("parsed content"));

        let result = parser.parse(ParserInput::from_text("raw")).await.unwrap();
        assert_eq!(result.content, "parsed content");

        let result = parser.parse(ParserInput::from_text("raw")).await.unwrap();
        assert_eq!(result.content, "raw");
    }
}
