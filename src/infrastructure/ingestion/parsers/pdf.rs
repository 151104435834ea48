//! PDF document parser

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ingestion::{DocumentMetadata, DocumentParser, ParsedDocument, ParserInput};
use crate::domain::DomainError;

const PDF_MAGIC: &[u8] = b"%PDF";
const PAGE_BREAK: &str = "\u{000C}";

static HYPHENATED_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w)-\n(\w)").expect("valid hyphenation regex"));
static BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));

/// Parser for PDF files.
///
/// Text extraction is CPU bound and runs on the blocking thread pool.
#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }
}

/// Normalize raw extracted text: page breaks become paragraph breaks,
/// words split across lines are rejoined and blank runs are squeezed.
pub(crate) fn clean_pdf_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.replace(PAGE_BREAK, "\n\n");
    let text = HYPHENATED_BREAK.replace_all(&text, "$1$2");

    let text = text
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");

    BLANK_RUNS.replace_all(&text, "\n\n").trim().to_string()
}

#[async_trait]
impl DocumentParser for PdfParser {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let title = input.file_stem();
        let filename = input.filename;
        let bytes = input.content.into_bytes();

        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DomainError::validation(
                "Content is not a PDF document (missing %PDF header)",
            ));
        }

        let pages =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
                .await
                .map_err(|e| DomainError::internal(format!("PDF extraction task failed: {}", e)))?
                .map_err(|e| DomainError::validation(format!("Failed to extract PDF text: {}", e)))?;

        let raw = pages.join(PAGE_BREAK);
        let content = clean_pdf_text(&raw);
        if content.is_empty() {
            return Err(DomainError::validation("PDF contains no extractable text"));
        }

        let mut metadata = DocumentMetadata::new()
            .with_format("pdf")
            .with_page_count(pages.len());

        if let Some(title) = title {
            metadata = metadata.with_title(title);
        }

        if let Some(filename) = filename {
            metadata = metadata.with_source(filename);
        }

        Ok(ParsedDocument::new(content, metadata))
    }
}

/// Single-page PDF with one line of Helvetica text, for tests
#[cfg(test)]
pub(crate) fn one_page_pdf(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 18 Tf 72 700 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extracts_text_from_single_page() {
        let parser = PdfParser::new();
        let input = ParserInput::from_bytes(one_page_pdf("Solar radiation warms the Earth"))
            .with_filename("radiation.pdf");

        let doc = parser.parse(input).await.unwrap();

        assert!(
            doc.content.contains("Solar radiation warms the Earth"),
            "extracted: {:?}",
            doc.content
        );
        assert_eq!(doc.metadata.page_count, Some(1));
        assert_eq!(doc.metadata.format.as_deref(), Some("pdf"));
        assert_eq!(doc.metadata.title.as_deref(), Some("radiation"));
        assert_eq!(doc.metadata.source.as_deref(), Some("radiation.pdf"));
    }

    #[test]
    fn test_clean_joins_hyphenated_words() {
        let raw = "The photo-\nsphere emits light.\r\nSecond line.  ";
        assert_eq!(
            clean_pdf_text(raw),
            "The photosphere emits light.\nSecond line."
        );
    }

    #[test]
    fn test_clean_page_breaks_and_blank_runs() {
        let raw = "\n\nPage one.\u{000C}Page two.\n\n\n\n\nEnd.\n";
        assert_eq!(clean_pdf_text(raw), "Page one.\n\nPage two.\n\nEnd.");
    }

    #[test]
    fn test_clean_keeps_standalone_dashes() {
        assert_eq!(clean_pdf_text("value -\n 3"), "value -\n 3");
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_content() {
        let parser = PdfParser::new();
        let input = ParserInput::from_bytes(b"just text".to_vec()).with_filename("fake.pdf");

        let result = parser.parse(input).await;

        match result {
            Err(DomainError::Validation { message }) => assert!(message.contains("%PDF")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_corrupt_pdf() {
        let parser = PdfParser::new();
        let input = ParserInput::from_bytes(b"%PDF-1.4\nnot really a pdf".to_vec());

        assert!(parser.parse(input).await.is_err());
    }

    #[test]
    fn test_supported_extensions() {
        let parser = PdfParser::new();
        assert!(parser.supports_file("paper.PDF"));
        assert!(!parser.supports_file("paper.txt"));
    }
}
