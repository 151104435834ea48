//! Markdown document parser

use async_trait::async_trait;
use pulldown_cmark::{Event, Parser, Tag};

use crate::domain::ingestion::{DocumentMetadata, DocumentParser, ParsedDocument, ParserInput};
use crate::domain::DomainError;

/// Parser for Markdown files.
///
/// Produces plain text with `#` heading markers kept and blocks separated
/// by blank lines, so header- and paragraph-aware chunkers still see the
/// document structure.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_text_and_title(markdown: &str) -> (String, Option<String>) {
        let mut text = String::new();
        let mut title: Option<String> = None;
        let mut heading: Option<(usize, String)> = None;

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Heading(level, ..)) => {
                    heading = Some((level as usize, String::new()));
                }
                Event::End(Tag::Heading(..)) => {
                    if let Some((level, content)) = heading.take() {
                        let content = content.trim();
                        if level == 1 && title.is_none() && !content.is_empty() {
                            title = Some(content.to_string());
                        }
                        start_block(&mut text);
                        text.push_str(&"#".repeat(level));
                        text.push(' ');
                        text.push_str(content);
                        text.push_str("\n\n");
                    }
                }
                Event::Text(t) | Event::Code(t) => match heading.as_mut() {
                    Some((_, content)) => content.push_str(&t),
                    None => text.push_str(&t),
                },
                Event::SoftBreak | Event::HardBreak => match heading.as_mut() {
                    Some((_, content)) => content.push(' '),
                    None => text.push('\n'),
                },
                Event::Start(Tag::Paragraph) | Event::Start(Tag::CodeBlock(_)) => {
                    start_block(&mut text);
                }
                Event::End(Tag::Paragraph) | Event::End(Tag::CodeBlock(_)) => {
                    text.push_str("\n\n");
                }
                Event::Start(Tag::Item) => {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str("- ");
                }
                Event::End(Tag::Item) => {
                    if !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Event::End(Tag::List(_)) => text.push('\n'),
                _ => {}
            }
        }

        (tidy(&text), title)
    }
}

fn start_block(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

/// Trim every line and squeeze runs of blank lines down to one
fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

#[async_trait]
impl DocumentParser for MarkdownParser {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    async fn parse(&self, input: ParserInput) -> Result<ParsedDocument, DomainError> {
        let stem = input.file_stem();
        let filename = input.filename;
        let raw_content = input.content.into_text()?;
        let (content, title) = Self::extract_text_and_title(&raw_content);

        let mut metadata = DocumentMetadata::new().with_format("markdown");

        if let Some(title) = title.or(stem) {
            metadata = metadata.with_title(title);
        }

        if let Some(filename) = filename {
            metadata = metadata.with_source(filename);
        }

        Ok(ParsedDocument::new(content, metadata))
    }
}
