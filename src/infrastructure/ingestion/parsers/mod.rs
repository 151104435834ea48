//! Document parser implementations

mod markdown;
mod pdf;
mod plain_text;

pub use markdown::MarkdownParser;
pub use pdf::PdfParser;
pub use plain_text::PlainTextParser;

#[cfg(test)]
pub(crate) use pdf::one_page_pdf;
