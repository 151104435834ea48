//! Knowledge context rendering for the system prompt

use std::fmt::Write;

use crate::domain::knowledge_base::SearchResult;

/// Metadata keys that describe chunk placement rather than the document
const INTERNAL_KEYS: &[&str] = &[
    "chunk_index",
    "total_chunks",
    "char_start",
    "char_end",
    "document_id",
    "source",
];

const CONTEXT_HEADING: &str = "## Knowledge context\n\
Answer using the numbered excerpts below when they are relevant. \
Say so when they do not contain the answer.";

/// Rendered context plus how many search results made it in
#[derive(Debug, Clone, PartialEq)]
pub struct ContextBlock {
    pub text: String,
    pub used: usize,
}

/// Render search results as a numbered context block of at most
/// `max_chars` characters.
///
/// Entries are added in ranking order until the budget runs out; only the
/// first entry is ever cut short. Returns `None` when there is nothing to show.
pub fn build_context_block(results: &[SearchResult], max_chars: usize) -> Option<ContextBlock> {
    if results.is_empty() || max_chars == 0 {
        return None;
    }

    let mut text = String::from(CONTEXT_HEADING);
    let mut used = 0;

    for (i, result) in results.iter().enumerate() {
        let entry = render_entry(i + 1, result);
        let size = text.chars().count() + 2 + entry.chars().count();

        if size > max_chars {
            if used == 0 {
                let room = max_chars.saturating_sub(text.chars().count() + 3);
                if room > 0 {
                    text.push_str("\n\n");
                    text.extend(entry.chars().take(room));
                    text.push('…');
                    used = 1;
                }
            }
            break;
        }

        text.push_str("\n\n");
        text.push_str(&entry);
        used += 1;
    }

    (used > 0).then_some(ContextBlock { text, used })
}

fn render_entry(number: usize, result: &SearchResult) -> String {
    let mut header = format!("[{}]", number);

    if let Some(source) = &result.source {
        let _ = write!(header, " source: {}", source);
    }

    let mut tags: Vec<(&String, String)> = result
        .metadata
        .keys()
        .filter(|key| !INTERNAL_KEYS.contains(&key.as_str()))
        .filter_map(|key| result.metadata_text(key).map(|value| (key, value)))
        .collect();
    tags.sort();

    if !tags.is_empty() {
        let rendered: Vec<String> = tags.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let _ = write!(header, " | {}", rendered.join(", "));
    }

    let _ = write!(header, " | relevance {:.2}", result.score);

    format!("{}\n{}", header, result.content.trim())
}

/// Append the context block to the agent's own system prompt
pub fn compose_system_prompt(base: &str, context: Option<&ContextBlock>) -> String {
    match context {
        Some(block) if base.trim().is_empty() => block.text.clone(),
        Some(block) => format!("{}\n\n{}", base.trim_end(), block.text),
        None => base.to_string(),
    }
}
