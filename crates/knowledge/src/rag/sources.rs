//! Mapping retrieval hits to user-facing source references.

use crate::rag::types::SourceRef;
use crate::types::ScoredDocument;
use std::collections::HashSet;

/// Maximum snippet length for source references, in characters.
const MAX_SNIPPET_LENGTH: usize = 150;

/// One reference per distinct (source, row), in retrieval order.
pub fn map_sources(hits: &[ScoredDocument]) -> Vec<SourceRef> {
    let mut seen = HashSet::new();

    hits.iter()
        .filter(|hit| seen.insert((hit.document.metadata.source.as_str(), hit.document.metadata.row)))
        .map(|hit| SourceRef {
            source: hit.document.metadata.source.clone(),
            location: format!("row {}", hit.document.metadata.row),
            score: hit.score,
            snippet: truncate_snippet(&flatten(&hit.document.page_content), MAX_SNIPPET_LENGTH),
        })
        .collect()
}

/// Row text on one line: `"name: X; price: Y"`.
fn flatten(page_content: &str) -> String {
    page_content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Truncate to `max_chars` characters, preferring a word boundary.
pub(crate) fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let truncated = &text[..cut];
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) if last_space > 0 => format!("{}...", truncated[..last_space].trim_end()),
        _ => format!("{}...", truncated),
    }
}
