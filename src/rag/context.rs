//! Context assembly from retrieved snippets

use crate::models::RetrievedSnippet;
use crate::models::SourceRef;

/// Separator placed between snippet contents in the prompt context
pub const SNIPPET_SEPARATOR: &str = "\n\n";

/// Assembler for creating context from retrieved snippets
pub struct ContextAssembler;

impl ContextAssembler {
    /// Join snippet contents in rank order, first-ranked first
    #[must_use]
    pub fn assemble(snippets: &[RetrievedSnippet]) -> String {
        snippets
            .iter()
            .map(|snippet| snippet.content.as_str())
            .collect::<Vec<_>>()
            .join(SNIPPET_SEPARATOR)
    }

    /// Map snippets to cited sources, keeping order and scores unchanged
    #[must_use]
    pub fn sources(snippets: &[RetrievedSnippet]) -> Vec<SourceRef> {
        snippets.iter().map(SourceRef::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(content: &str, title: &str, similarity: f32) -> RetrievedSnippet {
        RetrievedSnippet {
            content: content.to_string(),
            title: title.to_string(),
            url: format!("https://docs.example.com/{}", title.to_lowercase()),
            similarity,
        }
    }

    #[test]
    fn test_assemble_keeps_rank_order() {
        let snippets = vec![snippet("first", "A", 0.9), snippet("second", "B", 0.7)];
        assert_eq!(ContextAssembler::assemble(&snippets), "first\n\nsecond");
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(ContextAssembler::assemble(&[]), "");
    }

    #[test]
    fn test_sources_keep_scores() {
        let snippets = vec![snippet("first", "A", 0.91), snippet("second", "B", 0.77)];
        let sources = ContextAssembler::sources(&snippets);

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "A");
        assert!((sources[1].relevance_score - 0.77).abs() < f32::EPSILON);
    }
}
