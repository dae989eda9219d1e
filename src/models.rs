//! Core data model shared by the retrieval pipeline and the API layer

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;
use crate::errors::SupportRagError;

/// Title of the synthetic source attached to fallback answers
pub const GENERAL_KNOWLEDGE_TITLE: &str = "General Knowledge";

/// Relevance reported for the synthetic fallback source
pub const GENERAL_KNOWLEDGE_SCORE: f32 = 0.5;

/// A validated user question: trimmed and guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trim the raw input and reject it if nothing is left
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SupportRagError::InvalidQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert an index distance into a similarity score in `[0, 1]`.
///
/// Similarity is `1 - distance`. Cosine distance ranges over `[0, 2]` and L2
/// is unbounded, so the result is clamped; non-finite distances map to 0.
pub fn similarity_from_distance(distance: f32) -> f32 {
    if !distance.is_finite() {
        return 0.0;
    }
    (1.0 - distance).clamp(0.0, 1.0)
}

/// One passage returned by the retriever, with provenance and score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSnippet {
    pub content: String,
    pub title: String,
    pub url: String,
    /// 1.0 means identical to the query
    pub similarity: f32,
}

/// System and user instructions for one completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    system_instruction: String,
    user_instruction: String,
}

impl ComposedPrompt {
    pub fn new(system_instruction: String, user_instruction: String) -> Self {
        Self {
            system_instruction,
            user_instruction,
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn user_instruction(&self) -> &str {
        &self.user_instruction
    }
}

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerMode {
    #[serde(rename = "RAG (Full Knowledge Base)")]
    Rag,
    #[serde(rename = "Fallback (General Knowledge)")]
    Fallback,
    #[serde(rename = "Error")]
    Error,
}

impl AnswerMode {
    /// Label used on the wire
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rag => "RAG (Full Knowledge Base)",
            Self::Fallback => "Fallback (General Knowledge)",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cited source attached to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub relevance_score: f32,
}

impl From<&RetrievedSnippet> for SourceRef {
    fn from(snippet: &RetrievedSnippet) -> Self {
        Self {
            title: snippet.title.clone(),
            url: snippet.url.clone(),
            relevance_score: snippet.similarity,
        }
    }
}

impl SourceRef {
    /// Low-confidence provenance marker for answers produced without retrieval
    pub fn general_knowledge(docs_url: &str) -> Self {
        Self {
            title: GENERAL_KNOWLEDGE_TITLE.to_string(),
            url: docs_url.to_string(),
            relevance_score: GENERAL_KNOWLEDGE_SCORE,
        }
    }
}

/// The single response shape produced for every valid query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub query: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub generated_at: DateTime<Utc>,
    pub mode: AnswerMode,
}

impl AnswerResult {
    /// Get a formatted string representation
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Query: {}\n", self.query));
        output.push_str(&format!("Mode: {}\n\n", self.mode));
        output.push_str(&format!("Answer:\n{}\n\n", self.answer));
        output.push_str(&format!("Sources ({}):\n", self.sources.len()));

        for (idx, source) in self.sources.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} <{}> (score: {:.2})\n",
                idx + 1,
                source.title,
                source.url,
                source.relevance_score
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_trimmed() {
        let query = Query::parse("  How do I mint?\n").unwrap();
        assert_eq!(query.as_str(), "How do I mint?");
    }

    #[test]
    fn test_blank_query_rejected() {
        for raw in ["", "   ", "\n\t  "] {
            assert!(matches!(
                Query::parse(raw),
                Err(SupportRagError::InvalidQuery)
            ));
        }
    }

    #[test]
    fn test_similarity_from_distance() {
        assert!((similarity_from_distance(0.15) - 0.85).abs() < 1e-6);
        assert!((similarity_from_distance(0.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_is_clamped() {
        assert!(similarity_from_distance(1.7).abs() < f32::EPSILON);
        assert!((similarity_from_distance(-0.2) - 1.0).abs() < f32::EPSILON);
        assert!(similarity_from_distance(f32::NAN).abs() < f32::EPSILON);
        assert!(similarity_from_distance(f32::INFINITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_mode_labels_serialize() {
        assert_eq!(
            serde_json::to_string(&AnswerMode::Rag).unwrap(),
            "\"RAG (Full Knowledge Base)\""
        );
        assert_eq!(
            serde_json::to_string(&AnswerMode::Fallback).unwrap(),
            "\"Fallback (General Knowledge)\""
        );
        assert_eq!(AnswerMode::Error.to_string(), "Error");
    }

    #[test]
    fn test_source_from_snippet_keeps_score() {
        let snippet = RetrievedSnippet {
            content: "body".to_string(),
            title: "Minting Guide".to_string(),
            url: "https://docs.example.com/mint".to_string(),
            similarity: 0.91,
        };
        let source = SourceRef::from(&snippet);
        assert_eq!(source.title, "Minting Guide");
        assert!((source.relevance_score - 0.91).abs() < f32::EPSILON);
    }

    #[test]
    fn test_general_knowledge_source() {
        let source = SourceRef::general_knowledge("https://docs.example.com");
        assert_eq!(source.title, GENERAL_KNOWLEDGE_TITLE);
        assert!((source.relevance_score - 0.5).abs() < f32::EPSILON);
    }
}
