//! Text preprocessing utilities for embedding generation
//!
//! Provides utilities for cleaning and normalizing text before it is sent to
//! an embedding provider.

use tracing::debug;
use tracing::warn;

use crate::errors::SupportRagError;

/// Longest input (in characters) sent to an embedding provider
pub const MAX_EMBED_CHARS: usize = 8000;

/// Preprocess text for embedding generation
///
/// This function handles:
/// - Normalizing whitespace and newlines
/// - Removing control characters
/// - Truncating overly long input at a word boundary
pub fn preprocess_text_for_embedding(text: &str) -> Result<String, SupportRagError> {
    if text.is_empty() {
        return Err(SupportRagError::EmbeddingError(
            "Empty text provided".to_string(),
        ));
    }

    let normalized = normalize_whitespace(text);
    let sanitized = sanitize_text(&normalized);

    if sanitized.is_empty() {
        return Err(SupportRagError::EmbeddingError(
            "Text contains only whitespace after preprocessing".to_string(),
        ));
    }

    let char_count = sanitized.chars().count();
    if char_count > MAX_EMBED_CHARS {
        warn!("Text too long ({char_count} chars), truncating to {MAX_EMBED_CHARS}");
        return Ok(smart_truncate_text(&sanitized, MAX_EMBED_CHARS));
    }

    debug!(
        "Preprocessed text: {} -> {} chars",
        text.len(),
        sanitized.len()
    );
    Ok(sanitized)
}

/// Collapse every run of whitespace (newlines, tabs, CR) into a single space
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Replace control characters with spaces, keep everything printable
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Truncate to `max_chars` characters, preferring the last word boundary
/// in the final quarter of the allowed length
fn smart_truncate_text(text: &str, max_chars: usize) -> String {
    let Some((byte_end, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let truncated = &text[..byte_end];
    if let Some(last_space) = truncated.rfind(' ') {
        if last_space > truncated.len() * 3 / 4 {
            return truncated[..last_space].to_string();
        }
    }

    truncated.to_string()
}
