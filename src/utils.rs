//! Small helpers shared by the library and the CLI

/// Safely truncate a string at character boundary (not byte boundary)
///
/// This prevents panics when truncating strings with multi-byte UTF-8 characters (emojis, etc.)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}
