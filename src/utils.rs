//! Small string helpers for scraped text and log output.
//!
//! - Whitespace normalization for text pulled out of HTML nodes
//! - Character-safe truncation for descriptions and log previews

use itertools::Itertools;

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// Text nodes scraped from listing pages carry the indentation and line
/// breaks of the surrounding markup; titles should not.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  Hello\n   world "), "Hello world");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Keep at most `max` characters of `s`.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and the
/// number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        kept
    } else {
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}
