//! Text cleanup shared by the extractors, the matcher and the download stage.
//!
//! Each rule is a pure `&str → String` function. The detail extractor applies
//! them in a fixed order: strip citations, collapse whitespace, trim, then
//! truncate the joined description.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that are unsafe in file names on at least one common filesystem.
pub const UNSAFE_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Marker appended to a description cut without a sentence boundary.
pub const ELLIPSIS: &str = "...";

// ── Citations ────────────────────────────────────────────────────────────────

static RE_CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Remove bracketed citation markers such as `[1]`, `[a]` or `[citation needed]`.
pub fn strip_citations(input: &str) -> String {
    RE_CITATION.replace_all(input, "").into_owned()
}

// ── Whitespace ───────────────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run to a single space.
pub fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").into_owned()
}

/// Citation-free, single-spaced, trimmed text.
pub fn clean_text(input: &str) -> String {
    collapse_whitespace(&strip_citations(input)).trim().to_string()
}

// ── Truncation ───────────────────────────────────────────────────────────────

/// Cap `input` at `max_chars` characters.
///
/// Within the first `max_chars` characters the text is cut after the last
/// `". "` boundary, keeping the period. Without such a boundary the prefix is
/// hard-cut and [`ELLIPSIS`] is appended.
pub fn truncate_description(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let cut = input
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let prefix = &input[..cut];

    match prefix.rfind(". ") {
        Some(boundary) => format!("{}.", &prefix[..boundary]),
        None => format!("{prefix}{ELLIPSIS}"),
    }
}

// ── File names ───────────────────────────────────────────────────────────────

/// Replace each filesystem-unsafe character with `_`, one for one.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Matching key: lowercase with spaces turned into underscores.
pub fn match_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}
