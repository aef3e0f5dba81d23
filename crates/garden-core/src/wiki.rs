//! Wiki-style reference parsing.
//!
//! Notes embed cross-references as `[[Title]]` or `[[Title|Display]]`.
//! This module extracts them in occurrence order, captures a window of
//! surrounding text for link context, and offers normalization and rewrite
//! helpers for lookup and rendering layers.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::defaults::LINK_CONTEXT_RADIUS;

/// Matches `[[Title]]` or `[[Title|Display]]`. Titles may not contain `]`
/// or `|`; display text may not contain `]`.
static WIKI_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());

/// A wiki reference extracted from note content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiRef {
    /// Referenced note title, trimmed.
    pub title: String,
    /// Display text; defaults to the title.
    pub display: String,
    /// Surrounding text at extraction time, trimmed.
    pub context: String,
    /// Byte offset of the opening bracket.
    pub start: usize,
    /// Byte offset one past the closing bracket.
    pub end: usize,
}

/// Extract all wiki references from `content`, in occurrence order.
pub fn extract_refs(content: &str) -> Vec<WikiRef> {
    if content.is_empty() {
        return Vec::new();
    }

    WIKI_REF
        .captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).expect("match group 0 always present");
            let title = caps[1].trim().to_string();
            let display = caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| title.clone());

            WikiRef {
                title,
                display,
                context: context_window(content, whole.start(), whole.end()),
                start: whole.start(),
                end: whole.end(),
            }
        })
        .collect()
}

/// The surrounding text window for a reference spanning `start..end`.
///
/// Extends [`LINK_CONTEXT_RADIUS`] bytes on each side, shortened at the
/// input bounds and snapped outward to UTF-8 character boundaries.
fn context_window(content: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(LINK_CONTEXT_RADIUS);
    while from > 0 && !content.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + LINK_CONTEXT_RADIUS).min(content.len());
    while to < content.len() && !content.is_char_boundary(to) {
        to += 1;
    }
    content[from..to].trim().to_string()
}

/// Rewrite every wiki reference through `replacer(title, display)`.
///
/// Used by renderers to turn references into markdown or HTML links; the
/// core itself never rewrites stored content.
pub fn rewrite_refs<F>(content: &str, replacer: F) -> String
where
    F: Fn(&str, &str) -> String,
{
    if content.is_empty() {
        return String::new();
    }

    WIKI_REF
        .replace_all(content, |caps: &Captures| {
            let title = caps[1].trim();
            let display = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|d| !d.is_empty())
                .unwrap_or(title);
            replacer(title, display)
        })
        .into_owned()
}

/// Remove wiki markup, leaving each reference's display text.
pub fn strip_refs(content: &str) -> String {
    rewrite_refs(content, |_, display| display.to_string())
}

/// Normalize a title into a case-insensitive lookup key.
///
/// Lowercases, trims, drops everything but ASCII letters, digits, spaces,
/// hyphens, and underscores, and collapses whitespace runs to single
/// spaces. Stored titles keep their original form; this is only a key.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, ' ' | '-' | '_'))
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}
