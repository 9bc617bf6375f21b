//! Applying entity replacements to post text.
//!
//! Entity indices count characters of the *original* text. Replacements are
//! applied from the highest start index to the lowest so that each
//! substitution only shifts text that has already been processed.

use serde::Serialize;

use crate::error::{Result, XstaticError};

/// Line-break marker substituted for literal newlines.
pub const LINE_BREAK: &str = "<br/>";

/// A `[from, to)` character range of the original text and its replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub from: usize,
    pub to: usize,
    pub replacement: String,
}

impl TextSpan {
    pub fn new(from: usize, to: usize, replacement: impl Into<String>) -> Self {
        Self {
            from,
            to,
            replacement: replacement.into(),
        }
    }
}

/// Stitch `spans` into `text` and normalize line breaks.
///
/// `post_id` only labels errors.
///
/// # Errors
///
/// Returns [`XstaticError::InvalidEntity`] when a span ends past the end of
/// the text or overlaps another span.
pub fn stitch(post_id: &str, text: &str, mut spans: Vec<TextSpan>) -> Result<String> {
    spans.sort_by(|a, b| {
        b.from
            .cmp(&a.from)
            .then(b.to.cmp(&a.to))
            .then_with(|| a.replacement.cmp(&b.replacement))
    });
    // The same entity listed twice is applied once.
    spans.dedup();

    // Byte offset of every character boundary, plus the end of the string,
    // so character indices convert in O(1).
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut out = text.to_string();
    let mut floor = char_len;
    for span in &spans {
        if span.from > span.to || span.to > char_len {
            return Err(XstaticError::invalid_entity(
                post_id,
                format!(
                    "span [{}, {}) runs past the end of a {char_len}-character text",
                    span.from, span.to
                ),
            ));
        }
        if span.to > floor {
            return Err(XstaticError::invalid_entity(
                post_id,
                format!("span [{}, {}) overlaps a later span", span.from, span.to),
            ));
        }
        out.replace_range(boundaries[span.from]..boundaries[span.to], &span.replacement);
        floor = span.from;
    }

    Ok(normalize_line_breaks(&out))
}

/// Replace literal newlines with [`LINE_BREAK`].
#[must_use]
pub fn normalize_line_breaks(text: &str) -> String {
    text.replace('\n', LINE_BREAK)
}
