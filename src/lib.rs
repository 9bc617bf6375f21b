//! xstatic - Turn an X data archive into a static HTML page
//!
//! This library reads the `tweets.js` export of an X/Twitter archive,
//! resolves inline entities and attached media, and renders the result as a
//! single `index.html` with an optional media directory of copies and
//! thumbnails.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`error`] - Custom error types with rich context
//! - [`model`] - Archive records and normalized posts
//! - [`parser`] - Archive layout and JS-wrapped JSON parsing
//! - [`entities`] - Entity lists to text replacements
//! - [`stitch`] - Applying replacements to post text
//! - [`media`] - Resolving media items against the media directory
//! - [`timeline`] - Per-post normalization, ordering and cutoff
//! - [`render`] - The `index.html` template
//! - [`convert`] - Media copies and thumbnails

pub mod cli;
pub mod config;
pub mod convert;
pub mod date_parser;
pub mod entities;
pub mod error;
pub mod logging;
pub mod media;
pub mod model;
pub mod parser;
pub mod render;
pub mod stitch;
pub mod timeline;

pub use cli::*;
pub use config::Config;
pub use convert::{ConversionStats, ConvertOptions, convert_media};
pub use error::{Result, ResultExt, XstaticError, format_error, format_xstatic_error};
pub use media::{MediaIndex, MediaLookup, resolve_media};
pub use model::*;
pub use parser::ArchiveParser;
pub use render::{RenderOptions, render_page, write_index};
pub use stitch::{TextSpan, stitch};
pub use timeline::{Timeline, TimelineOptions, TimelineStats, normalize_post};

/// Standard width for content dividers in CLI output
pub const CONTENT_DIVIDER_WIDTH: usize = 60;

/// Escape text for use inside a double-quoted HTML attribute.
#[must_use]
pub fn html_escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Format an unsigned integer with thousands separators.
#[must_use]
pub fn format_number_u64(value: u64) -> String {
    let mut out = String::with_capacity(24);

    for (idx, ch) in value.to_string().chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// Format a usize with thousands separators.
#[must_use]
pub fn format_number_usize(value: usize) -> String {
    format_number_u64(u64::try_from(value).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::{format_number_usize, html_escape_attr};

    #[test]
    fn format_number_adds_separators() {
        assert_eq!(format_number_usize(0), "0");
        assert_eq!(format_number_usize(999), "999");
        assert_eq!(format_number_usize(1000), "1,000");
        assert_eq!(format_number_usize(12_345_678), "12,345,678");
    }

    #[test]
    fn html_escape_attr_escapes_markup() {
        assert_eq!(
            html_escape_attr("https://a.test/?q=\"x\"&y=<z>"),
            "https://a.test/?q=&quot;x&quot;&amp;y=&lt;z&gt;"
        );
        assert_eq!(html_escape_attr("plain"), "plain");
    }
}
