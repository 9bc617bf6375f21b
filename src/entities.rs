//! Turning archive entities into text replacements.

use crate::html_escape_attr;
use crate::model::Entities;
use crate::stitch::TextSpan;

/// Base URL for mention links.
pub const PROFILE_BASE_URL: &str = "https://twitter.com";

/// Collect one [`TextSpan`] per entity, in no particular order.
///
/// Media entities mark the trailing `t.co` link to attached media and are
/// removed, since the media is rendered separately.
#[must_use]
pub fn resolve_spans(entities: &Entities) -> Vec<TextSpan> {
    let mut spans = Vec::with_capacity(
        entities.media.len()
            + entities.urls.len()
            + entities.user_mentions.len()
            + entities.hashtags.len(),
    );

    for media in &entities.media {
        let (from, to) = media.indices;
        spans.push(TextSpan::new(from, to, ""));
    }

    for url in &entities.urls {
        let (from, to) = url.indices;
        spans.push(TextSpan::new(from, to, link(url.href(), url.label())));
    }

    for mention in &entities.user_mentions {
        let (from, to) = mention.indices;
        spans.push(TextSpan::new(from, to, mention_link(&mention.screen_name)));
    }

    for hashtag in &entities.hashtags {
        let (from, to) = hashtag.indices;
        spans.push(TextSpan::new(
            from,
            to,
            format!("<span class=\"hashtag\">#{}</span>", hashtag.text),
        ));
    }

    spans
}

fn link(href: &str, label: &str) -> String {
    format!("<a href=\"{}\">{label}</a>", html_escape_attr(href))
}

fn mention_link(screen_name: &str) -> String {
    link(
        &format!("{PROFILE_BASE_URL}/{screen_name}"),
        &format!("@{screen_name}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(json: &str) -> Entities {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn absent_lists_yield_no_spans() {
        assert!(resolve_spans(&entities("{}")).is_empty());
    }

    #[test]
    fn url_span_uses_expanded_and_display_forms() {
        let spans = resolve_spans(&entities(
            r#"{"urls": [{
                "indices": ["12", "31"],
                "url": "https://t.co/abc123",
                "expanded_url": "https://example.com/page",
                "display_url": "example.com/page"
            }]}"#,
        ));
        assert_eq!(
            spans,
            vec![TextSpan::new(
                12,
                31,
                "<a href=\"https://example.com/page\">example.com/page</a>"
            )]
        );
    }

    #[test]
    fn url_href_is_attribute_escaped() {
        let spans = resolve_spans(&entities(
            r#"{"urls": [{
                "indices": [0, 10],
                "url": "https://t.co/q",
                "expanded_url": "https://example.com/?a=1&b=\"2\"",
                "display_url": "example.com/?a=1…"
            }]}"#,
        ));
        assert!(spans[0]
            .replacement
            .starts_with("<a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">"));
    }

    #[test]
    fn mention_links_to_profile() {
        let spans = resolve_spans(&entities(
            r#"{"user_mentions": [{"indices": ["0", "6"], "screen_name": "rustlang", "id_str": "1"}]}"#,
        ));
        assert_eq!(
            spans[0].replacement,
            "<a href=\"https://twitter.com/rustlang\">@rustlang</a>"
        );
    }

    #[test]
    fn hashtag_is_wrapped_in_span() {
        let spans = resolve_spans(&entities(
            r#"{"hashtags": [{"indices": ["32", "37"], "text": "neat"}]}"#,
        ));
        assert_eq!(
            spans,
            vec![TextSpan::new(
                32,
                37,
                "<span class=\"hashtag\">#neat</span>"
            )]
        );
    }

    #[test]
    fn media_span_is_removed() {
        let spans = resolve_spans(&entities(
            r#"{"media": [{"indices": ["20", "43"], "url": "https://t.co/pic"}]}"#,
        ));
        assert_eq!(spans, vec![TextSpan::new(20, 43, "")]);
    }

    #[test]
    fn all_kinds_resolve_together() {
        let spans = resolve_spans(&entities(
            r##"{
                "hashtags": [{"indices": ["30", "34"], "text": "tag"}],
                "user_mentions": [{"indices": ["0", "4"], "screen_name": "bob"}],
                "urls": [{"indices": ["5", "17"], "url": "https://t.co/u"}],
                "media": [{"indices": ["35", "58"]}]
            }"##,
        ));
        assert_eq!(spans.len(), 4);
        let mut starts: Vec<usize> = spans.iter().map(|s| s.from).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![0, 5, 30, 35]);
    }
}
