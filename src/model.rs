//! Data models for X archive posts.
//!
//! The `Raw*` structures mirror the records of `tweets.js` and are validated
//! at the serde boundary. [`Post`] and [`Media`] are the normalized form that
//! the renderer consumes.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::html_escape_attr;

/// One entry of the `tweets.js` array: `{"tweet": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveEntry {
    pub tweet: RawPost,
}

/// A post as it appears in the archive.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    pub full_text: String,
    pub created_at: String,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub extended_entities: Option<ExtendedEntities>,
}

impl RawPost {
    /// The post identifier, preferring `id_str` over `id`.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.id_str
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Extended media list, `None` when the post carries no `extended_entities`.
    #[must_use]
    pub fn extended_media(&self) -> Option<&[ExtendedMedia]> {
        self.extended_entities.as_ref().map(|e| e.media.as_slice())
    }
}

/// Inline entity lists. Any list may be absent from the archive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub media: Vec<MediaEntity>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub user_mentions: Vec<MentionEntity>,
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
}

/// The trailing `https://t.co/...` link to attached media.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaEntity {
    #[serde(deserialize_with = "deserialize_indices")]
    pub indices: (usize, usize),
}

/// A shortened link inside the text.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    #[serde(deserialize_with = "deserialize_indices")]
    pub indices: (usize, usize),
    pub url: String,
    #[serde(default)]
    pub expanded_url: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
}

impl UrlEntity {
    /// Link target: the expanded URL, or the short one if the archive lacks it.
    #[must_use]
    pub fn href(&self) -> &str {
        self.expanded_url.as_deref().unwrap_or(&self.url)
    }

    /// Link label: the display URL, falling back to the target.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_url.as_deref().unwrap_or_else(|| self.href())
    }
}

/// An `@screen_name` mention.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionEntity {
    #[serde(deserialize_with = "deserialize_indices")]
    pub indices: (usize, usize),
    pub screen_name: String,
}

/// A `#tag`.
#[derive(Debug, Clone, Deserialize)]
pub struct HashtagEntity {
    #[serde(deserialize_with = "deserialize_indices")]
    pub indices: (usize, usize),
    pub text: String,
}

/// `extended_entities` block carrying full media metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendedEntities {
    #[serde(default)]
    pub media: Vec<ExtendedMedia>,
}

/// One attached media item with its type tag.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedMedia {
    #[serde(rename = "type", default)]
    pub kind: MediaKind,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_url_https: Option<String>,
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
}

impl ExtendedMedia {
    /// Media URL, preferring the https form.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.media_url_https
            .as_deref()
            .or(self.media_url.as_deref())
    }

    /// Video variants in archive order, empty for photos.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        self.video_info
            .as_ref()
            .map(|info| info.variants.as_slice())
            .unwrap_or(&[])
    }
}

/// Media type tag as written by the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Photo,
    Video,
    AnimatedGif,
}

impl MediaKind {
    /// Whether the archive stores this kind as one of several encodings.
    #[must_use]
    pub const fn has_variants(self) -> bool {
        matches!(self, Self::Video | Self::AnimatedGif)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// One candidate encoding of a video.
#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub content_type: String,
    pub url: String,
}

/// A resolved media item, confirmed present (videos) or assumed present
/// (images, which the archive always ships).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Media {
    Image {
        name: String,
    },
    Video {
        content_type: String,
        name: String,
        looping: bool,
    },
}

impl Media {
    /// On-disk filename inside the media directory.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Image { name } | Self::Video { name, .. } => name,
        }
    }

    /// Render as an embeddable fragment. `prefix` is the directory the media
    /// files live in relative to the page; images link to the full file and
    /// display the thumbnail.
    #[must_use]
    pub fn embed(&self, prefix: &str, thumbnail_prefix: &str) -> String {
        match self {
            Self::Image { name } => {
                let full = html_escape_attr(&join_media_path(prefix, name));
                let thumb = html_escape_attr(&join_media_path(
                    prefix,
                    &format!("{thumbnail_prefix}{name}"),
                ));
                format!("<a href=\"{full}\"><img src=\"{thumb}\" alt=\"\"/></a>")
            }
            Self::Video {
                content_type,
                name,
                looping,
            } => {
                let src = html_escape_attr(&join_media_path(prefix, name));
                let content_type = html_escape_attr(content_type);
                let attrs = if *looping {
                    "autoplay loop muted playsinline"
                } else {
                    "controls"
                };
                format!("<video {attrs}><source src=\"{src}\" type=\"{content_type}\"/></video>")
            }
        }
    }
}

fn join_media_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// A normalized post ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: String,
    pub reply: bool,
    pub text: String,
    pub media: Option<Vec<Media>>,
    pub created_at: DateTime<Utc>,
    pub permalink: String,
}

impl Post {
    /// Timestamp as shown on the page.
    #[must_use]
    pub fn display_time(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Media items, empty when the post had none.
    #[must_use]
    pub fn media_items(&self) -> &[Media] {
        self.media.as_deref().unwrap_or(&[])
    }
}

/// Archive indices arrive as numbers in some exports and numeric strings in
/// others.
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexValue {
    Number(u64),
    Text(String),
}

impl IndexValue {
    fn to_usize(&self) -> Result<usize, String> {
        match self {
            Self::Number(n) => usize::try_from(*n).map_err(|e| e.to_string()),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("index '{s}' is not a number")),
        }
    }
}

fn deserialize_indices<'de, D>(deserializer: D) -> Result<(usize, usize), D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<IndexValue> = Vec::deserialize(deserializer)?;
    let [from, to] = raw.as_slice() else {
        return Err(de::Error::invalid_length(raw.len(), &"exactly two indices"));
    };
    let from = from.to_usize().map_err(de::Error::custom)?;
    let to = to.to_usize().map_err(de::Error::custom)?;
    if from > to {
        return Err(de::Error::custom(format!(
            "entity range [{from}, {to}) is reversed"
        )));
    }
    Ok((from, to))
}
