//! Normalizing archive posts into the ordered timeline the page shows.
//!
//! A post either normalizes completely or is left out: reposts are
//! filtered, and a post whose text or media cannot be resolved is dropped
//! without affecting any other post.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::entities::resolve_spans;
use crate::error::{Result, XstaticError};
use crate::logging::OperationGuard;
use crate::media::{MediaIndex, MediaLookup, resolve_media};
use crate::model::{Post, RawPost};
use crate::parser::ArchiveParser;
use crate::stitch::stitch;

/// Text prefix marking a repost.
pub const REPOST_PREFIX: &str = "RT ";

/// Base URL for status permalinks.
pub const STATUS_BASE_URL: &str = "https://twitter.com";

/// Account segment used when the archive owner's username is unknown.
pub const UNKNOWN_ACCOUNT: &str = "i/web";

/// Permalink of post `id` by `username`.
#[must_use]
pub fn permalink(username: &str, id: &str) -> String {
    format!("{STATUS_BASE_URL}/{username}/status/{id}")
}

/// Whether a post counts as a reply: its text opens with a mention.
#[must_use]
pub fn is_reply(text: &str) -> bool {
    text.starts_with('@')
}

/// Normalize one archive post.
///
/// Returns `Ok(None)` for reposts.
///
/// # Errors
///
/// Any error means this post cannot be shown: missing identifier,
/// unparseable timestamp, entities outside the text, or a video with no
/// file on disk.
pub fn normalize_post(
    raw: &RawPost,
    media: &impl MediaLookup,
    username: &str,
) -> Result<Option<Post>> {
    if raw.full_text.starts_with(REPOST_PREFIX) {
        return Ok(None);
    }

    let id = raw
        .identifier()
        .ok_or_else(|| XstaticError::invalid_entity("<unknown>", "post has no identifier"))?;

    let created_at = ArchiveParser::parse_post_date(&raw.created_at)
        .ok_or_else(|| XstaticError::invalid_date(&raw.created_at, format!("post {id}")))?;

    let text = stitch(id, &raw.full_text, resolve_spans(&raw.entities))?;

    let media = raw
        .extended_media()
        .map(|items| resolve_media(id, items, media))
        .transpose()?;

    Ok(Some(Post {
        id: id.to_string(),
        reply: is_reply(&raw.full_text),
        text,
        media,
        created_at,
        permalink: permalink(username, id),
    }))
}

/// Counts of what happened to each archive entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimelineStats {
    /// Entries read from the archive files.
    pub loaded: usize,
    /// Entries that were not valid post records.
    pub malformed: usize,
    pub reposts: usize,
    /// Posts dropped because a video file is missing.
    pub missing_media: usize,
    /// Posts dropped for bad entities, ids or timestamps.
    pub invalid: usize,
    pub before_cutoff: usize,
    pub kept: usize,
}

/// Options for loading a timeline from disk.
#[derive(Debug, Clone, Default)]
pub struct TimelineOptions {
    /// Drop posts strictly older than this.
    pub cutoff: Option<DateTime<Utc>>,
    /// Account for permalinks; read from `account.js` when unset.
    pub username: Option<String>,
}

/// Posts ready for rendering, most recent first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timeline {
    pub posts: Vec<Post>,
    pub stats: TimelineStats,
}

impl Timeline {
    /// Normalize `raw` posts, sort them newest first and apply `cutoff`.
    pub fn from_raw(
        raw: &[RawPost],
        media: &impl MediaLookup,
        username: &str,
        cutoff: Option<DateTime<Utc>>,
    ) -> Self {
        let mut stats = TimelineStats {
            loaded: raw.len(),
            ..TimelineStats::default()
        };

        let mut posts: Vec<Post> = raw
            .iter()
            .filter_map(|post| match normalize_post(post, media, username) {
                Ok(Some(post)) => Some(post),
                Ok(None) => {
                    stats.reposts += 1;
                    None
                }
                Err(e) => {
                    debug!("Dropping post: {e}");
                    if matches!(e, XstaticError::MissingVideo { .. }) {
                        stats.missing_media += 1;
                    } else {
                        stats.invalid += 1;
                    }
                    None
                }
            })
            .collect();

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(cutoff) = cutoff {
            let before = posts.len();
            posts.retain(|post| post.created_at >= cutoff);
            stats.before_cutoff = before - posts.len();
        }

        stats.kept = posts.len();
        Self { posts, stats }
    }

    /// Load and normalize the archive at `root`.
    ///
    /// # Errors
    ///
    /// Fails only when the archive itself cannot be read.
    pub fn load(root: &Path, cutoff: Option<DateTime<Utc>>) -> Result<Self> {
        Self::load_with_options(
            root,
            &TimelineOptions {
                cutoff,
                username: None,
            },
        )
    }

    /// Load with explicit [`TimelineOptions`].
    ///
    /// # Errors
    ///
    /// Fails only when the archive itself cannot be read.
    pub fn load_with_options(root: &Path, options: &TimelineOptions) -> Result<Self> {
        let guard = OperationGuard::new("load timeline");

        let result = (|| -> Result<Self> {
            let parser = ArchiveParser::open(root)?;
            let parsed = parser.parse_posts()?;

            let username = match &options.username {
                Some(name) => name.clone(),
                None => match parser.parse_account_username() {
                    Ok(Some(name)) => name,
                    Ok(None) => UNKNOWN_ACCOUNT.to_string(),
                    Err(e) => {
                        warn!("Ignoring account.js: {e}");
                        UNKNOWN_ACCOUNT.to_string()
                    }
                },
            };

            let media = MediaIndex::from_dir(&parser.media_dir());
            let mut timeline = Self::from_raw(&parsed.posts, &media, &username, options.cutoff);
            timeline.stats.malformed = parsed.malformed;
            timeline.stats.loaded += parsed.malformed;
            Ok(timeline)
        })();

        match &result {
            Ok(timeline) => {
                info!(
                    kept = timeline.stats.kept,
                    reposts = timeline.stats.reposts,
                    missing_media = timeline.stats.missing_media,
                    "Timeline ready"
                );
                guard.complete();
            }
            Err(e) => guard.fail(e),
        }
        result
    }
}
