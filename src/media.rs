//! Resolving attached media to files in the archive's media directory.
//!
//! Files in `tweets_media/` are named `<post_id>-<fragment>`, where the
//! fragment is the last path segment of the media URL. Images are always
//! present. Videos come with several encoding variants of which the archive
//! keeps exactly one, so each variant is probed against the directory
//! listing and the first one found wins.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, XstaticError};
use crate::model::{ExtendedMedia, Media, MediaKind};

/// Membership test over media filenames.
pub trait MediaLookup {
    fn contains(&self, name: &str) -> bool;
}

/// The media directory read once into a set of filenames.
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
    names: HashSet<String>,
}

impl MediaIndex {
    /// List the files directly inside `dir`.
    ///
    /// A missing or unreadable directory gives an empty index: image posts
    /// still render, and video posts are dropped.
    pub fn from_dir(dir: &Path) -> Self {
        if !dir.is_dir() {
            warn!("Media directory not found: {}", dir.display());
            return Self::default();
        }

        let names: HashSet<String> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable media entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(String::from))
            .collect();

        debug!("Indexed {} media files in {}", names.len(), dir.display());
        Self { names }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MediaIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl MediaLookup for MediaIndex {
    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl MediaLookup for HashSet<String> {
    fn contains(&self, name: &str) -> bool {
        HashSet::contains(self, name)
    }
}

/// Last path segment of `url` with any query string removed.
#[must_use]
pub fn url_fragment(url: &str) -> &str {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.split(['?', '#']).next().unwrap_or(last)
}

/// Filename a media item of `post_id` is stored under.
#[must_use]
pub fn qualified_name(post_id: &str, url: &str) -> String {
    format!("{post_id}-{}", url_fragment(url))
}

/// Resolve every media item of a post.
///
/// # Errors
///
/// Fails with [`XstaticError::MissingVideo`] if any video has no variant on
/// disk, and with [`XstaticError::InvalidEntity`] for a photo without a URL.
/// Either way the whole post is unusable.
pub fn resolve_media(
    post_id: &str,
    media: &[ExtendedMedia],
    lookup: &impl MediaLookup,
) -> Result<Vec<Media>> {
    media
        .iter()
        .map(|item| {
            if item.kind.has_variants() {
                find_video(post_id, item, lookup)
            } else {
                resolve_image(post_id, item)
            }
        })
        .collect()
}

fn resolve_image(post_id: &str, item: &ExtendedMedia) -> Result<Media> {
    let url = item
        .url()
        .ok_or_else(|| XstaticError::invalid_entity(post_id, "photo without a media URL"))?;
    Ok(Media::Image {
        name: qualified_name(post_id, url),
    })
}

fn find_video(post_id: &str, item: &ExtendedMedia, lookup: &impl MediaLookup) -> Result<Media> {
    let variants = item.variants();
    for variant in variants {
        let name = qualified_name(post_id, &variant.url);
        if lookup.contains(&name) {
            debug!(post_id, name = %name, "Matched video variant");
            return Ok(Media::Video {
                content_type: variant.content_type.clone(),
                name,
                looping: item.kind == MediaKind::AnimatedGif,
            });
        }
    }

    Err(XstaticError::MissingVideo {
        post_id: post_id.to_string(),
        candidates: variants.len(),
    })
}
