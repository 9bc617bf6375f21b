//! Rendering the timeline into `index.html`.
//!
//! Post text and media embeds are already HTML when they reach the
//! template; everything else is escaped by askama.

use askama::Template;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, XstaticError};
use crate::model::Post;

/// Name of the generated page inside the destination directory.
pub const INDEX_FILE: &str = "index.html";

/// Page-level rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub title: String,
    /// Media directory relative to the page.
    pub media_prefix: String,
    pub thumbnail_prefix: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RenderOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.site.title.clone(),
            media_prefix: config.media.dir_name.clone(),
            thumbnail_prefix: config.media.thumbnail_prefix.clone(),
        }
    }
}

/// One post as the template sees it.
pub struct PostView {
    pub id: String,
    pub reply: bool,
    pub text: String,
    pub media: Vec<String>,
    pub time: String,
    pub permalink: String,
}

impl PostView {
    fn new(post: &Post, options: &RenderOptions) -> Self {
        Self {
            id: post.id.clone(),
            reply: post.reply,
            text: post.text.clone(),
            media: post
                .media_items()
                .iter()
                .map(|m| m.embed(&options.media_prefix, &options.thumbnail_prefix))
                .collect(),
            time: post.display_time(),
            permalink: post.permalink.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub posts: Vec<PostView>,
}

/// Render `posts` in the given order as a complete HTML page.
///
/// # Errors
///
/// Returns [`XstaticError::RenderError`] if the template fails.
pub fn render_page(posts: &[Post], options: &RenderOptions) -> Result<String> {
    let template = IndexTemplate {
        title: options.title.clone(),
        posts: posts.iter().map(|p| PostView::new(p, options)).collect(),
    };
    Ok(template.render()?)
}

/// Write `html` to `<output_dir>/index.html`, creating the directory.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file cannot be written.
pub fn write_index(output_dir: &Path, html: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| XstaticError::path_error("create directory", output_dir, e))?;

    let target = output_dir.join(INDEX_FILE);
    info!("Writing to {}", target.display());
    std::fs::write(&target, html).map_err(|e| XstaticError::path_error("write", &target, e))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Media;
    use chrono::{TimeZone, Utc};

    fn post(id: &str, text: &str, media: Option<Vec<Media>>) -> Post {
        Post {
            id: id.to_string(),
            reply: text.starts_with('@'),
            text: text.to_string(),
            media,
            created_at: Utc.with_ymd_and_hms(2021, 6, 15, 10, 0, 0).unwrap(),
            permalink: format!("https://twitter.com/me/status/{id}"),
        }
    }

    #[test]
    fn renders_posts_in_given_order() {
        let posts = [post("2", "second", None), post("1", "first", None)];
        let html = render_page(&posts, &RenderOptions::default()).unwrap();

        let second = html.find("second").unwrap();
        let first = html.find("first").unwrap();
        assert!(second < first);
        assert!(html.contains("2021-06-15 10:00"));
        assert!(html.contains("https://twitter.com/me/status/1"));
    }

    #[test]
    fn post_text_is_not_escaped() {
        let posts = [post("1", "see <a href=\"https://x.test\">x.test</a><br/>ok", None)];
        let html = render_page(&posts, &RenderOptions::default()).unwrap();
        assert!(html.contains("<a href=\"https://x.test\">x.test</a><br/>ok"));
    }

    #[test]
    fn title_is_escaped() {
        let options = RenderOptions {
            title: "Me & <Co>".to_string(),
            ..RenderOptions::default()
        };
        let html = render_page(&[], &options).unwrap();
        assert!(html.contains("Co"));
        assert!(!html.contains("<Co>"));
        assert!(!html.contains("Me & "));
    }

    #[test]
    fn media_embeds_use_prefix() {
        let posts = [post(
            "1",
            "pic",
            Some(vec![
                Media::Image {
                    name: "1-a.jpg".to_string(),
                },
                Media::Video {
                    content_type: "video/mp4".to_string(),
                    name: "1-b.mp4".to_string(),
                    looping: false,
                },
            ]),
        )];
        let html = render_page(&posts, &RenderOptions::default()).unwrap();
        assert!(html.contains("<img src=\"media/thumb-1-a.jpg\""));
        assert!(html.contains("<source src=\"media/1-b.mp4\" type=\"video/mp4\"/>"));
    }

    #[test]
    fn replies_are_marked() {
        let html = render_page(&[post("1", "@you hi", None)], &RenderOptions::default()).unwrap();
        assert!(html.contains("class=\"post reply\""));
    }

    #[test]
    fn write_index_creates_destination() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("site");
        let target = write_index(&out, "<html></html>").unwrap();
        assert_eq!(target, out.join(INDEX_FILE));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "<html></html>");
    }
}
