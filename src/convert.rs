//! Copying archive media next to the page and generating thumbnails.
//!
//! Every file in the media directory is copied verbatim. Images also get a
//! thumbnail that fits in a square of the configured size; images already
//! small enough are copied instead of upscaled. Thumbnail failures are
//! logged and skipped, copy failures abort the run.

use image::GenericImageView;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, XstaticError};

/// Extensions that get a thumbnail.
pub const THUMBNAIL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Media conversion settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Directory under the destination that receives the files.
    pub dir_name: String,
    /// Longest thumbnail edge in pixels.
    pub thumbnail_size: u32,
    pub thumbnail_prefix: String,
    pub show_progress: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            dir_name: config.media.dir_name.clone(),
            thumbnail_size: config.media.thumbnail_size,
            thumbnail_prefix: config.media.thumbnail_prefix.clone(),
            show_progress: !config.output.quiet,
        }
    }
}

/// What a conversion run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub copied: usize,
    /// Thumbnails written by resizing.
    pub resized: usize,
    /// Images small enough to be copied as their own thumbnail.
    pub small_copies: usize,
    pub thumbnail_failures: usize,
}

impl ConversionStats {
    /// Total thumbnails present after the run.
    #[must_use]
    pub const fn thumbnails(&self) -> usize {
        self.resized + self.small_copies
    }
}

enum Thumbnail {
    None,
    Resized,
    Copied,
    Failed,
}

/// Whether `path` has an extension that gets a thumbnail.
#[must_use]
pub fn wants_thumbnail(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            THUMBNAIL_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Copy every file of `source` into `<output_dir>/<dir_name>` and write
/// thumbnails for images.
///
/// A missing `source` directory is not an error; there is simply nothing
/// to copy.
///
/// # Errors
///
/// Fails if the media directory cannot be created or any file cannot be
/// copied.
pub fn convert_media(
    source: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<ConversionStats> {
    let target_dir = output_dir.join(&options.dir_name);
    std::fs::create_dir_all(&target_dir)
        .map_err(|e| XstaticError::path_error("create directory", &target_dir, e))?;

    let files = list_files(source)?;
    info!(
        "Copying {} media files to {}",
        files.len(),
        target_dir.display()
    );

    let pb = if options.show_progress {
        ProgressBar::new(files.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("Converting media...");

    let outcomes: Vec<Result<Thumbnail>> = files
        .par_iter()
        .map(|file| {
            let outcome = convert_file(file, &target_dir, options);
            pb.inc(1);
            outcome
        })
        .collect();
    pb.finish_and_clear();

    let mut stats = ConversionStats::default();
    for outcome in outcomes {
        match outcome? {
            Thumbnail::None => {}
            Thumbnail::Resized => stats.resized += 1,
            Thumbnail::Copied => stats.small_copies += 1,
            Thumbnail::Failed => stats.thumbnail_failures += 1,
        }
        stats.copied += 1;
    }

    info!(
        copied = stats.copied,
        thumbnails = stats.thumbnails(),
        failures = stats.thumbnail_failures,
        "Media conversion finished"
    );
    Ok(stats)
}

fn list_files(source: &Path) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        warn!("Media directory not found: {}", source.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| XstaticError::with_context("listing media", e))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn convert_file(file: &Path, target_dir: &Path, options: &ConvertOptions) -> Result<Thumbnail> {
    let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
        return Err(XstaticError::invalid_archive(format!(
            "media file name is not UTF-8: {}",
            file.display()
        )));
    };

    let copy = target_dir.join(name);
    std::fs::copy(file, &copy).map_err(|e| XstaticError::path_error("copy", file, e))?;

    if !wants_thumbnail(file) {
        return Ok(Thumbnail::None);
    }

    let thumb = target_dir.join(format!("{}{name}", options.thumbnail_prefix));
    match write_thumbnail(file, &thumb, options.thumbnail_size) {
        Ok(resized) => {
            debug!(
                "Thumbnail {} ({})",
                thumb.display(),
                if resized { "resized" } else { "copied" }
            );
            Ok(if resized {
                Thumbnail::Resized
            } else {
                Thumbnail::Copied
            })
        }
        Err(e) => {
            warn!("Skipping thumbnail for {}: {e}", file.display());
            Ok(Thumbnail::Failed)
        }
    }
}

/// Write a thumbnail of `source` to `target` fitting in `size`x`size`.
///
/// Returns `true` if the image was resized, `false` if it was already small
/// enough and copied unchanged.
///
/// # Errors
///
/// Fails if the image cannot be decoded or the thumbnail cannot be written.
pub fn write_thumbnail(source: &Path, target: &Path, size: u32) -> Result<bool> {
    let img = image::open(source)?;
    let (width, height) = img.dimensions();

    if width <= size && height <= size {
        std::fs::copy(source, target).map_err(|e| XstaticError::path_error("copy", source, e))?;
        return Ok(false);
    }

    img.thumbnail(size, size).save(target)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        img.save(path).unwrap();
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            thumbnail_size: 30,
            show_progress: false,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn thumbnail_extensions() {
        assert!(wants_thumbnail(Path::new("1-a.jpg")));
        assert!(wants_thumbnail(Path::new("1-a.JPEG")));
        assert!(wants_thumbnail(Path::new("1-a.gif")));
        assert!(!wants_thumbnail(Path::new("1-a.mp4")));
        assert!(!wants_thumbnail(Path::new("noext")));
    }

    #[test]
    fn large_image_is_shrunk_to_fit() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("big.png");
        let target = dir.path().join("thumb-big.png");
        write_png(&source, 120, 60);

        assert!(write_thumbnail(&source, &target, 30).unwrap());
        let thumb = image::open(&target).unwrap();
        assert_eq!(thumb.dimensions(), (30, 15));
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("small.png");
        let target = dir.path().join("thumb-small.png");
        write_png(&source, 10, 20);

        assert!(!write_thumbnail(&source, &target, 30).unwrap());
        assert_eq!(
            std::fs::read(&source).unwrap(),
            std::fs::read(&target).unwrap()
        );
    }

    #[test]
    fn converts_directory() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("tweets_media");
        std::fs::create_dir(&source).unwrap();
        write_png(&source.join("1-big.png"), 90, 90);
        write_png(&source.join("2-small.png"), 8, 8);
        std::fs::write(source.join("3-clip.mp4"), b"not really a video").unwrap();
        std::fs::write(source.join("4-broken.jpg"), b"not really a jpeg").unwrap();

        let out = dir.path().join("site");
        let stats = convert_media(&source, &out, &options()).unwrap();

        assert_eq!(stats.copied, 4);
        assert_eq!(stats.resized, 1);
        assert_eq!(stats.small_copies, 1);
        assert_eq!(stats.thumbnail_failures, 1);

        let media = out.join("media");
        assert!(media.join("3-clip.mp4").is_file());
        assert!(media.join("thumb-1-big.png").is_file());
        assert!(media.join("thumb-2-small.png").is_file());
        assert!(!media.join("thumb-3-clip.mp4").exists());
        assert!(!media.join("thumb-4-broken.jpg").exists());
    }

    #[test]
    fn missing_source_creates_empty_media_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("site");
        let stats = convert_media(&dir.path().join("absent"), &out, &options()).unwrap();
        assert_eq!(stats, ConversionStats::default());
        assert!(out.join("media").is_dir());
    }
}
