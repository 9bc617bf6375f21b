//! X archive data parser.
//!
//! Handles the JavaScript-wrapped JSON format used in X data exports.
//! Files are formatted as: `window.YTD.<datatype>.part0 = [...]`
//!
//! Modern exports keep their data files under `<root>/data/`; older ones put
//! `tweets.js` and `tweets_media/` directly in the root. Both layouts are
//! accepted.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, XstaticError};
use crate::model::{ArchiveEntry, RawPost};

/// Main posts file of an archive.
pub const TWEETS_FILE: &str = "tweets.js";

/// Media directory, a sibling of [`TWEETS_FILE`].
pub const MEDIA_DIR: &str = "tweets_media";

const ACCOUNT_FILE: &str = "account.js";

/// Posts loaded from an archive.
#[derive(Debug, Default)]
pub struct ParsedPosts {
    pub posts: Vec<RawPost>,
    /// Entries that could not be read as a post.
    pub malformed: usize,
}

/// Parser for X archive data
pub struct ArchiveParser {
    data_dir: PathBuf,
}

impl ArchiveParser {
    /// Open an archive rooted at `archive_path`.
    ///
    /// # Errors
    ///
    /// Fails if the path does not exist or holds no `tweets.js`.
    pub fn open(archive_path: impl AsRef<Path>) -> Result<Self> {
        let root = archive_path.as_ref();
        if !root.exists() {
            return Err(XstaticError::archive_not_found(root));
        }

        let data_dir = [root.join("data"), root.to_path_buf()]
            .into_iter()
            .find(|dir| dir.join(TWEETS_FILE).is_file())
            .ok_or_else(|| {
                XstaticError::invalid_archive(format!(
                    "no {TWEETS_FILE} in {} or its data/ directory",
                    root.display()
                ))
            })?;

        debug!("Archive data directory: {}", data_dir.display());
        Ok(Self { data_dir })
    }

    /// Directory holding `tweets.js`.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the post media files.
    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join(MEDIA_DIR)
    }

    /// Parse the JavaScript file format and extract JSON
    pub(crate) fn parse_js_file(content: &str, file: &str) -> Result<Value> {
        // Everything up to the first '=' is the `window.YTD...` assignment.
        let json_str = match content.find('=') {
            Some(pos) if !content[..pos].contains(['[', '{']) => &content[pos + 1..],
            _ => content,
        };

        serde_json::from_str(json_str.trim())
            .map_err(|e| XstaticError::parse_error(file, e.to_string()))
    }

    /// Read and parse a JS data file
    fn read_data_file(&self, filename: &str) -> Result<Value> {
        let path = self.data_dir.join(filename);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| XstaticError::path_error("read", &path, e))?;
        Self::parse_js_file(&content, filename)
    }

    /// Names of the post files in load order: `tweets.js`, then
    /// `tweets-part1.js`, `tweets-part2.js`, ...
    pub fn list_post_files(&self) -> Result<Vec<String>> {
        let mut parts: Vec<(u32, String)> = Vec::new();

        for entry in WalkDir::new(&self.data_dir).max_depth(1) {
            let entry = entry.map_err(|e| XstaticError::with_context("listing archive", e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if name == TWEETS_FILE {
                parts.push((0, name.to_string()));
            } else if let Some(n) = name
                .strip_prefix("tweets-part")
                .and_then(|rest| rest.strip_suffix(".js"))
                .and_then(|n| n.parse::<u32>().ok())
            {
                parts.push((n + 1, name.to_string()));
            }
        }

        parts.sort();
        Ok(parts.into_iter().map(|(_, name)| name).collect())
    }

    /// Parse every post from the archive's post files.
    ///
    /// Entries that are not valid post records are skipped and counted; a
    /// file that is not valid JSON fails the whole load.
    pub fn parse_posts(&self) -> Result<ParsedPosts> {
        let mut parsed = ParsedPosts::default();

        for file in self.list_post_files()? {
            info!("Parsing {file}...");
            let data = self.read_data_file(&file)?;
            let Value::Array(entries) = data else {
                return Err(XstaticError::parse_error(file, "expected a JSON array"));
            };

            for (position, entry) in entries.into_iter().enumerate() {
                match serde_json::from_value::<ArchiveEntry>(entry) {
                    Ok(entry) => parsed.posts.push(entry.tweet),
                    Err(e) => {
                        warn!("Skipping entry {position} of {file}: {e}");
                        parsed.malformed += 1;
                    }
                }
            }
        }

        info!(
            "Parsed {} posts ({} malformed)",
            parsed.posts.len(),
            parsed.malformed
        );
        Ok(parsed)
    }

    /// Username of the archive owner from `account.js`, if present.
    pub fn parse_account_username(&self) -> Result<Option<String>> {
        if !self.data_dir.join(ACCOUNT_FILE).is_file() {
            return Ok(None);
        }
        let data = self.read_data_file(ACCOUNT_FILE)?;

        Ok(data
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|item| item["account"]["username"].as_str())
            .map(String::from))
    }

    /// Parse X's date format: "Fri Jan 09 15:12:21 +0000 2026"
    #[must_use]
    pub fn parse_x_date(date_str: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_str(date_str, "%a %b %d %H:%M:%S %z %Y")
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Parse ISO 8601 date format
    #[must_use]
    pub fn parse_iso_date(date_str: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(date_str)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Parse a post timestamp in either format.
    #[must_use]
    pub fn parse_post_date(date_str: &str) -> Option<DateTime<Utc>> {
        Self::parse_x_date(date_str).or_else(|| Self::parse_iso_date(date_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use tempfile::TempDir;

    #[test]
    fn test_parse_x_date() {
        let date = ArchiveParser::parse_x_date("Fri Jan 09 15:12:21 +0000 2026");
        assert!(date.is_some());
        let dt = date.unwrap();
        assert_eq!(dt.year(), 2026);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 9);
    }

    #[test]
    fn test_parse_post_date_falls_back_to_iso() {
        assert!(ArchiveParser::parse_post_date("2025-11-06T23:32:43.358Z").is_some());
        assert!(ArchiveParser::parse_post_date("yesterday-ish").is_none());
    }

    #[test]
    fn test_parse_js_file_strips_assignment() {
        let value =
            ArchiveParser::parse_js_file("window.YTD.tweets.part0 = [1, 2]", "tweets.js").unwrap();
        assert_eq!(value, serde_json::json!([1, 2]));

        let bare = ArchiveParser::parse_js_file("[{\"a\": \"x=y\"}]", "tweets.js").unwrap();
        assert_eq!(bare[0]["a"], "x=y");
    }

    #[test]
    fn test_parse_js_file_rejects_bad_json() {
        let err = ArchiveParser::parse_js_file("window.YTD.tweets.part0 = [{", "tweets.js")
            .unwrap_err();
        assert!(matches!(err, XstaticError::ParseError { .. }));
    }

    #[test]
    fn test_open_prefers_data_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data").join(TWEETS_FILE), "x = []").unwrap();

        let parser = ArchiveParser::open(dir.path()).unwrap();
        assert_eq!(parser.data_dir(), dir.path().join("data"));
        assert_eq!(parser.media_dir(), dir.path().join("data").join(MEDIA_DIR));
    }

    #[test]
    fn test_open_accepts_flat_layout() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TWEETS_FILE), "x = []").unwrap();

        let parser = ArchiveParser::open(dir.path()).unwrap();
        assert_eq!(parser.data_dir(), dir.path());
    }

    #[test]
    fn test_open_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ArchiveParser::open(dir.path().join("missing")),
            Err(XstaticError::ArchiveNotFound { .. })
        ));
        assert!(matches!(
            ArchiveParser::open(dir.path()),
            Err(XstaticError::InvalidArchive { .. })
        ));
    }

    #[test]
    fn test_split_files_load_in_part_order() {
        let dir = TempDir::new().unwrap();
        let post = |id: &str| {
            format!(
                r#"{{"tweet": {{"id_str": "{id}", "full_text": "t", "created_at": "Wed Jan 08 12:00:00 +0000 2025"}}}}"#
            )
        };
        std::fs::write(
            dir.path().join("tweets.js"),
            format!("window.YTD.tweets.part0 = [{}]", post("1")),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("tweets-part10.js"),
            format!("window.YTD.tweets.part10 = [{}]", post("11")),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("tweets-part2.js"),
            format!("window.YTD.tweets.part2 = [{}]", post("3")),
        )
        .unwrap();
        std::fs::write(dir.path().join("like.js"), "window.YTD.like.part0 = []").unwrap();

        let parser = ArchiveParser::open(dir.path()).unwrap();
        assert_eq!(
            parser.list_post_files().unwrap(),
            vec!["tweets.js", "tweets-part2.js", "tweets-part10.js"]
        );

        let parsed = parser.parse_posts().unwrap();
        let ids: Vec<_> = parsed.posts.iter().filter_map(RawPost::identifier).collect();
        assert_eq!(ids, vec!["1", "3", "11"]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tweets.js"),
            r#"window.YTD.tweets.part0 = [
                {"tweet": {"id_str": "1", "full_text": "ok", "created_at": "Wed Jan 08 12:00:00 +0000 2025"}},
                {"tweet": {"id_str": "2", "created_at": "Wed Jan 08 12:00:00 +0000 2025"}},
                {"tweet": {"id_str": "3", "full_text": "bad", "created_at": "x",
                           "entities": {"hashtags": [{"indices": ["5"], "text": "t"}]}}}
            ]"#,
        )
        .unwrap();

        let parsed = ArchiveParser::open(dir.path()).unwrap().parse_posts().unwrap();
        assert_eq!(parsed.posts.len(), 1);
        assert_eq!(parsed.malformed, 2);
    }

    #[test]
    fn test_account_username() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tweets.js"), "window.YTD.tweets.part0 = []").unwrap();
        let parser = ArchiveParser::open(dir.path()).unwrap();
        assert_eq!(parser.parse_account_username().unwrap(), None);

        std::fs::write(
            dir.path().join("account.js"),
            r#"window.YTD.account.part0 = [{"account": {"username": "someone", "accountId": "1"}}]"#,
        )
        .unwrap();
        assert_eq!(
            parser.parse_account_username().unwrap(),
            Some("someone".to_string())
        );
    }
}
