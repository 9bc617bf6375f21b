//! Configuration system for xstatic.
//!
//! Provides layered configuration from multiple sources:
//!
//! 1. **Compiled defaults** - Sensible defaults built into the binary
//! 2. **User config file** - `~/.config/xstatic/config.toml`
//! 3. **Environment variables** - `XSTATIC_*` prefix
//! 4. **CLI arguments** - Highest priority, always wins
//!
//! # Example Configuration File
//!
//! ```toml
//! [site]
//! title = "Posts"
//! username = "someone"
//!
//! [media]
//! dir_name = "media"
//! thumbnail_size = 300
//! thumbnail_prefix = "thumb-"
//!
//! [output]
//! colors = true
//! quiet = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Result, XstaticError};

/// Main configuration structure for xstatic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page-level settings.
    pub site: SiteConfig,
    /// Media copying and thumbnailing.
    pub media: MediaConfig,
    /// Output formatting configuration.
    pub output: OutputConfig,
}

/// Page-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Title of the generated page.
    /// Environment variable: `XSTATIC_TITLE`
    pub title: String,

    /// Account name used in permalinks, overriding `account.js`.
    /// Environment variable: `XSTATIC_USERNAME`
    pub username: Option<String>,
}

/// Media copying and thumbnailing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory under the destination that receives media files.
    pub dir_name: String,

    /// Longest thumbnail edge in pixels.
    /// Environment variable: `XSTATIC_THUMBNAIL_SIZE`
    pub thumbnail_size: u32,

    /// Filename prefix of generated thumbnails.
    pub thumbnail_prefix: String,
}

/// Output formatting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored output.
    pub colors: bool,

    /// Suppress non-essential output (progress bars, etc.).
    pub quiet: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Posts".to_string(),
            username: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir_name: "media".to_string(),
            thumbnail_size: 300,
            thumbnail_prefix: "thumb-".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            colors: true,
            quiet: false,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. User config file (~/.config/xstatic/config.toml)
    /// 3. Compiled defaults
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        config.apply_env_overrides();

        debug!("Configuration loaded: {:?}", config);
        config
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`XstaticError::ConfigError`] if the file exists but cannot
    /// be read or parsed. A missing file is `Ok(None)`.
    pub fn load_from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!("Config file not found: {}", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| XstaticError::ConfigError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = toml::from_str(&content).map_err(|e| XstaticError::ConfigError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Loaded config from: {}", path.display());
        Ok(Some(config))
    }

    /// Load the user configuration file from the standard location.
    fn load_user_config() -> Option<Self> {
        let config_path = Self::user_config_path()?;
        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {e}");
                None
            }
        }
    }

    /// Get the path to the user configuration file.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("xstatic").join("config.toml"))
    }

    /// Apply overrides from the process environment.
    fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(title) = lookup("XSTATIC_TITLE") {
            self.site.title = title;
        }
        if let Some(username) = lookup("XSTATIC_USERNAME").filter(|name| !name.is_empty()) {
            self.site.username = Some(username);
        }

        if let Some(size) = lookup("XSTATIC_THUMBNAIL_SIZE") {
            match size.parse::<u32>() {
                Ok(n) if n > 0 => self.media.thumbnail_size = n,
                _ => warn!("Ignoring XSTATIC_THUMBNAIL_SIZE={size}: expected a positive integer"),
            }
        }

        if lookup("XSTATIC_NO_COLOR").is_some() || lookup("NO_COLOR").is_some() {
            self.output.colors = false;
        }
        if lookup("XSTATIC_QUIET").is_some() {
            self.output.quiet = true;
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Self) {
        // Site
        self.site.title = other.site.title;
        if other.site.username.is_some() {
            self.site.username = other.site.username;
        }

        // Media
        if !other.media.dir_name.is_empty() {
            self.media.dir_name = other.media.dir_name;
        }
        if other.media.thumbnail_size > 0 {
            self.media.thumbnail_size = other.media.thumbnail_size;
        }
        self.media.thumbnail_prefix = other.media.thumbnail_prefix;

        // Output
        self.output.colors = other.output.colors;
        self.output.quiet = other.output.quiet;
    }

    /// Write the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| XstaticError::path_error("create directory", parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| XstaticError::ConfigError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, content).map_err(|e| XstaticError::path_error("write", path, e))?;
        info!("Saved config to: {}", path.display());
        Ok(())
    }
}
