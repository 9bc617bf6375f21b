//! Custom error types for xstatic.
//!
//! Run-level failures (archive missing, unreadable JSON, output not
//! writable) propagate to the caller. Per-post failures use the same type
//! but are swallowed by the timeline and only counted.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for xstatic operations.
#[derive(Error, Debug)]
pub enum XstaticError {
    // =========================================================================
    // Archive Errors
    // =========================================================================
    /// Archive directory not found at the specified path.
    #[error("Archive not found at '{path}'")]
    ArchiveNotFound { path: PathBuf },

    /// Archive exists but is missing the expected structure.
    #[error("Invalid archive structure: {reason}")]
    InvalidArchive { reason: String },

    /// Failed to parse an archive data file.
    #[error("Failed to parse '{file}': {reason}")]
    ParseError { file: String, reason: String },

    // =========================================================================
    // Per-Post Errors
    // =========================================================================
    /// Entity data that cannot be applied to the post text.
    #[error("Invalid entity in post {post_id}: {reason}")]
    InvalidEntity { post_id: String, reason: String },

    /// Invalid date format in archive data or on the command line.
    #[error("Invalid date format '{value}' in {context}")]
    InvalidDate { value: String, context: String },

    /// None of a video's variants exists in the media directory.
    #[error("No file for any of {candidates} video variant(s) of post {post_id}")]
    MissingVideo { post_id: String, candidates: usize },

    // =========================================================================
    // IO Errors
    // =========================================================================
    /// File read/write error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Path-specific IO error with context.
    #[error("Failed to {operation} '{path}': {source}")]
    PathError {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Output Errors
    // =========================================================================
    /// Template rendering failed.
    #[error("Render error: {0}")]
    RenderError(#[from] askama::Error),

    /// Thumbnail decoding or encoding failed.
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    // =========================================================================
    // Configuration / CLI Errors
    // =========================================================================
    /// Configuration file parsing error.
    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigError { path: PathBuf, reason: String },

    /// Invalid command-line argument.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Catch-all for other errors with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for xstatic operations.
pub type Result<T> = std::result::Result<T, XstaticError>;

impl XstaticError {
    /// Create an archive not found error.
    pub fn archive_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ArchiveNotFound { path: path.into() }
    }

    /// Create an invalid archive error.
    pub fn invalid_archive(reason: impl Into<String>) -> Self {
        Self::InvalidArchive {
            reason: reason.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid entity error.
    pub fn invalid_entity(post_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            post_id: post_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid date error.
    pub fn invalid_date(value: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
            context: context.into(),
        }
    }

    /// Create a path error with context.
    pub fn path_error(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::PathError {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Wrap an error with additional context.
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Get a suggestion for how to fix this error, if applicable.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ArchiveNotFound { .. } => {
                Some("Verify the archive path and ensure the X data export is extracted.")
            }
            Self::InvalidArchive { .. } => {
                Some("Point xstatic at the archive root, the directory holding data/tweets.js.")
            }
            Self::ConfigError { .. } => {
                Some("Run 'xstatic config --init' to write a fresh default configuration.")
            }
            Self::InvalidDate { .. } => {
                Some("Use YYYY-MM-DD, an RFC 3339 timestamp, or a phrase like 'last year'.")
            }
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with additional context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with additional context.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| XstaticError::with_context(context, e))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| XstaticError::with_context(f(), e))
    }
}

// =============================================================================
// CLI Error Formatting
// =============================================================================

use colored::Colorize;

/// Format a structured CLI error with explanation and suggestions.
///
/// # Arguments
/// * `title` - Brief error title (e.g., "Build failed")
/// * `explanation` - What went wrong and why
/// * `suggestions` - List of actionable suggestions
#[must_use]
pub fn format_error(title: &str, explanation: &str, suggestions: &[&str]) -> String {
    use std::fmt::Write;

    let mut output = format!("{} {}", "✗".red().bold(), title.bold());

    if !explanation.is_empty() {
        let _ = write!(output, "\n\n   {explanation}");
    }

    if !suggestions.is_empty() {
        output.push_str("\n\n   ");
        if suggestions.len() == 1 {
            let _ = write!(output, "{} {}", "Hint:".cyan(), suggestions[0]);
        } else {
            let _ = write!(output, "{}:", "Try".cyan());
            for suggestion in suggestions {
                let _ = write!(output, "\n     {} {}", "•".dimmed(), suggestion);
            }
        }
    }

    output
}

/// Format an [`XstaticError`] for the terminal under `title`, attaching
/// its suggestion.
#[must_use]
pub fn format_xstatic_error(title: &str, err: &XstaticError) -> String {
    let explanation = err.to_string();
    match err.suggestion() {
        Some(hint) => format_error(title, &explanation, &[hint]),
        None => format_error(title, &explanation, &[]),
    }
}
