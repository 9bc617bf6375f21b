//! CLI definitions for xstatic.
//!
//! Uses clap for argument parsing with derive macros.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// xstatic - Turn an X/Twitter archive into a static page
#[derive(Parser, Debug)]
#[command(name = "xstatic")]
#[command(version)]
#[command(about = "Turn an X/Twitter data archive into a static HTML page")]
#[command(long_about = r#"
xstatic reads the tweets.js export of an X/Twitter data archive and writes a
single index.html listing your posts, newest first, with links, mentions,
hashtags, images and videos rendered inline.

Quick start:
  1. Download your archive from x.com/settings and unzip it
  2. Run: xstatic build /path/to/archive ./site --media
  3. Open ./site/index.html
"#)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Be verbose (show debug info)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Be quiet (suppress non-error output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render an archive into <destination>/index.html
    Build(BuildArgs),

    /// List the posts that would be rendered
    Posts(PostsArgs),

    /// Show or manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// Heading used when the command exits with an error.
    #[must_use]
    pub const fn failure_title(&self) -> &'static str {
        match self {
            Self::Build(_) => "Build failed",
            Self::Posts(_) => "Posts failed",
            Self::Config(_) => "Config failed",
            Self::Completions(_) => "Completions failed",
        }
    }
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Archive root (the directory holding data/tweets.js or tweets.js)
    pub root: PathBuf,

    /// Directory to write index.html into
    pub destination: PathBuf,

    /// Leave out posts older than this date (YYYY-MM-DD, "last year", ...)
    #[arg(long, short = 'c')]
    pub cutoff: Option<String>,

    /// Copy media files and generate thumbnails
    #[arg(long, short = 'm')]
    pub media: bool,

    /// Page title
    #[arg(long, env = "XSTATIC_TITLE")]
    pub title: Option<String>,

    /// Account name for permalinks (defaults to the one in account.js)
    #[arg(long, env = "XSTATIC_USERNAME")]
    pub username: Option<String>,
}

#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Archive root (the directory holding data/tweets.js or tweets.js)
    pub root: PathBuf,

    /// Leave out posts older than this date
    #[arg(long, short = 'c')]
    pub cutoff: Option<String>,

    /// Account name for permalinks
    #[arg(long, env = "XSTATIC_USERNAME")]
    pub username: Option<String>,

    /// Maximum number of posts to list
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Write a default configuration file
    #[arg(long, conflicts_with = "show")]
    pub init: bool,

    /// Overwrite an existing file with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
    Compact,
}
