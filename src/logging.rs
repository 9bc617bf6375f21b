//! Logging setup for xstatic.
//!
//! Uses the `tracing` ecosystem. Logs go to stderr so that `xstatic posts
//! --format json` can be piped.
//!
//! # Usage
//!
//! ```rust
//! use xstatic::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::for_cli(false, true, false));
//!
//! tracing::debug!("Archive opened");
//! ```

use std::time::Instant;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How much the CLI logs and how it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Enable ANSI colors in output.
    pub colors: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event, no timestamps.
    Compact,
    /// Multi-line events with timestamps and module targets.
    Pretty,
}

impl LogConfig {
    /// Pick a configuration from the global CLI flags. `quiet` wins over
    /// `verbose`.
    #[must_use]
    pub const fn for_cli(quiet: bool, verbose: bool, colors: bool) -> Self {
        let (level, format) = if quiet {
            (LogLevel::Error, LogFormat::Compact)
        } else if verbose {
            (LogLevel::Debug, LogFormat::Pretty)
        } else {
            (LogLevel::Info, LogFormat::Compact)
        };
        Self {
            level,
            format,
            colors,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        let level = match self.level {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        format!("xstatic={level}")
    }
}

/// Install the global subscriber. Subsequent calls are ignored.
pub fn init_logging(config: &LogConfig) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.filter_directive())
    };

    let compact = (config.format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_ansi(config.colors)
            .with_target(false)
            .without_time()
    });
    let pretty = (config.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_ansi(config.colors)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(compact)
        .with(pretty)
        .try_init()
        .ok();
}

/// Initialize logging from the global CLI flags.
pub fn init_cli_logging(quiet: bool, verbose: bool, colors: bool) {
    init_logging(&LogConfig::for_cli(quiet, verbose, colors));
}

/// Logs the start and end of a pipeline stage with its duration.
pub struct OperationGuard {
    name: &'static str,
    start: Instant,
}

impl OperationGuard {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        tracing::debug!(operation = name, "Starting");
        Self {
            name,
            start: Instant::now(),
        }
    }

    pub fn complete(self) {
        tracing::info!(
            operation = self.name,
            duration_ms = self.start.elapsed().as_millis(),
            "Finished"
        );
    }

    pub fn fail(self, error: &dyn std::error::Error) {
        tracing::error!(
            operation = self.name,
            duration_ms = self.start.elapsed().as_millis(),
            error = %error,
            "Failed"
        );
    }
}
