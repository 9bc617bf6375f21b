//! xstatic - X archive to static HTML CLI
//!
//! Main entry point for the xstatic command-line tool.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use xstatic::config::Config;
use xstatic::date_parser::parse_cutoff;
use xstatic::logging::init_cli_logging;
use xstatic::*;

fn main() {
    let cli = Cli::parse();

    let mut config = Config::load();
    if cli.quiet {
        config.output.quiet = true;
    }
    if !config.output.colors {
        colored::control::set_override(false);
    }
    init_cli_logging(config.output.quiet, cli.verbose, config.output.colors);

    let result = match &cli.command {
        Commands::Build(args) => cmd_build(&cli, config, args),
        Commands::Posts(args) => cmd_posts(&cli, config, args),
        Commands::Config(args) => cmd_config(&config, args),
        Commands::Completions(args) => cmd_completions(args.clone()),
    };

    if let Err(err) = result {
        let title = cli.command.failure_title();
        match err.downcast_ref::<XstaticError>() {
            Some(xerr) => eprintln!("{}", format_xstatic_error(title, xerr)),
            None => eprintln!("{}", format_error(title, &format!("{err:#}"), &[])),
        }
        std::process::exit(1);
    }
}

fn resolve_cutoff(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let cutoff = parse_cutoff(value)?;
    debug!("Cutoff resolved to {}", cutoff.to_rfc3339());
    Ok(Some(cutoff))
}

/// Machine-readable summary of a build.
#[derive(Serialize)]
struct BuildReport {
    index: PathBuf,
    cutoff: Option<DateTime<Utc>>,
    posts: TimelineStats,
    media: Option<ConversionStats>,
}

fn cmd_build(cli: &Cli, mut config: Config, args: &cli::BuildArgs) -> Result<()> {
    if let Some(title) = &args.title {
        config.site.title.clone_from(title);
    }
    if args.username.is_some() {
        config.site.username.clone_from(&args.username);
    }

    let cutoff = resolve_cutoff(args.cutoff.as_deref())?;
    let timeline = Timeline::load_with_options(
        &args.root,
        &TimelineOptions {
            cutoff,
            username: config.site.username.clone(),
        },
    )?;

    let html = render_page(&timeline.posts, &RenderOptions::from_config(&config))?;
    let index = write_index(&args.destination, &html)?;

    let media = if args.media {
        let source = ArchiveParser::open(&args.root)?.media_dir();
        Some(convert_media(
            &source,
            &args.destination,
            &ConvertOptions::from_config(&config),
        )?)
    } else {
        None
    };

    let report = BuildReport {
        index,
        cutoff,
        posts: timeline.stats,
        media,
    };

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Compact => println!(
            "{} posts -> {}",
            report.posts.kept,
            report.index.display()
        ),
        OutputFormat::Text => {
            if !config.output.quiet {
                print_build_report(&report);
            }
        }
    }

    Ok(())
}

fn print_build_report(report: &BuildReport) {
    let stats = &report.posts;
    println!(
        "  {} {} posts rendered to {}",
        "✓".green(),
        format_number_usize(stats.kept).cyan(),
        report.index.display()
    );

    let skipped = [
        (stats.reposts, "reposts"),
        (stats.before_cutoff, "before cutoff"),
        (stats.missing_media, "missing video files"),
        (stats.invalid, "unusable entities or dates"),
        (stats.malformed, "malformed entries"),
    ];
    for (count, label) in skipped {
        if count > 0 {
            println!(
                "  {} {} skipped: {}",
                "•".dimmed(),
                format_number_usize(count),
                label
            );
        }
    }

    if let Some(media) = &report.media {
        println!(
            "  {} {} media files copied, {} thumbnails",
            "✓".green(),
            format_number_usize(media.copied).cyan(),
            format_number_usize(media.thumbnails())
        );
        if media.thumbnail_failures > 0 {
            println!(
                "  {} {} thumbnails could not be generated",
                "!".yellow(),
                media.thumbnail_failures
            );
        }
    }
}

fn cmd_posts(cli: &Cli, config: Config, args: &cli::PostsArgs) -> Result<()> {
    let cutoff = resolve_cutoff(args.cutoff.as_deref())?;
    let timeline = Timeline::load_with_options(
        &args.root,
        &TimelineOptions {
            cutoff,
            username: args.username.clone().or(config.site.username),
        },
    )?;

    let limit = args.limit.unwrap_or(usize::MAX);
    let posts: Vec<&Post> = timeline.posts.iter().take(limit).collect();

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&posts)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&posts)?),
        OutputFormat::Compact => {
            for post in &posts {
                println!(
                    "{} | {} | {}",
                    post.id,
                    post.display_time(),
                    truncate(&post.text, 100)
                );
            }
        }
        OutputFormat::Text => {
            if posts.is_empty() {
                println!("{}", "No posts found.".yellow());
                return Ok(());
            }
            println!(
                "{} of {} posts:\n",
                format_number_usize(posts.len()).cyan(),
                format_number_usize(timeline.stats.kept)
            );
            for post in &posts {
                print_post(post);
            }
        }
    }

    Ok(())
}

fn print_post(post: &Post) {
    let badge = if post.reply {
        "REPLY".on_magenta()
    } else {
        "POST".on_blue()
    };
    println!(
        "{} {} {}",
        badge,
        post.id.dimmed(),
        post.display_time().dimmed()
    );
    println!("   {}", truncate(&post.text, 200));
    let media = post.media_items();
    if !media.is_empty() {
        let names: Vec<&str> = media.iter().map(Media::name).collect();
        println!("   {} {}", "media:".dimmed(), names.join(", "));
    }
    println!("   {}", post.permalink.dimmed());
    println!("{}", "─".repeat(CONTENT_DIVIDER_WIDTH).dimmed());
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        // Find a valid UTF-8 char boundary to avoid panic on multi-byte chars
        let mut end = max_len.saturating_sub(3);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

fn cmd_config(config: &Config, args: &cli::ConfigArgs) -> Result<()> {
    if args.init {
        let path = Config::user_config_path().context("could not determine config directory")?;
        if path.exists() && !args.force {
            anyhow::bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }
        Config::default().save_to(&path)?;
        println!("  {} Wrote {}", "✓".green(), path.display());
        return Ok(());
    }

    if args.show {
        println!("{}", "Current Configuration".bold().cyan());
        println!();
        print!("{}", toml::to_string_pretty(config)?);
        return Ok(());
    }

    match Config::user_config_path() {
        Some(path) if path.exists() => println!("  File: {}", path.display()),
        Some(path) => println!("  File: {} {}", path.display(), "(not present)".dimmed()),
        None => println!("  File: {}", "(no config directory)".dimmed()),
    }
    println!(
        "  {} use --show to print the effective settings or --init to write defaults",
        "hint:".dimmed()
    );
    Ok(())
}

fn cmd_completions(args: cli::CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "xstatic", &mut io::stdout());
    Ok(())
}
