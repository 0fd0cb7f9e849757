mod config;
mod timezone;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ical2rss_core::{Channel, FeedOptions, GuidMode};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "ical2rss")]
#[command(about = "Convert iCal to RSS feed: reads calendars from stdin, writes RSS 2.0 to stdout")]
struct Cli {
    /// Generate random GUIDs instead of content-based hashes
    #[arg(long)]
    rand_guid: bool,

    /// Title for the RSS channel [default: Termine]
    #[arg(long)]
    channel_title: Option<String>,

    /// Link for the RSS channel [default: https://example.com]
    #[arg(long)]
    channel_link: Option<String>,

    /// Description for the RSS channel [default: Terminkalender]
    #[arg(long)]
    channel_description: Option<String>,

    /// Timezone for times shown in item descriptions (e.g. "Europe/Berlin"),
    /// defaults to the system timezone
    #[arg(long)]
    timezone: Option<String>,

    /// Config file (defaults to ~/.config/ical2rss/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    init_logging(cli.verbose, settings.log_level.as_deref());

    let options = feed_options(&cli, &settings)?;

    let input = std::io::read_to_string(std::io::stdin()).context("Could not read standard input")?;
    let feed = ical2rss_core::convert(&input, &options)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{feed}").context("Could not write feed")?;

    Ok(())
}

/// Diagnostics go to stderr; stdout carries only the feed.
fn init_logging(verbose: bool, configured: Option<&str>) {
    let (fallback, rejected) = fallback_filter(verbose, configured);
    let filter = EnvFilter::try_from_default_env().unwrap_or(fallback);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Some(level) = rejected {
        tracing::warn!(log_level = %level, "Invalid log_level setting, using warn");
    }
}

/// Filter used when `RUST_LOG` is unset. An invalid configured directive
/// falls back to `warn` and is returned so it can be reported.
fn fallback_filter(verbose: bool, configured: Option<&str>) -> (EnvFilter, Option<String>) {
    match (verbose, configured) {
        (true, _) => (EnvFilter::new("debug"), None),
        (false, None) => (EnvFilter::new("warn"), None),
        (false, Some(directive)) => match EnvFilter::try_new(directive) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new("warn"), Some(directive.to_string())),
        },
    }
}

/// Command-line flags win over settings, settings over built-in defaults.
fn feed_options(cli: &Cli, settings: &Settings) -> Result<FeedOptions> {
    let defaults = Channel::default();

    let channel = Channel {
        title: pick(&cli.channel_title, &settings.channel_title).unwrap_or(defaults.title),
        link: pick(&cli.channel_link, &settings.channel_link).unwrap_or(defaults.link),
        description: pick(&cli.channel_description, &settings.channel_description)
            .unwrap_or(defaults.description),
    };

    let guid_mode = GuidMode::from_random_flag(cli.rand_guid || settings.rand_guid.unwrap_or(false));

    let timezone = pick(&cli.timezone, &settings.timezone);
    let display_tz = timezone::resolve_display_timezone(timezone.as_deref())?;

    Ok(FeedOptions {
        channel,
        guid_mode,
        display_tz,
    })
}

fn pick(flag: &Option<String>, setting: &Option<String>) -> Option<String> {
    flag.clone().or_else(|| setting.clone())
}
