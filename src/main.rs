//! Playlist Harvester main entry point
//!
//! This is the command-line interface for harvesting one YouTube playlist
//! into a Kafka topic.

use anyhow::Context;
use clap::Parser;
use playlist_harvester::config::{load_config_with_hash, Config};
use playlist_harvester::pipeline::{print_run_summary, run_harvest};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Playlist Harvester: YouTube playlist statistics to Kafka
///
/// Fetches every video in the configured playlist, extracts its title and
/// view/like/comment counts, and produces one Avro record per video to a
/// schema-governed topic.
#[derive(Parser, Debug)]
#[command(name = "playlist-harvester")]
#[command(version)]
#[command(about = "Harvest YouTube playlist statistics into Kafka", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without contacting any service
    #[arg(long, conflicts_with = "no_publish")]
    dry_run: bool,

    /// Fetch and log video summaries without producing records
    #[arg(long)]
    no_publish: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let summary = run_harvest(&config, !cli.no_publish)
        .await
        .context("harvest failed")?;

    if !cli.quiet {
        print_run_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG`, when set, replaces the verbosity-derived filter.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "playlist_harvester=info,warn",
            1 => "playlist_harvester=debug,info",
            2 => "playlist_harvester=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Playlist Harvester Dry Run ===\n");

    println!("Upstream:");
    println!("  Base URL: {}", config.youtube.base_url);
    println!("  Playlist: {}", config.youtube.playlist_id);
    println!("  Request timeout: {}s", config.youtube.request_timeout_secs);
    println!("  Connect timeout: {}s", config.youtube.connect_timeout_secs);
    match config.youtube.max_results {
        Some(n) => println!("  Page size: {}", n),
        None => println!("  Page size: server default"),
    }

    println!("\nSchema Registry:");
    println!("  URL: {}", config.schema_registry.url);
    println!("  Subject: {}", config.schema_registry.subject);
    println!(
        "  Basic auth: {}",
        if config.schema_registry.basic_auth().is_some() {
            "yes"
        } else {
            "no"
        }
    );

    println!("\nKafka:");
    println!("  Topic: {}", config.kafka.topic);
    println!("  Flush timeout: {}s", config.kafka.flush_timeout_secs);
    println!(
        "  Fail on delivery error: {}",
        config.kafka.fail_on_delivery_error
    );
    println!("  Client properties:");
    for (key, value) in config.kafka.masked_properties() {
        println!("    {} = {}", key, value);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest playlist {} into topic {}",
        config.youtube.playlist_id, config.kafka.topic
    );
}
