//! Harvest pipeline
//!
//! This module contains the run orchestration, including:
//! - The playlist/video join loop
//! - Run state tracking
//! - The end-of-run summary

mod driver;
mod state;
mod stats;

pub use driver::Harvester;
pub use state::PipelineState;
pub use stats::{print_run_summary, RunSummary};

use crate::config::Config;
use crate::publish::Publisher;
use crate::youtube::YouTubeClient;
use crate::Result;

/// Runs a complete harvest of the configured playlist
///
/// When `publish` is false no schema is fetched and no producer is created;
/// every video is still fetched, normalized, and logged.
///
/// # Arguments
///
/// * `config` - Validated harvester configuration
/// * `publish` - Whether to send records to the stream
pub async fn run_harvest(config: &Config, publish: bool) -> Result<RunSummary> {
    let client = YouTubeClient::new(&config.youtube)?;

    let publisher = if publish {
        Some(Publisher::connect(config).await?)
    } else {
        tracing::info!("Publishing disabled; summaries will only be logged");
        None
    };

    let mut harvester = Harvester::new(client, config.youtube.playlist_id.clone(), publisher)
        .fail_on_delivery_error(config.kafka.fail_on_delivery_error);

    harvester.run().await
}
