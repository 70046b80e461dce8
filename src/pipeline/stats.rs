//! Run statistics
//!
//! This module provides the summary a harvest run returns and its
//! human-readable rendering.

use crate::publish::DeliveryReport;
use chrono::{DateTime, Utc};

/// What one run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Playlist items consumed
    pub playlist_items: u64,

    /// Video records normalized (and published, when a publisher is attached)
    pub videos: u64,

    /// Page requests issued against both endpoints
    pub fetches: u64,

    /// Whether records were sent to the stream
    pub published: bool,

    pub delivery: DeliveryReport,
}

impl RunSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Prints a run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!(
        "  Duration: {:.1}s",
        summary.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    println!("Upstream:");
    println!("  Playlist items: {}", summary.playlist_items);
    println!("  Videos: {}", summary.videos);
    println!("  Page requests: {}", summary.fetches);
    println!();

    if summary.published {
        let delivery = &summary.delivery;
        println!("Delivery:");
        println!("  Enqueued: {}", delivery.enqueued);
        println!("  Delivered: {}", delivery.delivered);
        println!("  Failed: {}", delivery.failed);
        if delivery.outstanding() > 0 {
            println!("  Outstanding: {}", delivery.outstanding());
        }
    } else {
        println!("Delivery: skipped (--no-publish)");
    }
}
