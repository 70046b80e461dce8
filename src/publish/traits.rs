//! Record sink trait and delivery bookkeeping
//!
//! This module defines the seam between the publisher and the transport that
//! carries records to the broker, and the counters the transport's delivery
//! callback feeds.

use crate::record::PublishRecord;
use crate::Result;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Transport for encoded records
///
/// Implementations queue records internally and transmit them in the
/// background. Each queued record must eventually be reported to the
/// [`DeliveryTracker`] exactly once, as delivered or failed.
pub trait RecordSink: Send + Sync {
    /// Enqueues a record and returns without waiting for transmission
    ///
    /// Fails only when the record cannot be queued at all (e.g., the local
    /// queue is full).
    fn send(&self, topic: &str, record: PublishRecord) -> Result<()>;

    /// Blocks until every queued record is acknowledged or has definitively
    /// failed, or until `timeout` elapses
    fn flush(&self, timeout: Duration) -> Result<()>;

    /// Delivery outcomes observed so far
    fn tracker(&self) -> &DeliveryTracker;
}

/// Counts delivery callback outcomes
///
/// Updated from the transport's delivery thread, read from the driver.
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, key: &str) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(key, "record delivered");
    }

    pub fn record_failure(&self, key: &str, error: &dyn fmt::Display) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::error!(key, error = %error, "record delivery failed");
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Outcome of the records handed to a publisher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Records accepted into the producer queue
    pub enqueued: u64,

    /// Records acknowledged by the broker
    pub delivered: u64,

    /// Records the broker rejected or that timed out
    pub failed: u64,
}

impl DeliveryReport {
    /// Records with no delivery outcome yet
    pub fn outstanding(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.delivered)
            .saturating_sub(self.failed)
    }

    /// True when every enqueued record was delivered
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.outstanding() == 0
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} enqueued, {} delivered, {} failed, {} outstanding",
            self.enqueued,
            self.delivered,
            self.failed,
            self.outstanding()
        )
    }
}
