//! In-process record sink
//!
//! Keeps accepted records in memory and reports delivery immediately.
//! Selected keys can be rejected to exercise the failure path of the delivery
//! callback.

use crate::publish::traits::{DeliveryTracker, RecordSink};
use crate::record::PublishRecord;
use crate::Result;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A record accepted by [`MemorySink`], with the topic it was sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub topic: String,
    pub record: PublishRecord,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<SentRecord>>,
    rejected_keys: HashSet<String>,
    tracker: DeliveryTracker,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose broker rejects every record with one of `keys`
    pub fn rejecting<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rejected_keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Records delivered so far, in send order
    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordSink for MemorySink {
    fn send(&self, topic: &str, record: PublishRecord) -> Result<()> {
        if self.rejected_keys.contains(&record.key) {
            self.tracker
                .record_failure(&record.key, &"Broker: Message rejected");
            return Ok(());
        }

        self.tracker.record_success(&record.key);
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentRecord {
                topic: topic.to_string(),
                record,
            });
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }
}
