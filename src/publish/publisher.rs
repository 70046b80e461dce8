//! Publisher: encode, enqueue, drain

use crate::config::Config;
use crate::publish::encoder::AvroValueEncoder;
use crate::publish::kafka::KafkaSink;
use crate::publish::registry::SchemaRegistryClient;
use crate::publish::traits::{DeliveryReport, RecordSink};
use crate::record::{PublishRecord, VideoSummary};
use crate::{HarvestError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Publishes video summaries to one topic
///
/// `publish` only encodes and enqueues; transmission happens in the sink's
/// background. `drain` waits for every enqueued record to be resolved.
pub struct Publisher {
    topic: String,
    encoder: AvroValueEncoder,
    sink: Arc<dyn RecordSink>,
    flush_timeout: Duration,
    enqueued: u64,
}

impl Publisher {
    pub fn new(
        topic: impl Into<String>,
        encoder: AvroValueEncoder,
        sink: Arc<dyn RecordSink>,
        flush_timeout: Duration,
    ) -> Self {
        Self {
            topic: topic.into(),
            encoder,
            sink,
            flush_timeout,
            enqueued: 0,
        }
    }

    /// Fetches the value schema and connects a Kafka producer
    ///
    /// The schema is looked up once, by subject at its latest version, before
    /// any record is produced. Registry lookups share the upstream request
    /// timeout.
    pub async fn connect(config: &Config) -> Result<Self> {
        let registry =
            SchemaRegistryClient::new(&config.schema_registry, config.youtube.request_timeout())?;
        let registered = registry.latest(&config.schema_registry.subject).await?;

        tracing::info!(
            subject = %registered.subject,
            schema_id = registered.id,
            version = registered.version,
            "Loaded value schema"
        );

        let encoder = AvroValueEncoder::from_registered(&registered)?;
        let sink = KafkaSink::new(&config.kafka)?;

        Ok(Self::new(
            config.kafka.topic.clone(),
            encoder,
            Arc::new(sink),
            config.kafka.flush_timeout(),
        ))
    }

    pub fn encoder(&self) -> &AvroValueEncoder {
        &self.encoder
    }

    /// Encodes `value` and enqueues it under `key`
    pub fn publish(&mut self, key: &str, value: &VideoSummary) -> Result<()> {
        let payload = self.encoder.encode(value)?;
        self.sink.send(
            &self.topic,
            PublishRecord {
                key: key.to_string(),
                payload,
            },
        )?;
        self.enqueued += 1;
        Ok(())
    }

    /// Blocks until every enqueued record is acknowledged or failed
    ///
    /// The sink's blocking flush runs on the blocking thread pool. Exceeding
    /// the flush timeout is a [`HarvestError::Delivery`].
    pub async fn drain(&mut self) -> Result<DeliveryReport> {
        let sink = Arc::clone(&self.sink);
        let timeout = self.flush_timeout;

        tracing::debug!(enqueued = self.enqueued, ?timeout, "draining producer");

        tokio::task::spawn_blocking(move || sink.flush(timeout))
            .await
            .map_err(|e| HarvestError::Delivery(format!("drain task failed: {}", e)))??;

        let report = self.report();
        tracing::info!("Drained producer: {}", report);
        Ok(report)
    }

    /// Delivery outcomes so far
    pub fn report(&self) -> DeliveryReport {
        let tracker = self.sink.tracker();
        DeliveryReport {
            enqueued: self.enqueued,
            delivered: tracker.delivered(),
            failed: tracker.failed(),
        }
    }
}
