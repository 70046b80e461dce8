//! Kafka transport built on librdkafka
//!
//! `ThreadedProducer` owns a background thread that polls the client, so
//! delivery reports arrive on that thread while the driver keeps enqueuing.

use crate::config::KafkaConfig;
use crate::publish::traits::{DeliveryTracker, RecordSink};
use crate::record::PublishRecord;
use crate::{HarvestError, Result};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{BaseRecord, DeliveryResult, Producer, ProducerContext, ThreadedProducer};
use rdkafka::{ClientContext, Message};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

/// Client context whose delivery callback feeds a [`DeliveryTracker`]
pub struct DeliveryContext {
    tracker: Arc<DeliveryTracker>,
}

impl ClientContext for DeliveryContext {}

impl ProducerContext for DeliveryContext {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        match result {
            Ok(message) => self.tracker.record_success(&message_key(message)),
            Err((error, message)) => self.tracker.record_failure(&message_key(message), error),
        }
    }
}

fn message_key<M: Message>(message: &M) -> Cow<'_, str> {
    message
        .key()
        .map(String::from_utf8_lossy)
        .unwrap_or(Cow::Borrowed("<none>"))
}

/// Produces records to a Kafka cluster
pub struct KafkaSink {
    producer: ThreadedProducer<DeliveryContext>,
    tracker: Arc<DeliveryTracker>,
}

impl KafkaSink {
    /// Creates a producer from the merged client properties
    ///
    /// See [`KafkaConfig::client_properties`] for precedence.
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let mut client_config = ClientConfig::new();
        for (key, value) in config.client_properties() {
            client_config.set(key, value);
        }

        let tracker = Arc::new(DeliveryTracker::new());
        let producer: ThreadedProducer<DeliveryContext> =
            client_config.create_with_context(DeliveryContext {
                tracker: Arc::clone(&tracker),
            })?;

        tracing::info!(
            bootstrap_servers = %config.bootstrap_servers,
            topic = %config.topic,
            "Kafka producer created"
        );

        Ok(Self { producer, tracker })
    }
}

impl RecordSink for KafkaSink {
    fn send(&self, topic: &str, record: PublishRecord) -> Result<()> {
        let base = BaseRecord::to(topic)
            .key(record.key.as_str())
            .payload(record.payload.as_slice());

        self.producer.send(base).map_err(|(error, _)| {
            HarvestError::Delivery(format!(
                "could not enqueue record {} for {}: {}",
                record.key, topic, error
            ))
        })
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer.flush(timeout).map_err(|error| {
            HarvestError::Delivery(format!(
                "{} records still in flight after {:?}: {}",
                self.producer.in_flight_count(),
                timeout,
                error
            ))
        })
    }

    fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }
}
