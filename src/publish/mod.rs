//! Stream side of the pipeline
//!
//! This module handles:
//! - Looking up the value schema in the schema registry
//! - Encoding summaries as registry-framed Avro values
//! - Producing keyed records through a [`RecordSink`] (Kafka or in-memory)
//! - Counting per-record delivery outcomes and draining at the end of a run

mod encoder;
mod kafka;
mod memory;
mod publisher;
mod registry;
mod traits;

pub use encoder::{video_value, AvroValueEncoder, MAGIC_BYTE};
pub use kafka::{DeliveryContext, KafkaSink};
pub use memory::{MemorySink, SentRecord};
pub use publisher::Publisher;
pub use registry::{RegisteredSchema, SchemaRegistryClient};
pub use traits::{DeliveryReport, DeliveryTracker, RecordSink};
