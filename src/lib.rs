//! Playlist Harvester: YouTube playlist statistics to a Kafka topic
//!
//! This crate walks every video of a YouTube playlist through the Data API's
//! cursor-paginated list endpoints, normalizes each video's title and
//! view/like/comment counts, and produces one Avro-encoded record per video
//! to a schema-governed Kafka topic.

pub mod config;
pub mod pipeline;
pub mod publish;
pub mod record;
pub mod youtube;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP call could not complete or returned a non-success status
    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The body was not JSON or lacked an expected field
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// Registry lookup, schema parsing, or encode-time validation failed
    #[error("Schema error: {0}")]
    Schema(String),

    /// A produced record could not be enqueued, acknowledged, or flushed
    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Kafka client error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: pipeline::PipelineState,
        to: pipeline::PipelineState,
    },
}

impl HarvestError {
    /// Classifies a reqwest failure against the endpoint it was calling
    pub fn transport(endpoint: &str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {}", error)
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else {
            error.to_string()
        };

        Self::Transport {
            endpoint: endpoint.to_string(),
            message,
        }
    }

    pub fn malformed(endpoint: &str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{run_harvest, Harvester, PipelineState, RunSummary};
pub use publish::{DeliveryReport, Publisher, RecordSink};
pub use record::{summarize, PublishRecord, VideoSummary};
