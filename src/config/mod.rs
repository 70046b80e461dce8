//! Configuration module for the playlist harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use playlist_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Publishing to topic: {}", config.kafka.topic);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, KafkaConfig, SchemaRegistryConfig, YouTubeConfig, DEFAULT_BASE_URL, DEFAULT_SUBJECT,
    DEFAULT_TOPIC,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
