use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default base URL of the YouTube Data API v3
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// Default schema registry subject for the published values
pub const DEFAULT_SUBJECT: &str = "youtube_videos-value";

/// Default topic that video records are produced to
pub const DEFAULT_TOPIC: &str = "youtube_videos";

const MESSAGE_TIMEOUT_KEY: &str = "message.timeout.ms";

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub youtube: YouTubeConfig,
    #[serde(rename = "schema-registry")]
    pub schema_registry: SchemaRegistryConfig,
    pub kafka: KafkaConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct YouTubeConfig {
    /// API key sent as the `key` query parameter
    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Playlist whose videos are harvested
    #[serde(rename = "playlist-id")]
    pub playlist_id: String,

    /// Base URL the list endpoints are resolved against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Total time allowed for one HTTP request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Optional `maxResults` page size
    #[serde(rename = "max-results", default)]
    pub max_results: Option<u32>,
}

impl YouTubeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Schema registry connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaRegistryConfig {
    /// Registry base URL (e.g., "http://localhost:8081")
    pub url: String,

    /// Subject the value schema is registered under
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Credentials in `user:secret` form for HTTP basic auth
    #[serde(rename = "basic-auth-user-info", default)]
    pub basic_auth_user_info: Option<String>,
}

impl SchemaRegistryConfig {
    /// Splits `basic-auth-user-info` into a username and password
    pub fn basic_auth(&self) -> Option<(String, String)> {
        let info = self.basic_auth_user_info.as_deref()?;
        let (user, secret) = info.split_once(':')?;
        Some((user.to_string(), secret.to_string()))
    }
}

/// Kafka producer configuration
///
/// `properties` holds raw librdkafka settings and forms the base layer of the
/// client configuration. The typed fields are applied on top of it, so
/// `bootstrap-servers` always wins over a `bootstrap.servers` entry in
/// `properties`. Serialization is never configured through client properties.
///
/// Records must expire inside the flush window so that the final drain sees a
/// delivery report for every one of them. Without an explicit message timeout
/// it is derived from `flush-timeout-secs`.
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    #[serde(rename = "bootstrap-servers")]
    pub bootstrap_servers: String,

    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(rename = "client-id", default)]
    pub client_id: Option<String>,

    #[serde(rename = "message-timeout-ms", default)]
    pub message_timeout_ms: Option<u64>,

    /// Upper bound on the final drain (seconds)
    #[serde(rename = "flush-timeout-secs", default = "default_flush_timeout")]
    pub flush_timeout_secs: u64,

    /// Fail the run after draining if any record was rejected by the broker
    #[serde(rename = "fail-on-delivery-error", default)]
    pub fail_on_delivery_error: bool,

    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl KafkaConfig {
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_secs(self.flush_timeout_secs)
    }

    /// The `message.timeout.ms` the producer will run with
    ///
    /// The typed field wins, then a raw `properties` entry, then nine tenths
    /// of the flush timeout. Returns `None` only for an unparsable raw entry.
    pub fn effective_message_timeout_ms(&self) -> Option<u64> {
        if let Some(timeout) = self.message_timeout_ms {
            return Some(timeout);
        }
        match self.properties.get(MESSAGE_TIMEOUT_KEY) {
            Some(raw) => raw.trim().parse().ok(),
            None => Some(self.flush_timeout_secs.saturating_mul(1000) / 10 * 9),
        }
    }

    /// Returns the merged librdkafka properties, typed fields taking precedence
    pub fn client_properties(&self) -> BTreeMap<String, String> {
        let mut merged = self.properties.clone();
        merged.insert(
            "bootstrap.servers".to_string(),
            self.bootstrap_servers.clone(),
        );
        if let Some(client_id) = &self.client_id {
            merged.insert("client.id".to_string(), client_id.clone());
        }
        if self.message_timeout_ms.is_some() || !merged.contains_key(MESSAGE_TIMEOUT_KEY) {
            if let Some(timeout) = self.effective_message_timeout_ms() {
                merged.insert(MESSAGE_TIMEOUT_KEY.to_string(), timeout.to_string());
            }
        }
        merged
    }

    /// Merged properties with credential-like values replaced, for display
    pub fn masked_properties(&self) -> BTreeMap<String, String> {
        self.client_properties()
            .into_iter()
            .map(|(key, value)| {
                let lowered = key.to_ascii_lowercase();
                if lowered.contains("password") || lowered.contains("secret") {
                    (key, "****".to_string())
                } else {
                    (key, value)
                }
            })
            .collect()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_flush_timeout() -> u64 {
    60
}
