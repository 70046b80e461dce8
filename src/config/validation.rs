use crate::config::types::{Config, KafkaConfig, SchemaRegistryConfig, YouTubeConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_youtube_config(&config.youtube)?;
    validate_registry_config(&config.schema_registry)?;
    validate_kafka_config(&config.kafka)?;
    Ok(())
}

/// Validates the upstream API configuration
fn validate_youtube_config(config: &YouTubeConfig) -> Result<(), ConfigError> {
    require_non_empty("api-key", &config.api_key)?;
    require_non_empty("playlist-id", &config.playlist_id)?;
    validate_http_url("base-url", &config.base_url)?;

    for (name, secs) in [
        ("request-timeout-secs", config.request_timeout_secs),
        ("connect-timeout-secs", config.connect_timeout_secs),
    ] {
        if !(1..=300).contains(&secs) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 300, got {}",
                name, secs
            )));
        }
    }

    if let Some(max_results) = config.max_results {
        if !(1..=50).contains(&max_results) {
            return Err(ConfigError::Validation(format!(
                "max-results must be between 1 and 50, got {}",
                max_results
            )));
        }
    }

    Ok(())
}

/// Validates schema registry configuration
fn validate_registry_config(config: &SchemaRegistryConfig) -> Result<(), ConfigError> {
    validate_http_url("schema-registry url", &config.url)?;
    require_non_empty("subject", &config.subject)?;

    if let Some(info) = &config.basic_auth_user_info {
        if !info.contains(':') {
            return Err(ConfigError::Validation(
                "basic-auth-user-info must have the form 'user:secret'".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates Kafka producer configuration
fn validate_kafka_config(config: &KafkaConfig) -> Result<(), ConfigError> {
    require_non_empty("bootstrap-servers", &config.bootstrap_servers)?;
    require_non_empty("topic", &config.topic)?;

    if !config
        .topic
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ConfigError::Validation(format!(
            "topic '{}' may only contain ASCII alphanumerics, '.', '_' and '-'",
            config.topic
        )));
    }

    if config.flush_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "flush-timeout-secs must be >= 1".to_string(),
        ));
    }

    // librdkafka treats 0 as "never expire"
    let flush_ms = config.flush_timeout_secs.saturating_mul(1000);
    match config.effective_message_timeout_ms() {
        Some(timeout) if timeout > 0 && timeout < flush_ms => {}
        Some(timeout) => {
            return Err(ConfigError::Validation(format!(
                "message timeout ({}ms) must be between 1 and flush-timeout-secs ({}ms) exclusive",
                timeout, flush_ms
            )));
        }
        None => {
            return Err(ConfigError::Validation(
                "kafka property message.timeout.ms must be an integer".to_string(),
            ));
        }
    }

    Ok(())
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }
    Ok(())
}

/// Validates that a string is an absolute http(s) URL
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}
