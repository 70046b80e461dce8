//! Schema registry client
//!
//! Looks up a subject's schema over the Confluent-compatible REST API:
//! `GET {url}/subjects/{subject}/versions/{version}`.

use crate::config::SchemaRegistryConfig;
use crate::{ConfigError, HarvestError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const ACCEPT: &str = "application/vnd.schemaregistry.v1+json, application/json";

/// A schema version as returned by the registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredSchema {
    pub subject: String,

    /// Globally unique id, embedded in every framed value
    pub id: u32,

    pub version: u32,

    /// The schema document itself, as a JSON string
    pub schema: String,

    /// Absent for Avro schemas
    #[serde(rename = "schemaType", default)]
    pub schema_type: Option<String>,
}

/// Client for subject lookups
#[derive(Debug, Clone)]
pub struct SchemaRegistryClient {
    client: Client,
    base_url: Url,
    basic_auth: Option<(String, String)>,
}

impl SchemaRegistryClient {
    /// Creates a registry client
    ///
    /// # Arguments
    ///
    /// * `config` - Registry URL and optional credentials
    /// * `timeout` - Upper bound for each lookup
    pub fn new(config: &SchemaRegistryConfig, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid schema-registry url '{}': {}", config.url, e))
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            basic_auth: config.basic_auth(),
        })
    }

    /// Fetches the latest version of a subject
    pub async fn latest(&self, subject: &str) -> Result<RegisteredSchema> {
        self.version(subject, "latest").await
    }

    /// Fetches a specific version (a number or `latest`) of a subject
    ///
    /// Every failure, including network errors, is reported as
    /// [`HarvestError::Schema`]: without the schema nothing can be published.
    pub async fn version(&self, subject: &str, version: &str) -> Result<RegisteredSchema> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HarvestError::Schema(format!("registry url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["subjects", subject, "versions", version]);

        tracing::debug!(subject, version, "looking up schema");

        let mut request = self.client.get(url).header(reqwest::header::ACCEPT, ACCEPT);
        if let Some((user, secret)) = &self.basic_auth {
            request = request.basic_auth(user, Some(secret));
        }

        let response = request.send().await.map_err(|e| {
            HarvestError::Schema(format!("registry lookup for '{}' failed: {}", subject, e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            HarvestError::Schema(format!("registry lookup for '{}' failed: {}", subject, e))
        })?;

        if !status.is_success() {
            return Err(HarvestError::Schema(format!(
                "registry returned HTTP {} for subject '{}' version {}: {}",
                status.as_u16(),
                subject,
                version,
                body
            )));
        }

        let registered: RegisteredSchema = serde_json::from_str(&body).map_err(|e| {
            HarvestError::Schema(format!("unreadable registry response for '{}': {}", subject, e))
        })?;

        if let Some(schema_type) = &registered.schema_type {
            if !schema_type.eq_ignore_ascii_case("AVRO") {
                return Err(HarvestError::Schema(format!(
                    "subject '{}' holds a {} schema, expected AVRO",
                    subject, schema_type
                )));
            }
        }

        Ok(registered)
    }
}
