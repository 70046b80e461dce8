//! Avro value encoding in the Confluent wire format
//!
//! A framed value is the magic byte `0`, the writer schema's registry id as a
//! 4-byte big-endian integer, and the Avro binary datum.

use crate::publish::registry::RegisteredSchema;
use crate::record::VideoSummary;
use crate::{HarvestError, Result};
use apache_avro::types::Value;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};

/// First byte of every framed value
pub const MAGIC_BYTE: u8 = 0;

const HEADER_LEN: usize = 5;

/// Encodes video summaries against one registered schema
#[derive(Debug, Clone)]
pub struct AvroValueEncoder {
    schema: Schema,
    schema_id: u32,
}

impl AvroValueEncoder {
    /// Parses a schema document and checks it can carry video records
    ///
    /// The schema must be a record accepting `TITLE` (string) and `VIEWS`,
    /// `LIKES`, `COMMENTS` (int or long), optionally as nullable unions.
    /// Any mismatch is reported here, before the first publish.
    pub fn new(schema_id: u32, schema_json: &str) -> Result<Self> {
        let schema = Schema::parse_str(schema_json)
            .map_err(|e| HarvestError::Schema(format!("cannot parse schema {}: {}", schema_id, e)))?;

        let encoder = Self { schema, schema_id };
        encoder.encode_datum(&VideoSummary::default()).map_err(|e| {
            HarvestError::Schema(format!(
                "schema {} cannot encode video records: {}",
                schema_id, e
            ))
        })?;

        Ok(encoder)
    }

    pub fn from_registered(registered: &RegisteredSchema) -> Result<Self> {
        Self::new(registered.id, &registered.schema)
    }

    pub fn schema_id(&self) -> u32 {
        self.schema_id
    }

    /// Encodes a summary into a framed value
    pub fn encode(&self, summary: &VideoSummary) -> Result<Vec<u8>> {
        let datum = self.encode_datum(summary).map_err(|e| {
            HarvestError::Schema(format!(
                "cannot encode video {} with schema {}: {}",
                summary.video_id, self.schema_id, e
            ))
        })?;

        let mut payload = Vec::with_capacity(HEADER_LEN + datum.len());
        payload.push(MAGIC_BYTE);
        payload.extend_from_slice(&self.schema_id.to_be_bytes());
        payload.extend_from_slice(&datum);
        Ok(payload)
    }

    /// Decodes a framed value written with this encoder's schema
    pub fn decode(&self, payload: &[u8]) -> Result<Value> {
        if payload.len() < HEADER_LEN || payload[0] != MAGIC_BYTE {
            return Err(HarvestError::Schema(
                "payload is not in the registry wire format".to_string(),
            ));
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&payload[1..HEADER_LEN]);
        let id = u32::from_be_bytes(id);
        if id != self.schema_id {
            return Err(HarvestError::Schema(format!(
                "payload written with schema {}, expected {}",
                id, self.schema_id
            )));
        }

        let mut datum = &payload[HEADER_LEN..];
        from_avro_datum(&self.schema, &mut datum, None)
            .map_err(|e| HarvestError::Schema(format!("cannot decode payload: {}", e)))
    }

    fn encode_datum(&self, summary: &VideoSummary) -> apache_avro::AvroResult<Vec<u8>> {
        let resolved = video_value(summary).resolve(&self.schema)?;
        to_avro_datum(&self.schema, resolved)
    }
}

/// The stream-side value of a video: `{TITLE, VIEWS, LIKES, COMMENTS}`
pub fn video_value(summary: &VideoSummary) -> Value {
    Value::Record(vec![
        ("TITLE".to_string(), Value::String(summary.title.clone())),
        ("VIEWS".to_string(), count_value(summary.views)),
        ("LIKES".to_string(), count_value(summary.likes)),
        ("COMMENTS".to_string(), count_value(summary.comments)),
    ])
}

// Int resolves against both int and long fields; only counts beyond i32 need Long
fn count_value(count: u64) -> Value {
    match i32::try_from(count) {
        Ok(small) => Value::Int(small),
        Err(_) => Value::Long(i64::try_from(count).unwrap_or(i64::MAX)),
    }
}
