//! Record decoder for change-feed transport payloads
//!
//! Converts typed-attribute change records into [`NormalizedRecord`]s.
//! Decoding is all-or-nothing for an invocation: one malformed record
//! fails the whole batch, there is no partial decode.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::types::NormalizedRecord;
use crate::error::{PipelineError, PipelineResult};

/// One batch of change-log entries, as delivered by the change feed
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<RawChangeRecord>,
}

impl StreamEvent {
    /// Parse a transport-native JSON batch
    pub fn from_json(raw: &str) -> PipelineResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| PipelineError::Decode(format!("invalid stream event: {e}")))
    }
}

/// One transport-native change-log entry
#[derive(Debug, Clone, Deserialize)]
pub struct RawChangeRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(rename = "dynamodb")]
    pub change: ChangePayload,
}

/// The change body; only the new image is ever decoded
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePayload {
    #[serde(rename = "NewImage")]
    pub new_image: Option<BTreeMap<String, Attribute>>,
}

/// Typed transport attribute value
///
/// Externally tagged to match the wire format (`{"S": "text"}`,
/// `{"N": "1.50"}`, ...). An unrecognized tag is a decode error.
#[derive(Debug, Clone, Deserialize)]
pub enum Attribute {
    S(String),
    N(String),
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<Attribute>),
    M(BTreeMap<String, Attribute>),
    SS(Vec<String>),
    NS(Vec<String>),
    BS(Vec<String>),
}

/// Decoded batch, partitioned by change kind, arrival order preserved
///
/// Only `inserts` is routed today; `updates` and `deletes` are decoded for
/// forward compatibility and intentionally unused downstream.
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    pub inserts: Vec<NormalizedRecord>,
    pub updates: Vec<NormalizedRecord>,
    pub deletes: Vec<NormalizedRecord>,
}

/// Decode every record in the batch, partitioned by change kind
///
/// Records with an unrecognized change kind are skipped; a recognized
/// record with no new image is fatal.
pub fn decode_stream(event: StreamEvent) -> PipelineResult<DecodedBatch> {
    let mut batch = DecodedBatch::default();

    for record in event.records {
        match record.event_name.as_str() {
            "INSERT" => batch.inserts.push(decode_new_image(record.change)?),
            "MODIFY" => batch.updates.push(decode_new_image(record.change)?),
            "REMOVE" => batch.deletes.push(decode_new_image(record.change)?),
            other => {
                debug!(event_name = other, "skipping unrecognized change kind");
            },
        }
    }

    Ok(batch)
}

fn decode_new_image(change: ChangePayload) -> PipelineResult<NormalizedRecord> {
    let image = change
        .new_image
        .ok_or_else(|| PipelineError::Decode("change record has no new image".to_string()))?;

    Ok(image
        .into_iter()
        .map(|(field, attr)| (field, decode_attribute(attr)))
        .collect())
}

/// Convert one typed attribute to its native value
///
/// Numeric attributes keep their canonical string form so fixed-precision
/// values never pass through a float.
fn decode_attribute(attr: Attribute) -> Value {
    match attr {
        Attribute::S(s) | Attribute::B(s) => Value::String(s),
        Attribute::N(n) => Value::String(n),
        Attribute::Bool(b) => Value::Bool(b),
        Attribute::Null(_) => Value::Null,
        Attribute::L(items) => Value::Array(items.into_iter().map(decode_attribute).collect()),
        Attribute::M(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(field, nested)| (field, decode_attribute(nested)))
                .collect(),
        ),
        Attribute::SS(items) | Attribute::NS(items) | Attribute::BS(items) => {
            Value::Array(items.into_iter().map(Value::String).collect())
        },
    }
}
