//! Change-feed mirror store backed by DynamoDB

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::Value;
use tracing::debug;

use super::MirrorStore;
use crate::error::WriteError;

/// DynamoDB-backed mirror store writing to one table
pub struct DynamoMirrorStore {
    client: Client,
    table: String,
}

impl DynamoMirrorStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl MirrorStore for DynamoMirrorStore {
    async fn put_item(&self, item: &serde_json::Map<String, Value>) -> Result<(), WriteError> {
        let attributes: HashMap<String, AttributeValue> = item
            .iter()
            .map(|(field, value)| (field.clone(), to_attribute(value)))
            .collect();

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(attributes))
            .send()
            .await
            .map_err(|e| WriteError::Unavailable(e.to_string()))?;

        debug!(table = %self.table, "mirror item written");
        Ok(())
    }
}

/// Native value → typed attribute, the inverse of the decoder's mapping
fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(entries) => AttributeValue::M(
            entries
                .iter()
                .map(|(field, nested)| (field.clone(), to_attribute(nested)))
                .collect(),
        ),
    }
}
