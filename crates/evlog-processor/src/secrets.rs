//! Secret retrieval for collaborator credentials

use anyhow::{bail, Context, Result};
use aws_sdk_secretsmanager::Client;
use serde::{Deserialize, Deserializer};

/// Relational-store credentials, stored as a JSON secret
#[derive(Debug, Clone, Deserialize)]
pub struct RelationalSecret {
    pub host: String,
    pub dbname: String,
    pub username: String,
    pub password: String,
    #[serde(deserialize_with = "port_from_string_or_number")]
    pub port: u16,
}

/// Fetch and parse the relational credentials secret
///
/// Accepts either a string secret or a binary secret; both must hold the
/// JSON credential document.
pub async fn fetch_relational_secret(client: &Client, secret_id: &str) -> Result<RelationalSecret> {
    let response = client
        .get_secret_value()
        .secret_id(secret_id)
        .send()
        .await
        .with_context(|| format!("Failed to retrieve secret {secret_id}"))?;

    if let Some(secret_string) = response.secret_string() {
        return serde_json::from_str(secret_string)
            .with_context(|| format!("Secret {secret_id} is not a valid credential document"));
    }

    if let Some(secret_binary) = response.secret_binary() {
        return serde_json::from_slice(secret_binary.as_ref())
            .with_context(|| format!("Secret {secret_id} is not a valid credential document"));
    }

    bail!("No SecretString or SecretBinary found for secret {secret_id}")
}

// Secret stores are inconsistent about whether the port is a number or a
// quoted string
fn port_from_string_or_number<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        Text(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(port) => Ok(port),
        PortValue::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}
