//! Relational store backed by MySQL via sqlx
//!
//! Credentials come from the secret service at connect time; the pool is
//! scoped to one invocation and closed through [`ConnectionHandle`].

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::debug;

use super::{ConnectionHandle, RelationalStore};
use crate::error::WriteError;
use crate::secrets::RelationalSecret;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL-backed relational store
pub struct MysqlStore {
    pool: MySqlPool,
}

impl MysqlStore {
    /// Open a connection pool from a credential document
    pub async fn connect(secret: &RelationalSecret) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&secret.host)
            .port(secret.port)
            .username(&secret.username)
            .password(&secret.password)
            .database(&secret.dbname);

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to MySQL at {}", secret.host))?;

        debug!(host = %secret.host, database = %secret.dbname, "relational store connected");
        Ok(Self { pool })
    }

    /// Invocation-scoped handle used to release the pool
    pub fn connection(&self) -> MysqlConnection {
        MysqlConnection {
            pool: self.pool.clone(),
        }
    }
}

#[async_trait]
impl RelationalStore for MysqlStore {
    async fn write(
        &self,
        table: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<(), WriteError> {
        let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
        let sql = build_insert_sql(table, &columns)?;

        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = match value {
                Value::String(s) => query.bind(s.clone()),
                Value::Bool(b) => query.bind(*b),
                Value::Null => query.bind(Option::<String>::None),
                other => query.bind(other.to_string()),
            };
        }

        query.execute(&self.pool).await?;
        Ok(())
    }
}

/// Release handle over the shared pool; closing twice is a no-op
pub struct MysqlConnection {
    pool: MySqlPool,
}

#[async_trait]
impl ConnectionHandle for MysqlConnection {
    async fn release(&self) {
        self.pool.close().await;
    }
}

/// Build a parameterized insert; identifiers cannot be bound, so they are
/// validated instead
fn build_insert_sql(table: &str, columns: &[&str]) -> Result<String, WriteError> {
    validate_identifier(table)?;
    for column in columns {
        validate_identifier(column)?;
    }
    if columns.is_empty() {
        return Err(WriteError::InvalidIdentifier(
            "insert with no columns".to_string(),
        ));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    ))
}

fn validate_identifier(identifier: &str) -> Result<(), WriteError> {
    let valid = !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(WriteError::InvalidIdentifier(identifier.to_string()))
    }
}
