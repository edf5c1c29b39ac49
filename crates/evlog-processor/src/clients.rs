//! Production collaborator construction
//!
//! Builds the injected collaborator bundle from configuration. The bundle
//! is created per caller and owned by the caller; nothing here is cached
//! in process-global state.

use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use tracing::info;

use crate::config::Config;
use crate::pipeline::Collaborators;
use crate::secrets;
use crate::stores::{DynamoMirrorStore, EcsTaskLauncher, MysqlStore};

/// Construct the full production bundle: shared AWS config, relational
/// credentials from the secret service, MySQL pool, mirror client, and
/// task-launch client
pub async fn connect(config: &Config) -> Result<Collaborators> {
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

    let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
    let secret_id = config.relational_secret_id();
    let secret = secrets::fetch_relational_secret(&secrets_client, &secret_id)
        .await
        .context("Failed to resolve relational store credentials")?;

    let mysql = MysqlStore::connect(&secret).await?;
    let connection = mysql.connection();

    let mirror = DynamoMirrorStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.mirror_table.clone(),
    );
    let launcher = EcsTaskLauncher::new(aws_sdk_ecs::Client::new(&aws_config));

    info!(
        mirror_table = %config.mirror_table,
        cluster = %config.dispatch.cluster_name,
        "collaborators connected"
    );

    Ok(Collaborators {
        relational: Arc::new(mysql),
        mirror: Arc::new(mirror),
        launcher: Arc::new(launcher),
        connection: Arc::new(connection),
    })
}
