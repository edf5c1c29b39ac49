//! Configuration management
//!
//! All deployment settings come from the environment (with `.env` support
//! for local development). Required variables are validated at startup so
//! a misconfigured deployment fails before the first batch, not during it.

use evlog_common::{EvlogError, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::DispatchConfig;

/// Default relational table receiving direct-path rows.
pub const DEFAULT_RELATIONAL_TABLE: &str = "example";

/// Default bound on concurrent task launches.
pub const DEFAULT_DISPATCH_CONCURRENCY: usize = 4;

/// Default container command executed by launched tasks.
pub const DEFAULT_TASK_COMMAND: &str = "process-task";

/// Processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment name (kebab-case, e.g. "local-test")
    pub deployment_environment: String,
    /// Mirror (change-feed) table receiving direct-path items
    pub mirror_table: String,
    /// Relational table receiving direct-path rows
    pub relational_table: String,
    pub dispatch: DispatchSettings,
}

/// Remote task launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    pub cluster_name: String,
    pub task_definition_arn: String,
    pub container_name: String,
    pub command: Vec<String>,
    pub vpc_subnets: Vec<String>,
    pub security_group_id: String,
    pub assign_public_ip: bool,
    pub concurrency: usize,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let subnets_raw = required("PROCESS_TASKS_VPC_SUBNETS")?;
        let vpc_subnets: Vec<String> = serde_json::from_str(&subnets_raw).map_err(|_| {
            EvlogError::Config(
                "PROCESS_TASKS_VPC_SUBNETS must be a JSON array of subnet ids".to_string(),
            )
        })?;

        let command = match std::env::var("PROCESS_TASKS_COMMAND") {
            Ok(raw) => serde_json::from_str(&raw).map_err(|_| {
                EvlogError::Config(
                    "PROCESS_TASKS_COMMAND must be a JSON array of strings".to_string(),
                )
            })?,
            Err(_) => vec![DEFAULT_TASK_COMMAND.to_string()],
        };

        Ok(Config {
            deployment_environment: required("DEPLOYMENT_ENVIRONMENT")?,
            mirror_table: required("EVENT_SOURCE_TABLE_NAME")?,
            relational_table: std::env::var("EVLOG_RELATIONAL_TABLE")
                .unwrap_or_else(|_| DEFAULT_RELATIONAL_TABLE.to_string()),
            dispatch: DispatchSettings {
                cluster_name: required("PROCESS_TASKS_CLUSTER_NAME")?,
                task_definition_arn: required("PROCESS_TASKS_TASK_DEFINITION_ARN")?,
                container_name: required("PROCESS_TASKS_CONTAINER_NAME")?,
                command,
                vpc_subnets,
                security_group_id: required("PROCESS_TASKS_SECURITY_GROUP_ID")?,
                assign_public_ip: true,
                concurrency: std::env::var("EVLOG_DISPATCH_CONCURRENCY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DISPATCH_CONCURRENCY),
            },
        })
    }

    /// Launch configuration for the task dispatcher
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            cluster: self.dispatch.cluster_name.clone(),
            task_definition: self.dispatch.task_definition_arn.clone(),
            container_name: self.dispatch.container_name.clone(),
            command: self.dispatch.command.clone(),
            subnets: self.dispatch.vpc_subnets.clone(),
            security_group: self.dispatch.security_group_id.clone(),
            assign_public_ip: self.dispatch.assign_public_ip,
            concurrency: self.dispatch.concurrency,
        }
    }

    /// Lookup id of the relational-store credentials secret,
    /// e.g. "mysqlSecretLocalTest" for environment "local-test"
    pub fn relational_secret_id(&self) -> String {
        format_secret_key("mysqlSecret", &self.deployment_environment)
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EvlogError::Config(format!("Missing required environment variable: {name}")))
}

/// Secret names are `{prefix}` plus the PascalCased deployment environment;
/// each kebab part is capitalized with the rest lowercased
fn format_secret_key(prefix: &str, deployment_environment: &str) -> String {
    let formatted: String = deployment_environment
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                },
                None => String::new(),
            }
        })
        .collect();
    format!("{prefix}{formatted}")
}
