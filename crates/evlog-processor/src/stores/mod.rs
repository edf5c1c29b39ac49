//! Collaborator interfaces for the pipeline
//!
//! The core calls capability traits, never concrete backends. Production
//! implementations live in the submodules; tests inject in-memory fakes.
//! The bundle holding them is constructed explicitly in [`crate::clients`]
//! with a caller-controlled lifetime, so there is no process-global client
//! state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LaunchError, WriteError};

pub mod dynamo;
pub mod ecs;
pub mod mysql;

pub use dynamo::DynamoMirrorStore;
pub use ecs::EcsTaskLauncher;
pub use mysql::{MysqlConnection, MysqlStore};

/// Write-capable handle on the relational store
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Insert one row of named fields into `table`
    async fn write(&self, table: &str, fields: &serde_json::Map<String, Value>)
        -> Result<(), WriteError>;
}

/// Write-capable handle on the change-feed mirror store
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Put one item, keyed by the fields it carries
    async fn put_item(&self, item: &serde_json::Map<String, Value>) -> Result<(), WriteError>;
}

/// Launch request for one remote task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskLaunchSpec {
    pub cluster: String,
    pub task_definition: String,
    pub container_name: String,
    pub command: Vec<String>,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub assign_public_ip: bool,
    /// Number of task instances to start (always 1 in this pipeline)
    pub count: i32,
    /// Environment passed to the container, in declaration order
    pub environment: Vec<(String, String)>,
}

/// One launch-side failure reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchFailure {
    pub arn: Option<String>,
    pub reason: String,
}

/// Response from a successful launch call
#[derive(Debug, Clone, Default)]
pub struct LaunchReceipt {
    /// Identifiers of tasks the backend actually started
    pub launched: Vec<String>,
    /// Launch-side failures; non-empty means a partial failure
    pub failures: Vec<LaunchFailure>,
}

/// Remote task-execution backend
#[async_trait]
pub trait TaskLauncher: Send + Sync {
    async fn launch(&self, spec: &TaskLaunchSpec) -> Result<LaunchReceipt, LaunchError>;
}

/// Invocation-scoped connection on the relational store
///
/// `release` is idempotent and safe to call even if the connection was
/// never successfully opened; the coordinator calls it on every exit path.
#[async_trait]
pub trait ConnectionHandle: Send + Sync {
    async fn release(&self);
}
