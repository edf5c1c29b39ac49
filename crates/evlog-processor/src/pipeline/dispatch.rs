//! Task dispatcher for heavyweight events
//!
//! Launches one remote task per record. Launches are independent, with no
//! retries: each attempt ends in exactly one terminal outcome (success,
//! partial failure, or error). Launches may run concurrently up to a
//! configured bound, but the returned outcomes keep bucket order.

use futures::{stream, StreamExt};
use tracing::{debug, warn};

use super::types::{DispatchOutcome, NormalizedRecord};
use crate::stores::{TaskLauncher, TaskLaunchSpec};

/// Fixed launch configuration shared by every task in a batch
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub cluster: String,
    pub task_definition: String,
    pub container_name: String,
    pub command: Vec<String>,
    pub subnets: Vec<String>,
    pub security_group: String,
    pub assign_public_ip: bool,
    /// Upper bound on launches in flight at once
    pub concurrency: usize,
}

/// Launch one task per record and collect every non-success outcome
pub async fn dispatch_tasks(
    records: Vec<NormalizedRecord>,
    config: &DispatchConfig,
    launcher: &dyn TaskLauncher,
) -> Vec<DispatchOutcome> {
    let outcomes: Vec<DispatchOutcome> = stream::iter(records)
        .map(|record| {
            let spec = launch_spec(config, &record);
            async move {
                let outcome = match launcher.launch(&spec).await {
                    Err(cause) => {
                        warn!(error = %cause, "task launch call failed");
                        DispatchOutcome::Error { cause, record }
                    },
                    Ok(receipt) if !receipt.failures.is_empty() => {
                        warn!(
                            failures = receipt.failures.len(),
                            "task launch reported launch-side failures"
                        );
                        DispatchOutcome::PartialFailure {
                            reasons: receipt.failures,
                            record,
                        }
                    },
                    Ok(receipt) => {
                        debug!(launched = ?receipt.launched, "task launched");
                        DispatchOutcome::Success { record }
                    },
                };
                outcome
            }
        })
        .buffered(config.concurrency.max(1))
        .collect()
        .await;

    outcomes.into_iter().filter(|o| !o.is_success()).collect()
}

/// Build the launch request for one record: fixed placement plus the event
/// kind and the full encoded record on the task environment
fn launch_spec(config: &DispatchConfig, record: &NormalizedRecord) -> TaskLaunchSpec {
    TaskLaunchSpec {
        cluster: config.cluster.clone(),
        task_definition: config.task_definition.clone(),
        container_name: config.container_name.clone(),
        command: config.command.clone(),
        subnets: config.subnets.clone(),
        security_groups: vec![config.security_group.clone()],
        assign_public_ip: config.assign_public_ip,
        count: 1,
        environment: vec![
            (
                "TASK".to_string(),
                record.event_type().unwrap_or_default().to_string(),
            ),
            ("SOURCE_EVENT".to_string(), record.to_json_string()),
        ],
    }
}
