//! Remote task launcher backed by ECS Fargate

use async_trait::async_trait;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use aws_sdk_ecs::Client;
use tracing::debug;

use super::{LaunchFailure, LaunchReceipt, TaskLauncher, TaskLaunchSpec};
use crate::error::LaunchError;

/// ECS-backed task launcher
pub struct EcsTaskLauncher {
    client: Client,
}

impl EcsTaskLauncher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskLauncher for EcsTaskLauncher {
    async fn launch(&self, spec: &TaskLaunchSpec) -> Result<LaunchReceipt, LaunchError> {
        let vpc_configuration = AwsVpcConfiguration::builder()
            .set_subnets(Some(spec.subnets.clone()))
            .set_security_groups(Some(spec.security_groups.clone()))
            .assign_public_ip(if spec.assign_public_ip {
                AssignPublicIp::Enabled
            } else {
                AssignPublicIp::Disabled
            })
            .build()
            .map_err(|e| LaunchError::Transport(format!("invalid network configuration: {e}")))?;

        let environment: Vec<KeyValuePair> = spec
            .environment
            .iter()
            .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build())
            .collect();

        let overrides = TaskOverride::builder()
            .container_overrides(
                ContainerOverride::builder()
                    .name(&spec.container_name)
                    .set_command(Some(spec.command.clone()))
                    .set_environment(Some(environment))
                    .build(),
            )
            .build();

        let response = self
            .client
            .run_task()
            .cluster(&spec.cluster)
            .task_definition(&spec.task_definition)
            .launch_type(LaunchType::Fargate)
            .count(spec.count)
            .platform_version("LATEST")
            .network_configuration(
                NetworkConfiguration::builder()
                    .awsvpc_configuration(vpc_configuration)
                    .build(),
            )
            .overrides(overrides)
            .send()
            .await
            .map_err(|e| LaunchError::Transport(e.to_string()))?;

        let receipt = LaunchReceipt {
            launched: response
                .tasks()
                .iter()
                .filter_map(|task| task.task_arn().map(str::to_string))
                .collect(),
            failures: response
                .failures()
                .iter()
                .map(|failure| LaunchFailure {
                    arn: failure.arn().map(str::to_string),
                    reason: failure.reason().unwrap_or("unspecified").to_string(),
                })
                .collect(),
        };

        debug!(
            launched = receipt.launched.len(),
            failures = receipt.failures.len(),
            "run_task response received"
        );
        Ok(receipt)
    }
}
