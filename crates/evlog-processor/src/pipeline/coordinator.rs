//! Batch coordinator
//!
//! Wires decode → classify → route → aggregate for one invocation and owns
//! the invocation-scoped connection lifetime: the relational connection is
//! released on every exit path, including decode and classify failures.

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::classifier;
use super::decoder::{self, StreamEvent};
use super::direct;
use super::dispatch::{self, DispatchConfig};
use super::types::{EventKind, FailureReport};
use crate::error::PipelineResult;
use crate::stores::{ConnectionHandle, MirrorStore, RelationalStore, TaskLauncher};

/// Explicitly injected collaborator bundle
///
/// Constructed by the caller with a caller-controlled lifetime; the
/// pipeline holds no process-global client state.
#[derive(Clone)]
pub struct Collaborators {
    pub relational: Arc<dyn RelationalStore>,
    pub mirror: Arc<dyn MirrorStore>,
    pub launcher: Arc<dyn TaskLauncher>,
    pub connection: Arc<dyn ConnectionHandle>,
}

/// Orchestrates one batch end to end
pub struct BatchCoordinator {
    table: String,
    dispatch: DispatchConfig,
    collaborators: Collaborators,
}

impl BatchCoordinator {
    pub fn new(
        table: impl Into<String>,
        dispatch: DispatchConfig,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            table: table.into(),
            dispatch,
            collaborators,
        }
    }

    /// Process one raw batch and return the aggregated failure report
    ///
    /// Structural errors (decode, classify) propagate to the caller after
    /// the connection is released; record-level failures never abort the
    /// batch and land in the report instead.
    pub async fn process_batch(&self, event: StreamEvent) -> PipelineResult<FailureReport> {
        let invocation_id = Uuid::new_v4();
        let span = info_span!("process_batch", %invocation_id);
        let result = self.run(event).instrument(span).await;

        // always, even when decode or classify failed
        self.collaborators.connection.release().await;

        result
    }

    async fn run(&self, event: StreamEvent) -> PipelineResult<FailureReport> {
        let batch = decoder::decode_stream(event)?;
        info!(
            inserts = batch.inserts.len(),
            updates = batch.updates.len(),
            deletes = batch.deletes.len(),
            "decoded change-log batch"
        );

        let mut buckets = classifier::classify(batch.inserts)?;
        let unrecognized = buckets.unrecognized_kinds();
        if !unrecognized.is_empty() {
            debug!(kinds = ?unrecognized, "batch carries unrouted event kinds");
        }

        let direct_records = buckets.take(EventKind::Example);
        let task_records = buckets.take(EventKind::Task);

        // disjoint buckets, no shared mutable state: run both paths at once
        let (direct_failures, dispatch_failures) = tokio::join!(
            direct::process_direct(
                direct_records,
                &self.table,
                self.collaborators.relational.as_ref(),
                self.collaborators.mirror.as_ref(),
            ),
            dispatch::dispatch_tasks(
                task_records,
                &self.dispatch,
                self.collaborators.launcher.as_ref(),
            ),
        );

        let mut report = FailureReport::new();
        for record in direct_failures {
            report.push_direct(record);
        }
        for outcome in dispatch_failures {
            report.push_dispatch(outcome);
        }

        info!(failures = report.len(), "batch processed");
        Ok(report)
    }
}
