//! Core types for the batch-processing pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LaunchError;
use crate::stores::LaunchFailure;

/// Discriminator field every routed record must carry
pub const EVENT_TYPE_FIELD: &str = "event_type";

/// One change-log record decoded to native field values
///
/// Numbers keep their canonical string representation from the transport,
/// so fixed-precision values survive without floating-point drift.
/// Immutable once decoded; the classifier and both processors only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord {
    fields: serde_json::Map<String, Value>,
}

impl NormalizedRecord {
    pub fn new(fields: serde_json::Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The `event_type` discriminator, when present and a string
    pub fn event_type(&self) -> Option<&str> {
        self.fields.get(EVENT_TYPE_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &serde_json::Map<String, Value> {
        &self.fields
    }

    /// Encode the full record as a JSON string (for task environments
    /// and derived store payloads)
    pub fn to_json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl FromIterator<(String, Value)> for NormalizedRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Closed set of event kinds the pipeline routes
///
/// Unrecognized discriminator values still land in a bucket but route
/// nowhere; downstream lookups go through this enum only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Lightweight events handled inline by the direct processor
    Example,
    /// Heavyweight events handed to the remote task dispatcher
    Task,
}

impl EventKind {
    pub fn discriminator(&self) -> &'static str {
        match self {
            EventKind::Example => "EVENT_EXAMPLE",
            EventKind::Task => "TASK_EXAMPLE",
        }
    }

    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value {
            "EVENT_EXAMPLE" => Some(EventKind::Example),
            "TASK_EXAMPLE" => Some(EventKind::Task),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.discriminator())
    }
}

/// Terminal state of one remote task launch attempt
///
/// Always carries the originating record for traceability.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Launch accepted, no backend-reported failures
    Success { record: NormalizedRecord },
    /// Launch call succeeded but the backend reported launch-side failures
    PartialFailure {
        reasons: Vec<LaunchFailure>,
        record: NormalizedRecord,
    },
    /// The launch call itself failed
    Error {
        cause: LaunchError,
        record: NormalizedRecord,
    },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }

    pub fn record(&self) -> &NormalizedRecord {
        match self {
            DispatchOutcome::Success { record }
            | DispatchOutcome::PartialFailure { record, .. }
            | DispatchOutcome::Error { record, .. } => record,
        }
    }
}

/// One failed record in the aggregated report
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum FailureEntry {
    /// Direct-path record that failed a relational or mirror write
    Direct { record: NormalizedRecord },
    /// Dispatch-path outcome in a non-success state
    Dispatch { outcome: DispatchOutcome },
}

/// Aggregated per-record failures for one invocation
///
/// Returned to the caller, never persisted. Order within each path is
/// preserved; ordering across the two paths is not significant.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FailureReport {
    entries: Vec<FailureEntry>,
}

impl FailureReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_direct(&mut self, record: NormalizedRecord) {
        self.entries.push(FailureEntry::Direct { record });
    }

    pub fn push_dispatch(&mut self, outcome: DispatchOutcome) {
        self.entries.push(FailureEntry::Dispatch { outcome });
    }

    pub fn entries(&self) -> &[FailureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_kind_round_trips_through_discriminator() {
        assert_eq!(
            EventKind::from_discriminator("EVENT_EXAMPLE"),
            Some(EventKind::Example)
        );
        assert_eq!(
            EventKind::from_discriminator("TASK_EXAMPLE"),
            Some(EventKind::Task)
        );
        assert_eq!(EventKind::from_discriminator("SOMETHING_ELSE"), None);
    }

    #[test]
    fn record_exposes_string_discriminator_only() {
        let with_string: NormalizedRecord =
            [("event_type".to_string(), json!("EVENT_EXAMPLE"))]
                .into_iter()
                .collect();
        assert_eq!(with_string.event_type(), Some("EVENT_EXAMPLE"));

        let with_bool: NormalizedRecord = [("event_type".to_string(), json!(true))]
            .into_iter()
            .collect();
        assert_eq!(with_bool.event_type(), None);
    }

    #[test]
    fn failure_report_preserves_push_order() {
        let mut report = FailureReport::new();
        let first: NormalizedRecord = [("id".to_string(), json!("1"))].into_iter().collect();
        let second: NormalizedRecord = [("id".to_string(), json!("2"))].into_iter().collect();
        report.push_direct(first);
        report.push_dispatch(DispatchOutcome::Success { record: second });

        assert_eq!(report.len(), 2);
        assert!(matches!(report.entries()[0], FailureEntry::Direct { .. }));
        assert!(matches!(report.entries()[1], FailureEntry::Dispatch { .. }));
    }
}
