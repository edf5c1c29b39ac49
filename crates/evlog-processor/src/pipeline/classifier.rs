//! Event classifier
//!
//! Partitions decoded insert records into per-kind buckets. Grouping is
//! stable: records of one kind keep their arrival order. A record without
//! a string `event_type` fails the whole invocation before any side
//! effect runs.

use std::collections::HashMap;

use tracing::debug;

use super::types::{EventKind, NormalizedRecord};
use crate::error::{PipelineError, PipelineResult};

/// Records grouped by their `event_type` discriminator
///
/// Buckets are keyed by the raw discriminator internally, but the public
/// lookup goes through the closed [`EventKind`] set; an absent kind yields
/// an empty bucket, never an error. Unrecognized kinds are retained and
/// observable but route nowhere.
#[derive(Debug, Default)]
pub struct EventBuckets {
    buckets: HashMap<String, Vec<NormalizedRecord>>,
}

impl EventBuckets {
    /// Borrow the bucket for a kind; empty slice when no records arrived
    pub fn bucket(&self, kind: EventKind) -> &[NormalizedRecord] {
        self.buckets
            .get(kind.discriminator())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Move the bucket for a kind out, leaving it empty
    pub fn take(&mut self, kind: EventKind) -> Vec<NormalizedRecord> {
        self.buckets.remove(kind.discriminator()).unwrap_or_default()
    }

    /// Discriminator values that arrived but map to no routed kind
    pub fn unrecognized_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .buckets
            .keys()
            .filter(|k| EventKind::from_discriminator(k).is_none())
            .map(String::as_str)
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Total records across every bucket
    pub fn total_records(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Group insert records by `event_type`
///
/// Every record lands in exactly one bucket; the union of all buckets is
/// the input set, unchanged and unduplicated.
pub fn classify(records: Vec<NormalizedRecord>) -> PipelineResult<EventBuckets> {
    let mut buckets: HashMap<String, Vec<NormalizedRecord>> = HashMap::new();

    for (index, record) in records.into_iter().enumerate() {
        let kind = record
            .event_type()
            .ok_or(PipelineError::MissingDiscriminator { index })?
            .to_string();

        if EventKind::from_discriminator(&kind).is_none() {
            debug!(event_type = %kind, index, "record has an unrouted event kind");
        }
        buckets.entry(kind).or_default().push(record);
    }

    Ok(EventBuckets { buckets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: &str, id: u32) -> NormalizedRecord {
        [
            ("event_type".to_string(), json!(kind)),
            ("id".to_string(), json!(id.to_string())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn partitions_by_kind_preserving_relative_order() {
        let buckets = classify(vec![
            record("EVENT_EXAMPLE", 1),
            record("TASK_EXAMPLE", 2),
            record("EVENT_EXAMPLE", 3),
            record("TASK_EXAMPLE", 4),
        ])
        .unwrap();

        let example_ids: Vec<_> = buckets
            .bucket(EventKind::Example)
            .iter()
            .map(|r| r.get("id").cloned().unwrap())
            .collect();
        assert_eq!(example_ids, vec![json!("1"), json!("3")]);

        let task_ids: Vec<_> = buckets
            .bucket(EventKind::Task)
            .iter()
            .map(|r| r.get("id").cloned().unwrap())
            .collect();
        assert_eq!(task_ids, vec![json!("2"), json!("4")]);

        // union across buckets equals the input set
        assert_eq!(buckets.total_records(), 4);
    }

    #[test]
    fn missing_discriminator_fails_the_invocation() {
        let no_type: NormalizedRecord = [("id".to_string(), json!("7"))].into_iter().collect();
        let err = classify(vec![record("EVENT_EXAMPLE", 1), no_type]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingDiscriminator { index: 1 }
        ));
    }

    #[test]
    fn non_string_discriminator_counts_as_missing() {
        let bad: NormalizedRecord = [("event_type".to_string(), json!(42))]
            .into_iter()
            .collect();
        let err = classify(vec![bad]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingDiscriminator { index: 0 }
        ));
    }

    #[test]
    fn absent_kind_yields_empty_bucket() {
        let mut buckets = classify(vec![record("EVENT_EXAMPLE", 1)]).unwrap();
        assert!(buckets.bucket(EventKind::Task).is_empty());
        assert!(buckets.take(EventKind::Task).is_empty());
    }

    #[test]
    fn unrecognized_kinds_are_retained_but_unrouted() {
        let buckets = classify(vec![
            record("EVENT_EXAMPLE", 1),
            record("AUDIT_EXAMPLE", 2),
        ])
        .unwrap();

        assert_eq!(buckets.unrecognized_kinds(), vec!["AUDIT_EXAMPLE"]);
        assert_eq!(buckets.total_records(), 2);
        assert_eq!(buckets.bucket(EventKind::Example).len(), 1);
    }
}
