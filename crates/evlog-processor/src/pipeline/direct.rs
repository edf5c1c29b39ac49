//! Direct processor for lightweight events
//!
//! Handles one bucket inline: per record, a derived message row goes to
//! the relational store and a derived item to the mirror store. A failed
//! record is recorded and processing moves on; there is no retry and no
//! rollback of a relational write whose mirror write then fails, so a
//! failed record may still have left one side effect behind.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use super::types::NormalizedRecord;
use crate::error::WriteError;
use crate::stores::{MirrorStore, RelationalStore};

/// Process one bucket of lightweight events, returning the records that
/// failed either write
pub async fn process_direct(
    records: Vec<NormalizedRecord>,
    table: &str,
    relational: &dyn RelationalStore,
    mirror: &dyn MirrorStore,
) -> Vec<NormalizedRecord> {
    let mut failures = Vec::new();

    for record in records {
        if let Err(err) = write_record(&record, table, relational, mirror).await {
            warn!(error = %err, record = %record.to_json_string(), "failed to persist direct record");
            failures.push(record);
        }
    }

    failures
}

async fn write_record(
    record: &NormalizedRecord,
    table: &str,
    relational: &dyn RelationalStore,
    mirror: &dyn MirrorStore,
) -> Result<(), WriteError> {
    let generated_at = Utc::now().to_rfc3339();

    let mut row = serde_json::Map::new();
    row.insert(
        "message".to_string(),
        Value::String(format!(
            "This is a sample message on {generated_at}: {}",
            record.to_json_string()
        )),
    );
    relational.write(table, &row).await?;

    let mut item = serde_json::Map::new();
    item.insert("partition".to_string(), json!("a"));
    item.insert("sort".to_string(), json!("b"));
    item.insert("payload".to_string(), json!(format!("example {generated_at}")));
    mirror.put_item(&item).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct RecordingRelational {
        writes: Mutex<Vec<(String, serde_json::Map<String, Value>)>>,
        fail_calls: HashSet<usize>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RelationalStore for RecordingRelational {
        async fn write(
            &self,
            table: &str,
            fields: &serde_json::Map<String, Value>,
        ) -> Result<(), WriteError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_calls.contains(&call) {
                return Err(WriteError::Database("insert rejected".to_string()));
            }
            self.writes
                .lock()
                .unwrap()
                .push((table.to_string(), fields.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingMirror {
        items: Mutex<Vec<serde_json::Map<String, Value>>>,
        fail_calls: HashSet<usize>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MirrorStore for RecordingMirror {
        async fn put_item(
            &self,
            item: &serde_json::Map<String, Value>,
        ) -> Result<(), WriteError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_calls.contains(&call) {
                return Err(WriteError::Unavailable("mirror offline".to_string()));
            }
            self.items.lock().unwrap().push(item.clone());
            Ok(())
        }
    }

    fn record(id: u32) -> NormalizedRecord {
        [
            ("event_type".to_string(), json!("EVENT_EXAMPLE")),
            ("id".to_string(), json!(id.to_string())),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn successful_records_hit_both_stores() {
        let relational = RecordingRelational::default();
        let mirror = RecordingMirror::default();

        let failures =
            process_direct(vec![record(1), record(2)], "example", &relational, &mirror).await;

        assert!(failures.is_empty());
        let writes = relational.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, "example");
        let message = writes[0].1["message"].as_str().unwrap();
        assert!(message.starts_with("This is a sample message on "));
        assert!(message.contains("\"id\":\"1\""));

        let items = mirror.items.lock().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["partition"], json!("a"));
        assert_eq!(items[0]["sort"], json!("b"));
        assert!(items[0]["payload"].as_str().unwrap().starts_with("example "));
    }

    #[tokio::test]
    async fn failed_write_records_failure_and_continues() {
        let relational = RecordingRelational {
            fail_calls: HashSet::from([1]),
            ..Default::default()
        };
        let mirror = RecordingMirror::default();

        let failures = process_direct(
            vec![record(1), record(2), record(3)],
            "example",
            &relational,
            &mirror,
        )
        .await;

        // exactly the one failing record is reported, the rest landed in both stores
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].get("id"), Some(&json!("2")));
        assert_eq!(relational.writes.lock().unwrap().len(), 2);
        assert_eq!(mirror.items.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mirror_failure_does_not_undo_relational_write() {
        let relational = RecordingRelational::default();
        let mirror = RecordingMirror {
            fail_calls: HashSet::from([0]),
            ..Default::default()
        };

        let failures = process_direct(vec![record(1)], "example", &relational, &mirror).await;

        // record is reported failed, but the relational row is already durable
        assert_eq!(failures.len(), 1);
        assert_eq!(relational.writes.lock().unwrap().len(), 1);
        assert!(mirror.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn relational_failure_skips_the_mirror_write() {
        let relational = RecordingRelational {
            fail_calls: HashSet::from([0]),
            ..Default::default()
        };
        let mirror = RecordingMirror::default();

        let failures = process_direct(vec![record(1)], "example", &relational, &mirror).await;

        assert_eq!(failures.len(), 1);
        assert!(mirror.items.lock().unwrap().is_empty());
    }
}
