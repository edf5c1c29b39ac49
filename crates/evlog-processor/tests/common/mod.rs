//! In-memory fakes for the collaborator interfaces

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use evlog_processor::error::{LaunchError, WriteError};
use evlog_processor::pipeline::Collaborators;
use evlog_processor::stores::{
    ConnectionHandle, LaunchFailure, LaunchReceipt, MirrorStore, RelationalStore, TaskLauncher,
    TaskLaunchSpec,
};

/// Recording relational store; optionally fails writes whose message
/// mentions a marker substring
#[derive(Default)]
pub struct FakeRelational {
    pub writes: Mutex<Vec<(String, serde_json::Map<String, Value>)>>,
    pub fail_when_message_contains: Option<String>,
}

#[async_trait]
impl RelationalStore for FakeRelational {
    async fn write(
        &self,
        table: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<(), WriteError> {
        if let Some(marker) = &self.fail_when_message_contains {
            let message = fields
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if message.contains(marker.as_str()) {
                return Err(WriteError::Database("insert rejected".to_string()));
            }
        }
        self.writes
            .lock()
            .unwrap()
            .push((table.to_string(), fields.clone()));
        Ok(())
    }
}

/// Recording mirror store
#[derive(Default)]
pub struct FakeMirror {
    pub items: Mutex<Vec<serde_json::Map<String, Value>>>,
}

#[async_trait]
impl MirrorStore for FakeMirror {
    async fn put_item(&self, item: &serde_json::Map<String, Value>) -> Result<(), WriteError> {
        self.items.lock().unwrap().push(item.clone());
        Ok(())
    }
}

/// Launcher scripted per record id (taken from the SOURCE_EVENT payload)
#[derive(Default)]
pub struct FakeLauncher {
    pub partial_ids: HashSet<String>,
    pub error_ids: HashSet<String>,
    pub specs: Mutex<Vec<TaskLaunchSpec>>,
}

impl FakeLauncher {
    pub fn partial_on(ids: &[&str]) -> Self {
        Self {
            partial_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn spec_id(spec: &TaskLaunchSpec) -> Option<String> {
        let source_event = spec
            .environment
            .iter()
            .find(|(name, _)| name == "SOURCE_EVENT")
            .map(|(_, value)| value.clone())?;
        let parsed: Value = serde_json::from_str(&source_event).ok()?;
        parsed["id"].as_str().map(str::to_string)
    }
}

#[async_trait]
impl TaskLauncher for FakeLauncher {
    async fn launch(&self, spec: &TaskLaunchSpec) -> Result<LaunchReceipt, LaunchError> {
        self.specs.lock().unwrap().push(spec.clone());
        let id = Self::spec_id(spec).unwrap_or_default();
        if self.error_ids.contains(&id) {
            return Err(LaunchError::Transport("connection reset".to_string()));
        }
        if self.partial_ids.contains(&id) {
            return Ok(LaunchReceipt {
                launched: vec![],
                failures: vec![LaunchFailure {
                    arn: None,
                    reason: "insufficient capacity".to_string(),
                }],
            });
        }
        Ok(LaunchReceipt {
            launched: vec![format!("arn:task/{id}")],
            failures: vec![],
        })
    }
}

/// Connection handle that counts release calls
#[derive(Default)]
pub struct CountingConnection {
    pub released: AtomicUsize,
}

impl CountingConnection {
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionHandle for CountingConnection {
    async fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handles to every fake, plus the bundle the coordinator consumes
pub struct FakeWorld {
    pub relational: Arc<FakeRelational>,
    pub mirror: Arc<FakeMirror>,
    pub launcher: Arc<FakeLauncher>,
    pub connection: Arc<CountingConnection>,
}

impl FakeWorld {
    pub fn new(relational: FakeRelational, launcher: FakeLauncher) -> Self {
        Self {
            relational: Arc::new(relational),
            mirror: Arc::new(FakeMirror::default()),
            launcher: Arc::new(launcher),
            connection: Arc::new(CountingConnection::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            relational: self.relational.clone(),
            mirror: self.mirror.clone(),
            launcher: self.launcher.clone(),
            connection: self.connection.clone(),
        }
    }
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self::new(FakeRelational::default(), FakeLauncher::default())
    }
}
