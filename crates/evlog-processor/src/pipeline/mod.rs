//! Change-log batch processing pipeline
//!
//! Decode → classify → route → aggregate: each batch of change-log
//! records is decoded to normalized records, grouped by event kind, routed
//! to the inline direct processor or the remote task dispatcher, and the
//! per-record failures from both paths are merged into one report.

pub mod classifier;
pub mod coordinator;
pub mod decoder;
pub mod direct;
pub mod dispatch;
pub mod types;

// Re-export commonly used types
pub use classifier::{classify, EventBuckets};
pub use coordinator::{BatchCoordinator, Collaborators};
pub use decoder::{decode_stream, DecodedBatch, StreamEvent};
pub use direct::process_direct;
pub use dispatch::{dispatch_tasks, DispatchConfig};
pub use types::{
    DispatchOutcome, EventKind, FailureEntry, FailureReport, NormalizedRecord, EVENT_TYPE_FIELD,
};
