//! Task ledger records and scratch notes

use std::collections::BTreeMap;

/// A named artifact stored in a task record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Artifact content
    pub value: String,

    /// Last write time (seconds since epoch)
    pub timestamp: u64,
}

/// Shared record for one top-level unit of work
///
/// Artifacts and outputs are last-write-wins per key. Low-trust entries are
/// not nested here; they are filtered by `task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskRecord {
    /// Task identifier
    pub task_id: String,

    /// The prompt that started the task
    pub prompt: String,

    /// Creation timestamp (seconds since epoch)
    pub created_at: u64,

    /// Artifacts by key
    pub artifacts: BTreeMap<String, Artifact>,

    /// Latest output per writer
    pub outputs: BTreeMap<String, String>,
}

impl TaskRecord {
    /// Whether the record carries neither artifacts nor outputs
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.outputs.is_empty()
    }
}

/// A private note in a writer's scratch space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchNote {
    /// Note text
    pub note: String,

    /// Write time (seconds since epoch)
    pub timestamp: u64,
}
