//! Task Ledger - shared per-task artifacts and writer outputs

use crate::db::Resource;
use crate::{StoreConfig, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use stratum_domain::{now_secs, Artifact, TaskRecord};

/// Per-task records
///
/// A record must be initialised before artifacts or outputs can be attached.
/// Artifacts and outputs are last-write-wins per key.
pub struct TaskLedger {
    resource: Resource,
}

impl TaskLedger {
    pub(crate) fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let resource = Resource::open(config, "tasks", include_str!("schema/tasks.sql"))?;
        Ok(Self { resource })
    }

    /// Create the record for a task
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyInitialized`] if the task exists. The existing
    /// record is left untouched.
    pub fn init(&self, task_id: &str, prompt: &str) -> Result<(), StoreError> {
        let conn = self.resource.lock()?;
        let changed = conn.execute(
            "INSERT OR IGNORE INTO tasks (task_id, prompt, created_at) VALUES (?1, ?2, ?3)",
            params![task_id, prompt, now_secs() as i64],
        )?;
        if changed == 0 {
            return Err(StoreError::AlreadyInitialized(task_id.to_string()));
        }
        tracing::debug!("Task {} initialized", task_id);
        Ok(())
    }

    /// Set an artifact, replacing any previous value under `key`
    pub fn write_artifact(&self, task_id: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.resource.lock()?;
        require_task(&conn, task_id)?;
        conn.execute(
            "INSERT INTO task_artifacts (task_id, key, value, timestamp)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(task_id, key) DO UPDATE SET
                 value = excluded.value,
                 timestamp = excluded.timestamp",
            params![task_id, key, value, now_secs() as i64],
        )?;
        tracing::debug!("Task {} artifact {} written", task_id, key);
        Ok(())
    }

    /// Set a writer's output, replacing any previous output from that writer
    pub fn write_output(&self, task_id: &str, writer_id: &str, output: &str) -> Result<(), StoreError> {
        let conn = self.resource.lock()?;
        require_task(&conn, task_id)?;
        conn.execute(
            "INSERT INTO task_outputs (task_id, writer_id, output)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(task_id, writer_id) DO UPDATE SET output = excluded.output",
            params![task_id, writer_id, output],
        )?;
        tracing::debug!("Task {} output from {} written", task_id, writer_id);
        Ok(())
    }

    /// Read a full record
    pub fn read(&self, task_id: &str) -> Result<Option<TaskRecord>, StoreError> {
        let conn = self.resource.lock()?;
        let head = conn
            .query_row(
                "SELECT prompt, created_at FROM tasks WHERE task_id = ?1",
                params![task_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        let Some((prompt, created_at)) = head else {
            return Ok(None);
        };

        let mut record = TaskRecord {
            task_id: task_id.to_string(),
            prompt,
            created_at: created_at as u64,
            ..Default::default()
        };

        let mut stmt =
            conn.prepare("SELECT key, value, timestamp FROM task_artifacts WHERE task_id = ?1")?;
        let artifacts = stmt.query_map(params![task_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                Artifact {
                    value: row.get(1)?,
                    timestamp: row.get::<_, i64>(2)? as u64,
                },
            ))
        })?;
        for artifact in artifacts {
            let (key, artifact) = artifact?;
            record.artifacts.insert(key, artifact);
        }

        let mut stmt = conn.prepare("SELECT writer_id, output FROM task_outputs WHERE task_id = ?1")?;
        let outputs = stmt.query_map(params![task_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for output in outputs {
            let (writer, output) = output?;
            record.outputs.insert(writer, output);
        }

        Ok(Some(record))
    }

    /// Number of initialised tasks
    pub fn len(&self) -> Result<usize, StoreError> {
        let conn = self.resource.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether no task has been initialised
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn require_task(conn: &Connection, task_id: &str) -> Result<(), StoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_id = ?1)",
        params![task_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::NotFound(format!("task {}", task_id)))
    }
}
