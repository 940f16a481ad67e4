//! Scratch space - private notes per (writer, task)

use crate::db::Resource;
use crate::{StoreConfig, StoreError};
use rusqlite::params;
use stratum_domain::{now_secs, ScratchNote};

/// Private working notes
///
/// Every operation is keyed by `(writer_id, task_id)`; nothing here is
/// visible to other writers.
pub struct ScratchPad {
    resource: Resource,
}

impl ScratchPad {
    pub(crate) fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let resource = Resource::open(config, "scratch", include_str!("schema/scratch.sql"))?;
        Ok(Self { resource })
    }

    /// Append a note
    pub fn write(&self, writer_id: &str, task_id: &str, note: &str) -> Result<(), StoreError> {
        let conn = self.resource.lock()?;
        conn.execute(
            "INSERT INTO scratch_notes (writer_id, task_id, note, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![writer_id, task_id, note, now_secs() as i64],
        )?;
        Ok(())
    }

    /// All notes for the pair, oldest first
    pub fn read(&self, writer_id: &str, task_id: &str) -> Result<Vec<ScratchNote>, StoreError> {
        let conn = self.resource.lock()?;
        let mut stmt = conn.prepare(
            "SELECT note, timestamp FROM scratch_notes
             WHERE writer_id = ?1 AND task_id = ?2 ORDER BY seq",
        )?;
        let notes = stmt
            .query_map(params![writer_id, task_id], row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// The last `limit` notes for the pair, oldest first
    pub fn recent(
        &self,
        writer_id: &str,
        task_id: &str,
        limit: usize,
    ) -> Result<Vec<ScratchNote>, StoreError> {
        let conn = self.resource.lock()?;
        let mut stmt = conn.prepare(
            "SELECT note, timestamp FROM scratch_notes
             WHERE writer_id = ?1 AND task_id = ?2 ORDER BY seq DESC LIMIT ?3",
        )?;
        let mut notes = stmt
            .query_map(params![writer_id, task_id, limit as i64], row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;
        notes.reverse();
        Ok(notes)
    }

    /// Delete all notes for the pair; returns how many were removed
    pub fn clear(&self, writer_id: &str, task_id: &str) -> Result<usize, StoreError> {
        let conn = self.resource.lock()?;
        let removed = conn.execute(
            "DELETE FROM scratch_notes WHERE writer_id = ?1 AND task_id = ?2",
            params![writer_id, task_id],
        )?;
        tracing::debug!("Cleared {} scratch notes for {} on {}", removed, writer_id, task_id);
        Ok(removed)
    }
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScratchNote> {
    Ok(ScratchNote {
        note: row.get(0)?,
        timestamp: row.get::<_, i64>(1)? as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> ScratchPad {
        ScratchPad::open(&StoreConfig::in_memory()).unwrap()
    }

    #[test]
    fn test_notes_are_private_per_pair() {
        let pad = pad();
        pad.write("research", "t1", "mine").unwrap();
        pad.write("review", "t1", "theirs").unwrap();
        pad.write("research", "t2", "other task").unwrap();

        let notes = pad.read("research", "t1").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note, "mine");
    }

    #[test]
    fn test_recent_keeps_order() {
        let pad = pad();
        for i in 0..7 {
            pad.write("w", "t1", &format!("n{}", i)).unwrap();
        }
        let recent: Vec<_> = pad
            .recent("w", "t1", 3)
            .unwrap()
            .into_iter()
            .map(|n| n.note)
            .collect();
        assert_eq!(recent, vec!["n4", "n5", "n6"]);
    }

    #[test]
    fn test_clear() {
        let pad = pad();
        pad.write("w", "t1", "a").unwrap();
        pad.write("w", "t1", "b").unwrap();
        pad.write("x", "t1", "keep").unwrap();

        assert_eq!(pad.clear("w", "t1").unwrap(), 2);
        assert!(pad.read("w", "t1").unwrap().is_empty());
        assert_eq!(pad.read("x", "t1").unwrap().len(), 1);
    }
}
