//! Dispute Log

use crate::db::{id_column, id_to_bytes, Resource};
use crate::{StoreConfig, StoreError};
use rusqlite::params;
use stratum_domain::traits::FlagUpdate;
use stratum_domain::{now_secs, Dispute, DisputeId, EntryId};

const COLUMNS: &str = "id, entry_id, canonical_key, reason, created_at, resolved";

/// Append-only record of conflicts between low-trust claims and canonical ids
pub struct DisputeLog {
    resource: Resource,
}

impl DisputeLog {
    pub(crate) fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let resource = Resource::open(config, "disputes", include_str!("schema/disputes.sql"))?;
        Ok(Self { resource })
    }

    /// Record a dispute, unresolved
    ///
    /// Neither the entry nor the canonical id is checked for existence.
    pub fn add(
        &self,
        entry_id: EntryId,
        canonical_key: &str,
        reason: &str,
    ) -> Result<DisputeId, StoreError> {
        let id = DisputeId::new();
        let conn = self.resource.lock()?;
        conn.execute(
            "INSERT INTO disputes (id, entry_id, canonical_key, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id_to_bytes(id.value()),
                id_to_bytes(entry_id.value()),
                canonical_key,
                reason,
                now_secs() as i64,
            ],
        )?;
        tracing::info!("Dispute {} recorded: {} vs {}", id, entry_id, canonical_key);
        Ok(id)
    }

    /// Disputes in creation order, optionally filtered by resolution
    pub fn read(&self, resolved: Option<bool>) -> Result<Vec<Dispute>, StoreError> {
        let conn = self.resource.lock()?;
        let disputes = match resolved {
            Some(resolved) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM disputes WHERE resolved = ?1 ORDER BY seq",
                    COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![resolved], row_to_dispute)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("SELECT {} FROM disputes ORDER BY seq", COLUMNS))?;
                let rows = stmt
                    .query_map([], row_to_dispute)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(disputes)
    }

    /// Mark a dispute resolved (a human action)
    pub fn resolve(&self, id: DisputeId) -> Result<FlagUpdate, StoreError> {
        let conn = self.resource.lock()?;
        let changed = conn.execute(
            "UPDATE disputes SET resolved = 1 WHERE id = ?1 AND resolved = 0",
            params![id_to_bytes(id.value())],
        )?;
        if changed == 1 {
            tracing::info!("Dispute {} resolved", id);
            return Ok(FlagUpdate::Applied);
        }

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM disputes WHERE id = ?1)",
            params![id_to_bytes(id.value())],
            |row| row.get(0),
        )?;
        Ok(if exists { FlagUpdate::Unchanged } else { FlagUpdate::NotFound })
    }

    /// Number of unresolved disputes
    pub fn open_count(&self) -> Result<usize, StoreError> {
        let conn = self.resource.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM disputes WHERE resolved = 0", [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }
}

fn row_to_dispute(row: &rusqlite::Row<'_>) -> rusqlite::Result<Dispute> {
    Ok(Dispute {
        id: DisputeId::from_value(id_column(row, 0)?),
        low_trust_entry_id: EntryId::from_value(id_column(row, 1)?),
        canonical_key: row.get(2)?,
        reason: row.get(3)?,
        created_at: row.get::<_, i64>(4)? as u64,
        resolved: row.get(5)?,
    })
}
