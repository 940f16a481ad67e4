//! Canonical Store - keyed, namespaced, never-overwritten facts

use crate::db::Resource;
use crate::{StoreConfig, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use stratum_domain::{now_secs, CanonicalEntry, CanonicalKey, Confidence};

const COLUMNS: &str =
    "id, namespace, content, source, confidence, confirmed_by_human, last_verified";

/// The verified layer
///
/// A canonical id, once written, is permanent: every later write to the same
/// id fails with [`StoreError::AlreadyExists`]. The check and the insert
/// happen in one statement under the resource lock, so two writers racing
/// on a new id produce exactly one winner.
pub struct CanonicalStore {
    resource: Resource,
}

impl CanonicalStore {
    pub(crate) fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let resource = Resource::open(config, "canonical", include_str!("schema/canonical.sql"))?;
        Ok(Self { resource })
    }

    pub(crate) fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Write a new canonical entry
    ///
    /// `last_verified` is set to now. The row is committed before this
    /// returns, so any reader sees it immediately.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] if the id is taken. Callers must not
    /// retry; the remedy is to record a dispute.
    pub fn write(
        &self,
        key: &CanonicalKey,
        content: &str,
        source: &str,
        confidence: Confidence,
        confirmed_by_human: bool,
    ) -> Result<CanonicalKey, StoreError> {
        let conn = self.resource.lock()?;
        if !insert(&conn, key, content, source, confidence, confirmed_by_human)? {
            tracing::warn!("Rejected canonical overwrite of {}", key);
            return Err(StoreError::AlreadyExists(key.id()));
        }
        tracing::info!("Canonical[{}] written (source: {})", key, source);
        Ok(key.clone())
    }

    /// Read all entries, or those whose id starts with `prefix`, in write order
    ///
    /// Never fails for an unknown prefix; the result is simply empty.
    pub fn read(&self, prefix: Option<&str>) -> Result<Vec<CanonicalEntry>, StoreError> {
        let conn = self.resource.lock()?;
        match prefix {
            Some(prefix) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM canonical_entries
                     WHERE substr(id, 1, length(?1)) = ?1 ORDER BY seq",
                    COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![prefix], row_to_entry)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM canonical_entries ORDER BY seq",
                    COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], row_to_entry)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }
        }
    }

    /// The first `limit` entries in write order
    pub fn slice(&self, limit: usize) -> Result<Vec<CanonicalEntry>, StoreError> {
        let conn = self.resource.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM canonical_entries ORDER BY seq LIMIT ?1",
            COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Look up one entry by storage id (`<namespace>/<key>`)
    pub fn get(&self, id: &str) -> Result<Option<CanonicalEntry>, StoreError> {
        let conn = self.resource.lock()?;
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM canonical_entries WHERE id = ?1", COLUMNS),
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Whether an id is present
    pub fn contains(&self, key: &CanonicalKey) -> Result<bool, StoreError> {
        Ok(self.get(&key.id())?.is_some())
    }

    /// Number of entries
    pub fn len(&self) -> Result<usize, StoreError> {
        let conn = self.resource.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM canonical_entries", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Insert unless the id exists; returns whether a row was written
pub(crate) fn insert(
    conn: &Connection,
    key: &CanonicalKey,
    content: &str,
    source: &str,
    confidence: Confidence,
    confirmed_by_human: bool,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO canonical_entries
         (id, namespace, content, source, confidence, confirmed_by_human, last_verified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            key.id(),
            key.namespace(),
            content,
            source,
            confidence.value(),
            confirmed_by_human,
            now_secs() as i64,
        ],
    )?;
    Ok(changed == 1)
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CanonicalEntry> {
    Ok(CanonicalEntry {
        id: row.get(0)?,
        namespace: row.get(1)?,
        content: row.get(2)?,
        source: row.get(3)?,
        confidence: Confidence::clamped(row.get(4)?),
        confirmed_by_human: row.get(5)?,
        last_verified: row.get::<_, i64>(6)? as u64,
    })
}
