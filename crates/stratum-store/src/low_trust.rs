//! Low-trust Log - open-write, append-ordered unverified claims

use crate::db::{id_column, id_to_bytes, Resource};
use crate::{StoreConfig, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use stratum_domain::traits::FlagUpdate;
use stratum_domain::{now_secs, Confidence, EntryId, EntryState, LowTrustEntry};

const COLUMNS: &str =
    "id, claim, source, origin, task_id, confidence, created_at, promoted, dismissed";

/// Query criteria for low-trust entries
///
/// Every provided field filters by equality. Results are always in append order.
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    /// Filter by task
    pub task_id: Option<String>,

    /// Filter by the promoted flag
    pub promoted: Option<bool>,

    /// Filter by the dismissed flag
    pub dismissed: Option<bool>,
}

impl EntryQuery {
    /// Entries of one task
    pub fn for_task(task_id: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            ..Default::default()
        }
    }

    /// Restrict to entries with the given promoted flag
    pub fn promoted(mut self, promoted: bool) -> Self {
        self.promoted = Some(promoted);
        self
    }

    /// Restrict to entries with the given dismissed flag
    pub fn dismissed(mut self, dismissed: bool) -> Self {
        self.dismissed = Some(dismissed);
        self
    }
}

/// The unverified layer
///
/// Appends always succeed. Flag updates are index-addressed (`UPDATE` by id)
/// and guarded so an entry never carries both terminal flags.
pub struct LowTrustLog {
    resource: Resource,
}

impl LowTrustLog {
    pub(crate) fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let resource = Resource::open(config, "low_trust", include_str!("schema/low_trust.sql"))?;
        Ok(Self { resource })
    }

    pub(crate) fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Append an unverified claim and return its fresh id
    ///
    /// The claim text is not validated; confidence is clamped into `[0, 1]`.
    pub fn append(
        &self,
        claim: &str,
        source: &str,
        origin: &str,
        task_id: &str,
        confidence: f64,
    ) -> Result<EntryId, StoreError> {
        let id = EntryId::new();
        let conn = self.resource.lock()?;
        conn.execute(
            "INSERT INTO low_trust_entries
             (id, claim, source, origin, task_id, confidence, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id_to_bytes(id.value()),
                claim,
                source,
                origin,
                task_id,
                Confidence::clamped(confidence).value(),
                now_secs() as i64,
            ],
        )?;
        tracing::debug!("Low-trust +{} from {} on task {}", id, origin, task_id);
        Ok(id)
    }

    /// Entries matching `query`, in append order
    pub fn query(&self, query: &EntryQuery) -> Result<Vec<LowTrustEntry>, StoreError> {
        let mut sql = format!("SELECT {} FROM low_trust_entries WHERE 1=1", COLUMNS);
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(task_id) = &query.task_id {
            sql.push_str(" AND task_id = ?");
            args.push(Box::new(task_id.clone()));
        }
        if let Some(promoted) = query.promoted {
            sql.push_str(" AND promoted = ?");
            args.push(Box::new(promoted));
        }
        if let Some(dismissed) = query.dismissed {
            sql.push_str(" AND dismissed = ?");
            args.push(Box::new(dismissed));
        }
        sql.push_str(" ORDER BY seq");

        let conn = self.resource.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let arg_refs: Vec<&dyn rusqlite::ToSql> = args.iter().map(|a| a.as_ref()).collect();
        let entries = stmt
            .query_map(&arg_refs[..], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Pending (neither promoted nor dismissed) entries of a task, in append order
    pub fn pending(&self, task_id: &str) -> Result<Vec<LowTrustEntry>, StoreError> {
        self.query(&EntryQuery::for_task(task_id).promoted(false).dismissed(false))
    }

    /// The most recent `limit` pending entries of a task, oldest first
    pub fn recent_pending(
        &self,
        task_id: &str,
        limit: usize,
    ) -> Result<Vec<LowTrustEntry>, StoreError> {
        let conn = self.resource.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM low_trust_entries
             WHERE task_id = ?1 AND promoted = 0 AND dismissed = 0
             ORDER BY seq DESC LIMIT ?2",
            COLUMNS
        ))?;
        let mut entries = stmt
            .query_map(params![task_id, limit as i64], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();
        Ok(entries)
    }

    /// Look up one entry
    pub fn get(&self, id: EntryId) -> Result<Option<LowTrustEntry>, StoreError> {
        let conn = self.resource.lock()?;
        fetch(&conn, id)
    }

    /// Mark an entry promoted
    ///
    /// Idempotent. An unknown id is a no-op reported as [`FlagUpdate::NotFound`];
    /// a dismissed entry is left alone and reported as [`FlagUpdate::Blocked`].
    pub fn mark_promoted(&self, id: EntryId) -> Result<FlagUpdate, StoreError> {
        let conn = self.resource.lock()?;
        set_flag(&conn, id, EntryState::Promoted)
    }

    /// Mark an entry dismissed
    ///
    /// Idempotent. An unknown id is a no-op reported as [`FlagUpdate::NotFound`];
    /// a promoted entry is left alone and reported as [`FlagUpdate::Blocked`].
    pub fn mark_dismissed(&self, id: EntryId) -> Result<FlagUpdate, StoreError> {
        let conn = self.resource.lock()?;
        set_flag(&conn, id, EntryState::Dismissed)
    }

    /// Count of (pending, total) entries
    pub fn counts(&self) -> Result<(usize, usize), StoreError> {
        let conn = self.resource.lock()?;
        let (pending, total): (i64, i64) = conn.query_row(
            "SELECT COALESCE(SUM(promoted = 0 AND dismissed = 0), 0), COUNT(*)
             FROM low_trust_entries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((pending as usize, total as usize))
    }
}

/// Read one entry on an already-locked connection
pub(crate) fn fetch(conn: &Connection, id: EntryId) -> Result<Option<LowTrustEntry>, StoreError> {
    let entry = conn
        .query_row(
            &format!("SELECT {} FROM low_trust_entries WHERE id = ?1", COLUMNS),
            params![id_to_bytes(id.value())],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

/// Move an entry into a terminal state on an already-locked connection
pub(crate) fn set_flag(
    conn: &Connection,
    id: EntryId,
    target: EntryState,
) -> Result<FlagUpdate, StoreError> {
    let current = match fetch(conn, id)? {
        Some(entry) => entry.state(),
        None => return Ok(FlagUpdate::NotFound),
    };

    let column = match (target, current) {
        (_, state) if state == target => return Ok(FlagUpdate::Unchanged),
        (_, EntryState::Promoted) | (_, EntryState::Dismissed) => {
            return Ok(FlagUpdate::Blocked(current))
        }
        (EntryState::Promoted, EntryState::Pending) => "promoted",
        (EntryState::Dismissed, EntryState::Pending) => "dismissed",
        (EntryState::Pending, EntryState::Pending) => return Ok(FlagUpdate::Unchanged),
    };

    conn.execute(
        &format!(
            "UPDATE low_trust_entries SET {} = 1
             WHERE id = ?1 AND promoted = 0 AND dismissed = 0",
            column
        ),
        params![id_to_bytes(id.value())],
    )?;
    tracing::debug!("Low-trust {} marked {}", id, target);
    Ok(FlagUpdate::Applied)
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<LowTrustEntry> {
    Ok(LowTrustEntry {
        id: EntryId::from_value(id_column(row, 0)?),
        claim: row.get(1)?,
        source: row.get(2)?,
        origin: row.get(3)?,
        task_id: row.get(4)?,
        confidence: Confidence::clamped(row.get(5)?),
        created_at: row.get::<_, i64>(6)? as u64,
        promoted: row.get(7)?,
        dismissed: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> LowTrustLog {
        LowTrustLog::open(&StoreConfig::in_memory()).unwrap()
    }

    #[test]
    fn test_append_and_get() {
        let log = log();
        let id = log.append("X=5", "reasoning", "research", "t1", 0.8).unwrap();

        let entry = log.get(id).unwrap().unwrap();
        assert_eq!(entry.claim, "X=5");
        assert_eq!(entry.origin, "research");
        assert_eq!(entry.task_id, "t1");
        assert_eq!(entry.confidence.value(), 0.8);
        assert!(entry.is_pending());
    }

    #[test]
    fn test_append_clamps_confidence() {
        let log = log();
        let id = log.append("c", "s", "w", "t1", 4.0).unwrap();
        assert_eq!(log.get(id).unwrap().unwrap().confidence.value(), 1.0);
    }

    #[test]
    fn test_append_ids_are_unique() {
        let log = log();
        let a = log.append("same", "s", "w", "t1", 0.5).unwrap();
        let b = log.append("same", "s", "w", "t1", 0.5).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_query_preserves_append_order() {
        let log = log();
        let ids: Vec<_> = (0..5)
            .map(|i| log.append(&format!("claim {}", i), "s", "w", "t1", 0.5).unwrap())
            .collect();
        log.append("other task", "s", "w", "t2", 0.5).unwrap();

        let entries = log.query(&EntryQuery::for_task("t1")).unwrap();
        let got: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(got, ids);
    }

    #[test]
    fn test_query_by_promoted() {
        let log = log();
        let a = log.append("a", "s", "w", "t1", 0.5).unwrap();
        let b = log.append("b", "s", "w", "t1", 0.5).unwrap();
        log.mark_promoted(a).unwrap();

        let promoted = log.query(&EntryQuery::for_task("t1").promoted(true)).unwrap();
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].id, a);

        let pending = log.pending("t1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b);
    }

    #[test]
    fn test_flags_are_idempotent() {
        let log = log();
        let id = log.append("a", "s", "w", "t1", 0.5).unwrap();
        assert_eq!(log.mark_dismissed(id).unwrap(), FlagUpdate::Applied);
        assert_eq!(log.mark_dismissed(id).unwrap(), FlagUpdate::Unchanged);
    }

    #[test]
    fn test_terminal_states_are_exclusive() {
        let log = log();
        let a = log.append("a", "s", "w", "t1", 0.5).unwrap();
        let b = log.append("b", "s", "w", "t1", 0.5).unwrap();

        log.mark_promoted(a).unwrap();
        assert_eq!(log.mark_dismissed(a).unwrap(), FlagUpdate::Blocked(EntryState::Promoted));

        log.mark_dismissed(b).unwrap();
        assert_eq!(log.mark_promoted(b).unwrap(), FlagUpdate::Blocked(EntryState::Dismissed));

        let a = log.get(a).unwrap().unwrap();
        let b = log.get(b).unwrap().unwrap();
        assert!(a.promoted && !a.dismissed);
        assert!(b.dismissed && !b.promoted);
    }

    #[test]
    fn test_flags_on_unknown_id_are_noops() {
        let log = log();
        let existing = log.append("a", "s", "w", "t1", 0.5).unwrap();
        let ghost = EntryId::new();

        assert_eq!(log.mark_promoted(ghost).unwrap(), FlagUpdate::NotFound);
        assert_eq!(log.mark_dismissed(ghost).unwrap(), FlagUpdate::NotFound);

        assert!(log.get(ghost).unwrap().is_none());
        assert_eq!(log.counts().unwrap(), (1, 1));
        assert!(log.get(existing).unwrap().unwrap().is_pending());
    }

    #[test]
    fn test_recent_pending_window() {
        let log = log();
        for i in 0..10 {
            log.append(&format!("claim {}", i), "s", "w", "t1", 0.5).unwrap();
        }
        let recent = log.recent_pending("t1", 3).unwrap();
        let claims: Vec<_> = recent.iter().map(|e| e.claim.as_str()).collect();
        assert_eq!(claims, vec!["claim 7", "claim 8", "claim 9"]);
    }

    #[test]
    fn test_counts_on_empty_log() {
        assert_eq!(log().counts().unwrap(), (0, 0));
    }
}
