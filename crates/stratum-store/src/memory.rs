//! The shared store handle

use crate::canonical::{self, CanonicalStore};
use crate::disputes::DisputeLog;
use crate::low_trust::{self, LowTrustLog};
use crate::scratch::ScratchPad;
use crate::tasks::TaskLedger;
use crate::{StoreConfig, StoreError};
use std::fmt;
use stratum_domain::traits::{FlagUpdate, KnowledgeStore, PromotionOutcome, PromotionRequest};
use stratum_domain::{
    CanonicalEntry, CanonicalKey, Confidence, DisputeId, EntryId, EntryState, LowTrustEntry,
};

/// First-use canonical entries: (namespace, key, content)
const SEED_ENTRIES: &[(&str, &str, &str)] = &[
    (
        "identity",
        "system",
        "Stratum is a layered knowledge store shared by a tree of cooperating agents. \
         Agents record what they learn as low-trust claims; a curator decides which \
         claims become canonical facts.",
    ),
    (
        "standards",
        "memory_rules",
        "Canonical facts are never overwritten. A claim that contradicts a canonical \
         fact is recorded as a dispute for a human to resolve. Low-trust claims are \
         tentative until promoted, and every claim ends promoted, dismissed, or pending.",
    ),
];

/// Counts across every resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSummary {
    /// Canonical entries
    pub canonical: usize,
    /// Low-trust entries still pending
    pub low_trust_live: usize,
    /// All low-trust entries
    pub low_trust_total: usize,
    /// Initialised tasks
    pub tasks: usize,
    /// Unresolved disputes
    pub open_disputes: usize,
}

impl fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Canonical:{} | Low-trust:{} live / {} total | Tasks:{} | Disputes:{} open",
            self.canonical, self.low_trust_live, self.low_trust_total, self.tasks, self.open_disputes
        )
    }
}

/// One handle over all five resources
///
/// Share it behind an `Arc`; every method takes `&self` and each resource
/// serialises its own mutations.
///
/// # Examples
///
/// ```
/// use stratum_store::MemoryStore;
///
/// let store = MemoryStore::in_memory().unwrap();
/// let id = store.low_trust().append("X=5", "reasoning", "research", "t1", 0.8).unwrap();
/// assert!(store.low_trust().get(id).unwrap().unwrap().is_pending());
/// ```
pub struct MemoryStore {
    canonical: CanonicalStore,
    low_trust: LowTrustLog,
    disputes: DisputeLog,
    tasks: TaskLedger,
    scratch: ScratchPad,
}

impl MemoryStore {
    /// Open every resource described by `config`, seeding if enabled
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = Self {
            canonical: CanonicalStore::open(config)?,
            low_trust: LowTrustLog::open(config)?,
            disputes: DisputeLog::open(config)?,
            tasks: TaskLedger::open(config)?,
            scratch: ScratchPad::open(config)?,
        };

        if config.seed_canonical {
            store.seed_canonical()?;
        }

        match &config.data_dir {
            Some(dir) => tracing::info!("Memory store opened at {}", dir.display()),
            None => tracing::debug!("In-memory store opened"),
        }
        Ok(store)
    }

    /// Private in-memory store with default seeding
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(&StoreConfig::in_memory())
    }

    /// The verified layer
    pub fn canonical(&self) -> &CanonicalStore {
        &self.canonical
    }

    /// The unverified layer
    pub fn low_trust(&self) -> &LowTrustLog {
        &self.low_trust
    }

    /// Recorded conflicts
    pub fn disputes(&self) -> &DisputeLog {
        &self.disputes
    }

    /// Per-task records
    pub fn tasks(&self) -> &TaskLedger {
        &self.tasks
    }

    /// Private per-writer notes
    pub fn scratch(&self) -> &ScratchPad {
        &self.scratch
    }

    /// Write the identity and standards entries where absent
    ///
    /// Returns how many were written. Existing content is never touched, so
    /// calling this repeatedly is harmless.
    pub fn seed_canonical(&self) -> Result<usize, StoreError> {
        let conn = self.canonical.resource().lock()?;
        let mut written = 0;
        for (namespace, key, content) in SEED_ENTRIES {
            let key = CanonicalKey::new(*namespace, *key).map_err(StoreError::InvalidData)?;
            if canonical::insert(&conn, &key, content, "seed", Confidence::CERTAIN, true)? {
                written += 1;
            }
        }
        if written > 0 {
            tracing::info!("Seeded {} canonical entries", written);
        }
        Ok(written)
    }

    /// Counts across every resource
    pub fn summary(&self) -> Result<StoreSummary, StoreError> {
        let (low_trust_live, low_trust_total) = self.low_trust.counts()?;
        Ok(StoreSummary {
            canonical: self.canonical.len()?,
            low_trust_live,
            low_trust_total,
            tasks: self.tasks.len()?,
            open_disputes: self.disputes.open_count()?,
        })
    }
}

impl KnowledgeStore for MemoryStore {
    type Error = StoreError;

    fn pending_entries(&self, task_id: &str) -> Result<Vec<LowTrustEntry>, StoreError> {
        self.low_trust.pending(task_id)
    }

    fn get_entry(&self, id: EntryId) -> Result<Option<LowTrustEntry>, StoreError> {
        self.low_trust.get(id)
    }

    fn canonical_slice(&self, limit: usize) -> Result<Vec<CanonicalEntry>, StoreError> {
        self.canonical.slice(limit)
    }

    /// Lock order is low-trust then canonical; nothing else takes both.
    fn promote_entry(&self, request: &PromotionRequest) -> Result<PromotionOutcome, StoreError> {
        let entries = self.low_trust.resource().lock()?;
        let entry = match low_trust::fetch(&entries, request.entry_id)? {
            Some(entry) => entry,
            None => return Ok(PromotionOutcome::EntryNotFound),
        };
        if !entry.is_pending() {
            return Ok(PromotionOutcome::NotPending(entry.state()));
        }

        let facts = self.canonical.resource().lock()?;
        let inserted = canonical::insert(
            &facts,
            &request.target,
            &entry.claim,
            &request.source,
            request.confidence,
            false,
        )?;
        if !inserted {
            tracing::warn!(
                "Promotion of {} rejected: {} already exists",
                request.entry_id,
                request.target
            );
            return Ok(PromotionOutcome::KeyExists(request.target.clone()));
        }

        low_trust::set_flag(&entries, request.entry_id, EntryState::Promoted)?;
        tracing::info!("Promoted {} -> {}", request.entry_id, request.target);
        Ok(PromotionOutcome::Promoted(request.target.clone()))
    }

    fn dismiss_entry(&self, id: EntryId) -> Result<FlagUpdate, StoreError> {
        self.low_trust.mark_dismissed(id)
    }

    fn record_dispute(
        &self,
        entry_id: EntryId,
        canonical_key: &str,
        reason: &str,
    ) -> Result<DisputeId, StoreError> {
        self.disputes.add(entry_id, canonical_key, reason)
    }
}
