//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the promotion pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{CanonicalEntry, CanonicalKey, Confidence, DisputeId, EntryId, EntryState, LowTrustEntry};

/// Result of a flag update on a low-trust entry or dispute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagUpdate {
    /// The flag was set by this call
    Applied,

    /// The flag was already set; nothing changed
    Unchanged,

    /// No record with that id; nothing changed
    NotFound,

    /// The record is in the opposite terminal state; nothing changed
    Blocked(EntryState),
}

/// A request to promote one low-trust entry
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRequest {
    /// Entry whose claim becomes the canonical content
    pub entry_id: EntryId,

    /// Destination key
    pub target: CanonicalKey,

    /// Curated confidence
    pub confidence: Confidence,

    /// Provenance recorded on the canonical entry
    pub source: String,
}

/// Outcome of an atomic promotion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// Canonical entry written and source entry marked promoted
    Promoted(CanonicalKey),

    /// No low-trust entry with that id
    EntryNotFound,

    /// Entry already reached a terminal state
    NotPending(EntryState),

    /// Target key already exists in the canonical layer
    KeyExists(CanonicalKey),
}

/// The store operations the promotion pipeline needs
///
/// Implemented by the infrastructure layer (stratum-store). Methods take
/// `&self`: implementations serialise mutations internally so one handle
/// can be shared by many concurrent writers.
pub trait KnowledgeStore {
    /// Error type for store operations
    type Error;

    /// Entries for a task that are neither promoted nor dismissed, in append order
    fn pending_entries(&self, task_id: &str) -> Result<Vec<LowTrustEntry>, Self::Error>;

    /// Look up a low-trust entry by id
    fn get_entry(&self, id: EntryId) -> Result<Option<LowTrustEntry>, Self::Error>;

    /// The first `limit` canonical entries in write order
    fn canonical_slice(&self, limit: usize) -> Result<Vec<CanonicalEntry>, Self::Error>;

    /// Atomically check the entry, write the canonical entry and mark it promoted
    ///
    /// Must never overwrite an existing canonical id and must never promote
    /// an entry that is not pending.
    fn promote_entry(&self, request: &PromotionRequest) -> Result<PromotionOutcome, Self::Error>;

    /// Mark an entry dismissed unless it was promoted
    fn dismiss_entry(&self, id: EntryId) -> Result<FlagUpdate, Self::Error>;

    /// Record a dispute between an entry and a canonical id
    fn record_dispute(
        &self,
        entry_id: EntryId,
        canonical_key: &str,
        reason: &str,
    ) -> Result<DisputeId, Self::Error>;
}

/// Payload submitted to a decision oracle
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRequest {
    /// Task under curation
    pub task_id: String,

    /// Pending entries selected for review
    pub entries: Vec<LowTrustEntry>,

    /// Bounded canonical slice for conflict detection
    pub canonical: Vec<CanonicalEntry>,

    /// Structured-text rendering of the above
    pub rendered: String,
}

/// Trait for the external judgement step of curation
///
/// Returns the oracle's raw structured output; decoding and validation are
/// the promotion engine's job.
pub trait DecisionOracle {
    /// Error type for oracle operations
    type Error;

    /// Review the selected entries and return structured decisions
    fn review(&self, request: &ReviewRequest) -> Result<String, Self::Error>;
}

/// Trait for LLM provider operations
///
/// Implemented by provider adapters outside this workspace and by
/// `stratum_oracle::MockProvider`.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate with structured output (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}
