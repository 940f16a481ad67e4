//! Stratum Domain Layer
//!
//! Core value types and trait seams for the layered knowledge store.
//! The only external dependency is `uuid` (v7 identifiers); storage, oracle
//! and pipeline implementations live in the other crates.
//!
//! ## Layers
//!
//! - **Canonical**: verified facts keyed by `<namespace>/<key>`, never overwritten
//! - **Low-trust**: unverified claims appended by any writer, pending curation
//! - **Disputes**: recorded conflicts between a low-trust claim and a canonical key
//! - **Task ledger**: per-task artifacts and writer outputs
//! - **Scratch**: per-writer, per-task private notes
//!
//! ## Promotion
//!
//! Low-trust entries move into the canonical layer only through a
//! [`Decision`] returned by a [`traits::DecisionOracle`] and applied against a
//! [`traits::KnowledgeStore`]. An entry reaches at most one terminal state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod confidence;
pub mod decision;
pub mod dispute;
pub mod entry;
pub mod task;
pub mod text;
pub mod traits;

mod clock;

// Re-exports for convenience
pub use canonical::{CanonicalEntry, CanonicalKey};
pub use clock::now_secs;
pub use confidence::Confidence;
pub use decision::Decision;
pub use dispute::{Dispute, DisputeId};
pub use entry::{EntryId, EntryState, LowTrustEntry};
pub use task::{Artifact, ScratchNote, TaskRecord};
