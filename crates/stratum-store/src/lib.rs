//! Stratum Storage Layer
//!
//! SQLite-backed implementation of the five knowledge layers and the
//! [`KnowledgeStore`](stratum_domain::traits::KnowledgeStore) seam used by
//! the promotion engine.
//!
//! # Architecture
//!
//! - One database per resource (`canonical`, `low_trust`, `disputes`,
//!   `tasks`, `scratch`), each behind its own lock
//! - Append order kept by an autoincrement sequence on every log
//! - Canonical no-overwrite enforced by a single `INSERT OR IGNORE`
//! - Flag updates are index-addressed and guarded by the terminal-state predicate
//!
//! # Examples
//!
//! ```
//! use stratum_store::{ContextAssembler, MemoryStore};
//!
//! let store = MemoryStore::in_memory().unwrap();
//! store.tasks().init("t1", "Find the value of X").unwrap();
//! store.low_trust().append("X=5", "reasoning", "research", "t1", 0.8).unwrap();
//!
//! let context = ContextAssembler::new(&store).assemble("t1", "research", None).unwrap();
//! assert!(context.contains("X=5"));
//! ```

#![warn(missing_docs)]

mod canonical;
mod config;
mod context;
mod db;
mod disputes;
mod error;
mod low_trust;
mod memory;
mod scratch;
mod tasks;

pub use canonical::CanonicalStore;
pub use config::StoreConfig;
pub use context::{ContextAssembler, ContextBudget};
pub use disputes::DisputeLog;
pub use error::StoreError;
pub use low_trust::{EntryQuery, LowTrustLog};
pub use memory::{MemoryStore, StoreSummary};
pub use scratch::ScratchPad;
pub use tasks::TaskLedger;
