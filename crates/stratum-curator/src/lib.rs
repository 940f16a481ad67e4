//! Stratum Curator
//!
//! The Promotion Engine: the only automated path from the low-trust layer
//! into the canonical layer.
//!
//! # Architecture
//!
//! ```text
//! pending entries + canonical slice → review payload → DecisionOracle
//!     → decode → validate → apply (promote / flag_conflict / dismiss)
//! ```
//!
//! # Guarantees
//!
//! - **No overwrite**: a promote targeting an existing key is rejected with
//!   an instruction to flag a conflict; it is never converted or dropped
//! - **One terminal state**: promoting or dismissing an entry that already
//!   left the pending state is an invalid transition
//! - **Independent decisions**: a rejected or malformed decision never
//!   blocks the rest of the batch
//! - **Clean abandonment**: on oracle timeout, failure or an undecodable
//!   response nothing is applied and curation can simply be retried
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use stratum_curator::{CuratorConfig, PromotionEngine};
//! use stratum_oracle::{LlmOracle, MockProvider};
//! use stratum_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::in_memory()?);
//! store.low_trust().append("X=5", "reasoning", "research", "t1", 0.8)?;
//!
//! let oracle = LlmOracle::new(MockProvider::new("[]"));
//! let engine = PromotionEngine::new(oracle, Arc::clone(&store), CuratorConfig::default())?;
//!
//! let report = engine.curate_task("t1").await?;
//! println!("{}", report.trace());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod parser;
mod prompt;
mod report;

pub use config::CuratorConfig;
pub use engine::{HaltHandle, PromotionEngine};
pub use error::{CuratorError, DecisionError};
pub use parser::{parse_decisions, DEFAULT_DISMISS_REASON, DEFAULT_NAMESPACE};
pub use prompt::{screen, ReviewPromptBuilder, ScreenHint};
pub use report::{Applied, CurationReport, DecisionRecord};
