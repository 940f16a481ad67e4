//! Stratum Agent
//!
//! The agent hierarchy that sits on top of the memory store. A [`Mission`]
//! owns one task: it initialises the ledger, hands out [`AgentScope`]s to
//! the orchestrator and its specialists, and runs curation at the end.
//!
//! Specialists only ever write to the low-trust log, their scratch notes
//! and the task ledger. Knowledge reaches the canonical layer through the
//! Promotion Engine, or through the orchestrator's direct write.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use stratum_agent::{HierarchyConfig, Mission};
//! use stratum_curator::{CuratorConfig, PromotionEngine};
//! use stratum_oracle::{LlmOracle, MockProvider};
//! use stratum_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::in_memory()?);
//! let engine = PromotionEngine::new(
//!     LlmOracle::new(MockProvider::new("[]")),
//!     Arc::clone(&store),
//!     CuratorConfig::default(),
//! )?;
//!
//! let mission = Mission::start(Arc::clone(&store), "Research X", HierarchyConfig::default())?;
//! let research = mission.root().spawn_child("research")?;
//! research.propose("X=5", "reasoning", Some(0.8))?;
//!
//! let report = mission.finish("X is 5", &engine).await?;
//! println!("{}", report.trace());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod mission;
mod scope;

pub use config::HierarchyConfig;
pub use error::AgentError;
pub use mission::{Mission, TASK_ID_LEN};
pub use scope::{AgentScope, Role, ORCHESTRATOR_ID};
