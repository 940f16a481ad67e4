//! Error types for agent scopes and missions

use stratum_curator::CuratorError;
use stratum_store::StoreError;
use thiserror::Error;

/// Errors raised by [`crate::AgentScope`] and [`crate::Mission`]
#[derive(Error, Debug)]
pub enum AgentError {
    /// Spawning a child would exceed the configured hierarchy depth
    #[error("Maximum delegation depth reached ({depth} > {max})")]
    DepthExceeded {
        /// Depth the child would have had
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// The scope's role does not allow the operation
    #[error("Not permitted: {0}")]
    NotPermitted(String),

    /// A namespace or key failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store operation failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Curation failed as a whole
    #[error("Curation failed: {0}")]
    Curation(#[from] CuratorError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
