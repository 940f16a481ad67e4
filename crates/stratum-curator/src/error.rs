//! Error types for the Promotion Engine

use std::time::Duration;
use stratum_domain::{EntryId, EntryState};
use thiserror::Error;

/// Errors that abandon a whole curation batch
///
/// When one of these is returned no decision has been applied, every
/// selected entry is still pending and the call is safe to retry.
#[derive(Error, Debug)]
pub enum CuratorError {
    /// The oracle failed to answer
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// The oracle did not answer within the caller's timeout
    #[error("Oracle timed out after {0:?}")]
    OracleTimeout(Duration),

    /// The oracle's answer is not a decision list at all
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    /// Selection or context reads failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a single decision was not applied
///
/// Scoped to one decision; the rest of the batch still runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// The referenced low-trust entry does not exist
    #[error("Entry {0} not found in the low-trust log")]
    NotFound(EntryId),

    /// The promotion target is already canonical
    #[error("Canonical[{0}] already exists. Use flag_conflict if there is a discrepancy.")]
    AlreadyExists(String),

    /// The entry already reached a terminal state
    #[error("Cannot {action} entry {entry_id}: it is already {state}")]
    InvalidTransition {
        /// Entry the decision referred to
        entry_id: EntryId,
        /// Attempted action
        action: &'static str,
        /// State the entry is in
        state: EntryState,
    },

    /// The decision could not be decoded or validated
    #[error("Malformed decision: {0}")]
    Malformed(String),

    /// The store failed while applying the decision
    #[error("Store error: {0}")]
    Store(String),

    /// Curation was halted before this decision was applied
    #[error("Halted before this decision was applied")]
    Halted,
}
