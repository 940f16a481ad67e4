//! Disputes - recorded conflicts between low-trust claims and canonical facts

use crate::EntryId;
use std::fmt;

/// Unique identifier for a dispute (UUIDv7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisputeId(u128);

impl DisputeId {
    /// Generate a new UUIDv7-based DisputeId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DisputeId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DisputeId from its hyphenated UUID form
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("invalid dispute id {:?}: {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for DisputeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DisputeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A conflict between one low-trust entry and one canonical key
///
/// Resolution is a human action; curation only ever creates disputes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispute {
    /// Unique identifier
    pub id: DisputeId,

    /// The conflicting low-trust entry
    pub low_trust_entry_id: EntryId,

    /// Canonical storage id the entry conflicts with (`<namespace>/<key>`)
    pub canonical_key: String,

    /// Why the two conflict
    pub reason: String,

    /// Creation timestamp (seconds since epoch)
    pub created_at: u64,

    /// Whether a human has resolved the dispute
    pub resolved: bool,
}
