//! Low-trust entries - unverified claims awaiting curation

use crate::Confidence;
use std::fmt;

/// Unique identifier for a low-trust entry based on UUIDv7
///
/// Ids are minted at append time and never reused. UUIDv7 keeps them
/// chronologically sortable without any coordination between writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u128);

impl EntryId {
    /// Generate a new UUIDv7-based EntryId
    ///
    /// # Examples
    ///
    /// ```
    /// use stratum_domain::EntryId;
    ///
    /// let id = EntryId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an EntryId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an EntryId from its hyphenated UUID form
    ///
    /// # Examples
    ///
    /// ```
    /// use stratum_domain::EntryId;
    ///
    /// let id = EntryId::new();
    /// assert_eq!(EntryId::parse(&id.to_string()).unwrap(), id);
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("invalid entry id {:?}: {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Lifecycle state of a low-trust entry
///
/// `Promoted` and `Dismissed` are terminal and mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    /// Awaiting curation
    Pending,

    /// Copied into the canonical layer
    Promoted,

    /// Rejected by curation
    Dismissed,
}

impl EntryState {
    /// Derive the state from the two persisted flags
    ///
    /// Returns `None` when both flags are set, which the stores never allow.
    pub fn from_flags(promoted: bool, dismissed: bool) -> Option<Self> {
        match (promoted, dismissed) {
            (false, false) => Some(EntryState::Pending),
            (true, false) => Some(EntryState::Promoted),
            (false, true) => Some(EntryState::Dismissed),
            (true, true) => None,
        }
    }

    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Pending => "pending",
            EntryState::Promoted => "promoted",
            EntryState::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unverified claim written by any writer
#[derive(Debug, Clone, PartialEq)]
pub struct LowTrustEntry {
    /// Unique identifier
    pub id: EntryId,

    /// The claim text (not validated)
    pub claim: String,

    /// Where the claim came from (e.g. "web_search", "reasoning")
    pub source: String,

    /// Writer that appended the entry
    pub origin: String,

    /// Task the entry belongs to
    pub task_id: String,

    /// Writer-assigned confidence
    pub confidence: Confidence,

    /// Creation timestamp (seconds since epoch)
    pub created_at: u64,

    /// Promoted into the canonical layer
    pub promoted: bool,

    /// Dismissed by curation
    pub dismissed: bool,
}

impl LowTrustEntry {
    /// Current lifecycle state
    ///
    /// An entry carrying both flags is reported as `Promoted`; the stores
    /// guard against ever writing that combination.
    pub fn state(&self) -> EntryState {
        EntryState::from_flags(self.promoted, self.dismissed).unwrap_or(EntryState::Promoted)
    }

    /// Whether the entry is still awaiting curation
    pub fn is_pending(&self) -> bool {
        !self.promoted && !self.dismissed
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: id ordering matches u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = EntryId::from_value(a);
            let id_b = EntryId::from_value(b);
            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: the string form parses back to the same id
        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = EntryId::from_value(value);
            match EntryId::parse(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
