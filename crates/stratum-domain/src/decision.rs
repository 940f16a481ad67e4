//! Curation decisions returned by a decision oracle

use crate::{CanonicalKey, Confidence, EntryId};
use std::fmt;

/// A single, already-decoded curation decision
///
/// This is a closed set: the promotion engine matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Copy the entry's claim into the canonical layer under `target`
    Promote {
        /// Low-trust entry to promote
        entry_id: EntryId,
        /// Destination in the canonical layer
        target: CanonicalKey,
        /// Curated confidence for the canonical entry
        confidence: Confidence,
    },

    /// Record a dispute between the entry and an existing canonical key
    FlagConflict {
        /// Conflicting low-trust entry
        entry_id: EntryId,
        /// Canonical storage id (`<namespace>/<key>`)
        canonical_key: String,
        /// Explanation of the conflict
        reason: String,
    },

    /// Mark the entry dismissed
    Dismiss {
        /// Low-trust entry to dismiss
        entry_id: EntryId,
        /// Why it is being dismissed
        reason: String,
    },
}

impl Decision {
    /// The low-trust entry this decision refers to
    pub fn entry_id(&self) -> EntryId {
        match self {
            Decision::Promote { entry_id, .. }
            | Decision::FlagConflict { entry_id, .. }
            | Decision::Dismiss { entry_id, .. } => *entry_id,
        }
    }

    /// Short action name, matching the wire format
    pub fn action(&self) -> &'static str {
        match self {
            Decision::Promote { .. } => "promote",
            Decision::FlagConflict { .. } => "flag_conflict",
            Decision::Dismiss { .. } => "dismiss",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Promote { entry_id, target, confidence } => {
                write!(f, "promote({}, {}, {})", entry_id, target, confidence)
            }
            Decision::FlagConflict { entry_id, canonical_key, .. } => {
                write!(f, "flag_conflict({}, {})", entry_id, canonical_key)
            }
            Decision::Dismiss { entry_id, .. } => write!(f, "dismiss({})", entry_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_and_action() {
        let id = EntryId::new();
        let promote = Decision::Promote {
            entry_id: id,
            target: CanonicalKey::new("facts", "X").unwrap(),
            confidence: Confidence::clamped(0.8),
        };
        let dismiss = Decision::Dismiss { entry_id: id, reason: "speculative".to_string() };

        assert_eq!(promote.entry_id(), id);
        assert_eq!(promote.action(), "promote");
        assert_eq!(dismiss.action(), "dismiss");
        assert!(promote.to_string().contains("facts/X"));
    }
}
