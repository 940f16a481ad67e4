//! Curation results

use crate::error::DecisionError;
use std::fmt;
use stratum_domain::{CanonicalKey, Confidence, Decision, DisputeId, EntryId};

/// Effect of one successfully applied decision
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Entry copied into the canonical layer and marked promoted
    Promoted {
        /// Source entry
        entry_id: EntryId,
        /// Canonical key written
        key: CanonicalKey,
        /// Confidence recorded
        confidence: Confidence,
    },

    /// Dispute recorded; the entry is untouched
    Disputed {
        /// Conflicting entry
        entry_id: EntryId,
        /// New dispute
        dispute_id: DisputeId,
        /// Canonical id it conflicts with
        canonical_key: String,
    },

    /// Entry marked dismissed (or already was)
    Dismissed {
        /// Dismissed entry
        entry_id: EntryId,
        /// Why
        reason: String,
        /// The entry was already dismissed before this decision
        already: bool,
    },

    /// Dismiss of an id the log does not hold; nothing changed
    NothingToDismiss {
        /// Unknown entry
        entry_id: EntryId,
    },
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::Promoted { entry_id, key, confidence } => {
                write!(f, "Promoted {} -> Canonical[{}] (conf={})", entry_id, key, confidence)
            }
            Applied::Disputed { entry_id, dispute_id, canonical_key } => write!(
                f,
                "Conflict between {} and Canonical[{}] recorded as dispute {}",
                entry_id, canonical_key, dispute_id
            ),
            Applied::Dismissed { entry_id, reason, already: false } => {
                write!(f, "Dismissed {}: {}", entry_id, reason)
            }
            Applied::Dismissed { entry_id, already: true, .. } => {
                write!(f, "Entry {} was already dismissed", entry_id)
            }
            Applied::NothingToDismiss { entry_id } => {
                write!(f, "Entry {} not found; nothing to dismiss", entry_id)
            }
        }
    }
}

/// One decision and what happened to it
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    /// Position in the oracle's output
    pub index: usize,

    /// The decoded decision, if decoding succeeded
    pub decision: Option<Decision>,

    /// Outcome
    pub result: Result<Applied, DecisionError>,
}

impl DecisionRecord {
    /// One trace line
    pub fn line(&self) -> String {
        match (&self.decision, &self.result) {
            (_, Ok(applied)) => format!("[{}] {}", self.index, applied),
            (Some(decision), Err(e)) => format!("[{}] Rejected {}: {}", self.index, decision, e),
            (None, Err(e)) => format!("[{}] Skipped: {}", self.index, e),
        }
    }
}

/// Result of curating one task
#[derive(Debug, Clone, PartialEq)]
pub struct CurationReport {
    /// Task curated
    pub task_id: String,

    /// Pending entries selected for review
    pub selected: usize,

    /// Every decision the oracle returned, in order
    pub records: Vec<DecisionRecord>,
}

impl CurationReport {
    /// Report for a task with nothing pending
    pub fn noop(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            selected: 0,
            records: Vec::new(),
        }
    }

    /// Nothing was selected, so nothing was asked or applied
    pub fn is_noop(&self) -> bool {
        self.selected == 0
    }

    /// Entries promoted
    pub fn promoted(&self) -> usize {
        self.count(|a| matches!(a, Applied::Promoted { .. }))
    }

    /// Disputes recorded
    pub fn disputed(&self) -> usize {
        self.count(|a| matches!(a, Applied::Disputed { .. }))
    }

    /// Entries newly dismissed
    pub fn dismissed(&self) -> usize {
        self.count(|a| matches!(a, Applied::Dismissed { already: false, .. }))
    }

    /// Decisions not applied (rejected, malformed or halted)
    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.result.is_err()).count()
    }

    /// Errors in decision order
    pub fn errors(&self) -> impl Iterator<Item = &DecisionError> {
        self.records.iter().filter_map(|r| r.result.as_ref().err())
    }

    fn count(&self, pred: impl Fn(&Applied) -> bool) -> usize {
        self.records
            .iter()
            .filter(|r| r.result.as_ref().map(&pred).unwrap_or(false))
            .count()
    }

    /// Human-readable trace of every decision
    pub fn trace(&self) -> String {
        if self.is_noop() {
            return format!("No low-trust entries to curate for task {}.", self.task_id);
        }
        if self.records.is_empty() {
            return format!(
                "Oracle returned no decisions for {} entries of task {}; nothing applied.",
                self.selected, self.task_id
            );
        }
        let mut lines: Vec<String> = self.records.iter().map(DecisionRecord::line).collect();
        lines.push(self.to_string());
        lines.join("\n")
    }
}

impl fmt::Display for CurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {}: {} selected, {} promoted, {} disputed, {} dismissed, {} failed",
            self.task_id,
            self.selected,
            self.promoted(),
            self.disputed(),
            self.dismissed(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_trace() {
        let report = CurationReport::noop("t1");
        assert!(report.is_noop());
        assert_eq!(report.trace(), "No low-trust entries to curate for task t1.");
    }

    #[test]
    fn test_zero_decisions_trace() {
        let report = CurationReport {
            task_id: "t1".to_string(),
            selected: 3,
            records: vec![],
        };
        assert!(!report.is_noop());
        assert!(report.trace().contains("no decisions for 3 entries"));
    }

    #[test]
    fn test_counts_and_lines() {
        let id = EntryId::new();
        let decision = Decision::Promote {
            entry_id: id,
            target: CanonicalKey::new("facts", "X").unwrap(),
            confidence: Confidence::clamped(0.8),
        };
        let report = CurationReport {
            task_id: "t1".to_string(),
            selected: 2,
            records: vec![
                DecisionRecord {
                    index: 0,
                    decision: Some(decision.clone()),
                    result: Err(DecisionError::AlreadyExists("facts/X".to_string())),
                },
                DecisionRecord {
                    index: 1,
                    decision: None,
                    result: Err(DecisionError::Malformed("bad".to_string())),
                },
                DecisionRecord {
                    index: 2,
                    decision: Some(Decision::Dismiss { entry_id: id, reason: "r".to_string() }),
                    result: Ok(Applied::Dismissed {
                        entry_id: id,
                        reason: "r".to_string(),
                        already: false,
                    }),
                },
            ],
        };

        assert_eq!(report.failed(), 2);
        assert_eq!(report.dismissed(), 1);
        assert_eq!(report.promoted(), 0);

        let trace = report.trace();
        assert!(trace.contains("Rejected promote("));
        assert!(trace.contains("Use flag_conflict"));
        assert!(trace.contains("[1] Skipped: Malformed decision: bad"));
        assert!(trace.ends_with("1 dismissed, 2 failed"));
    }
}
