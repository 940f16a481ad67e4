//! Context Assembler - bounded, labelled view across all layers
//!
//! Sections appear in a fixed order: task ledger, canonical slice (trusted),
//! recent pending low-trust entries (tentative), then the requesting
//! writer's own scratch notes. Empty sections are omitted; if every section
//! is empty the assembled context is the empty string.

use crate::{MemoryStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use stratum_domain::text::excerpt;

// Keys, writer ids and origins are labels, not content
const LABEL_CHARS: usize = 80;

/// Character and item budgets for an assembled context
///
/// Every value rendered into the context passes through
/// [`stratum_domain::text::excerpt`] with the matching character budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextBudget {
    /// Per-artifact character budget
    pub artifact_chars: usize,
    /// Per-output character budget
    pub output_chars: usize,
    /// Per-canonical-entry character budget
    pub canonical_chars: usize,
    /// Maximum canonical entries shown
    pub canonical_limit: usize,
    /// Per-claim character budget
    pub low_trust_chars: usize,
    /// Per-note character budget
    pub scratch_chars: usize,
    /// Maximum pending low-trust entries shown (most recent)
    pub max_low_trust: usize,
    /// Maximum scratch notes shown (most recent)
    pub max_scratch: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            artifact_chars: 400,
            output_chars: 300,
            canonical_chars: 300,
            canonical_limit: 10,
            low_trust_chars: 300,
            scratch_chars: 200,
            max_low_trust: 8,
            max_scratch: 5,
        }
    }
}

impl ContextBudget {
    /// Load a budget from a TOML string; missing fields keep their defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, StoreError> {
        toml::from_str(toml_str)
            .map_err(|e| StoreError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Override the low-trust and scratch item limits
    pub fn with_limits(mut self, max_low_trust: usize, max_scratch: usize) -> Self {
        self.max_low_trust = max_low_trust;
        self.max_scratch = max_scratch;
        self
    }
}

/// Read-only view builder over a [`MemoryStore`]
pub struct ContextAssembler<'a> {
    store: &'a MemoryStore,
    budget: ContextBudget,
}

impl<'a> ContextAssembler<'a> {
    /// Assembler with the default budget
    pub fn new(store: &'a MemoryStore) -> Self {
        Self::with_budget(store, ContextBudget::default())
    }

    /// Assembler with a custom budget
    pub fn with_budget(store: &'a MemoryStore, budget: ContextBudget) -> Self {
        Self { store, budget }
    }

    /// The budget in use
    pub fn budget(&self) -> &ContextBudget {
        &self.budget
    }

    /// Build the context for `writer_id` working on `task_id`
    ///
    /// `namespaces` restricts the canonical section to entries whose id starts
    /// with one of the listed prefixes, as [`crate::CanonicalStore::read`] does. An empty string means there is no context at all.
    pub fn assemble(
        &self,
        task_id: &str,
        writer_id: &str,
        namespaces: Option<&[&str]>,
    ) -> Result<String, StoreError> {
        let budget = &self.budget;
        let mut sections: Vec<String> = Vec::new();

        if let Some(record) = self.store.tasks().read(task_id)? {
            if !record.is_empty() {
                let mut section = String::from("## Task ledger (current mission state)\n");
                for (key, artifact) in &record.artifacts {
                    let _ = writeln!(
                        section,
                        "- artifact {}: {}",
                        excerpt(key, LABEL_CHARS),
                        excerpt(&artifact.value, budget.artifact_chars)
                    );
                }
                for (writer, output) in &record.outputs {
                    let _ = writeln!(
                        section,
                        "- output from {}: {}",
                        excerpt(writer, LABEL_CHARS),
                        excerpt(output, budget.output_chars)
                    );
                }
                sections.push(section);
            }
        }

        let canonical: Vec<_> = match namespaces {
            Some(namespaces) => self
                .store
                .canonical()
                .read(None)?
                .into_iter()
                .filter(|entry| namespaces.iter().any(|ns| entry.id.starts_with(ns)))
                .take(budget.canonical_limit)
                .collect(),
            None => self.store.canonical().slice(budget.canonical_limit)?,
        };
        if !canonical.is_empty() {
            let mut section = String::from("## Canonical knowledge (trusted)\n");
            for entry in &canonical {
                let _ = writeln!(
                    section,
                    "- [{}] {}",
                    entry.id,
                    excerpt(&entry.content, budget.canonical_chars)
                );
            }
            sections.push(section);
        }

        let pending = self
            .store
            .low_trust()
            .recent_pending(task_id, budget.max_low_trust)?;
        if !pending.is_empty() {
            let mut section = String::from("## Low-trust claims (TENTATIVE, unverified)\n");
            for entry in &pending {
                let _ = writeln!(
                    section,
                    "- [{}] {} (from {}, conf {})",
                    entry.id,
                    excerpt(&entry.claim, budget.low_trust_chars),
                    excerpt(&entry.origin, LABEL_CHARS),
                    entry.confidence
                );
            }
            sections.push(section);
        }

        let notes = self
            .store
            .scratch()
            .recent(writer_id, task_id, budget.max_scratch)?;
        if !notes.is_empty() {
            let mut section = String::from("## Your scratch notes\n");
            for note in &notes {
                let _ = writeln!(section, "- {}", excerpt(&note.note, budget.scratch_chars));
            }
            sections.push(section);
        }

        if sections.is_empty() {
            return Ok(String::new());
        }

        let mut context = format!("[Context for task {} | writer: {}]\n", task_id, writer_id);
        context.push_str(&sections.join("\n"));
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreConfig;
    use stratum_domain::{CanonicalKey, Confidence};

    fn empty_store() -> MemoryStore {
        MemoryStore::open(&StoreConfig::in_memory().without_seed()).unwrap()
    }

    #[test]
    fn test_empty_sources_give_empty_context() {
        let store = empty_store();
        store.tasks().init("t1", "prompt only").unwrap();
        let context = ContextAssembler::new(&store).assemble("t1", "w", None).unwrap();
        assert_eq!(context, "");
    }

    #[test]
    fn test_section_order() {
        let store = empty_store();
        store.tasks().init("t1", "p").unwrap();
        store.tasks().write_artifact("t1", "plan", "step one").unwrap();
        store
            .canonical()
            .write(&CanonicalKey::new("facts", "X").unwrap(), "X=5", "h", Confidence::CERTAIN, true)
            .unwrap();
        store.low_trust().append("Y=7", "s", "research", "t1", 0.6).unwrap();
        store.scratch().write("w", "t1", "check Y").unwrap();

        let context = ContextAssembler::new(&store).assemble("t1", "w", None).unwrap();
        assert!(context.starts_with("[Context for task t1 | writer: w]"));

        let ledger = context.find("step one").unwrap();
        let canonical = context.find("[facts/X] X=5").unwrap();
        let tentative = context.find("TENTATIVE").unwrap();
        let claim = context.find("Y=7 (from research, conf 0.60)").unwrap();
        let scratch = context.find("check Y").unwrap();
        assert!(ledger < canonical && canonical < tentative && tentative < claim && claim < scratch);
    }

    #[test]
    fn test_terminal_entries_excluded() {
        let store = empty_store();
        let a = store.low_trust().append("dismissed claim", "s", "w", "t1", 0.5).unwrap();
        store.low_trust().append("live claim", "s", "w", "t1", 0.5).unwrap();
        store.low_trust().mark_dismissed(a).unwrap();

        let context = ContextAssembler::new(&store).assemble("t1", "w", None).unwrap();
        assert!(context.contains("live claim"));
        assert!(!context.contains("dismissed claim"));
    }

    #[test]
    fn test_scratch_is_private() {
        let store = empty_store();
        store.scratch().write("other", "t1", "not yours").unwrap();
        let context = ContextAssembler::new(&store).assemble("t1", "w", None).unwrap();
        assert_eq!(context, "");
    }

    #[test]
    fn test_namespace_filter() {
        let store = MemoryStore::in_memory().unwrap();
        store
            .canonical()
            .write(&CanonicalKey::new("facts", "X").unwrap(), "X=5", "h", Confidence::CERTAIN, true)
            .unwrap();

        let context = ContextAssembler::new(&store)
            .assemble("t1", "w", Some(&["facts"][..]))
            .unwrap();
        assert!(context.contains("facts/X"));
        assert!(!context.contains("identity/system"));
    }

    #[test]
    fn test_namespace_filter_matches_nested_namespaces() {
        let store = empty_store();
        store
            .canonical()
            .write(
                &CanonicalKey::new("projects/apollo", "launch").unwrap(),
                "launch window is March",
                "h",
                Confidence::CERTAIN,
                true,
            )
            .unwrap();
        store
            .canonical()
            .write(&CanonicalKey::new("facts", "X").unwrap(), "X=5", "h", Confidence::CERTAIN, true)
            .unwrap();

        let context = ContextAssembler::new(&store)
            .assemble("t1", "w", Some(&["projects"][..]))
            .unwrap();
        assert!(context.contains("[projects/apollo/launch] launch window is March"));
        assert!(!context.contains("facts/X"));
        assert_eq!(store.canonical().read(Some("projects")).unwrap().len(), 1);
    }

    #[test]
    fn test_labels_stay_on_one_line() {
        let store = empty_store();
        store.tasks().init("t1", "p").unwrap();
        store.tasks().write_artifact("t1", "plan\nstep", "v").unwrap();
        store.tasks().write_output("t1", "data\nagent", "o").unwrap();
        store.low_trust().append("Y=7", "s", "research\nteam", "t1", 0.6).unwrap();

        let context = ContextAssembler::new(&store).assemble("t1", "w", None).unwrap();
        assert!(context.contains("- artifact plan step: v\n"));
        assert!(context.contains("- output from data agent: o\n"));
        assert!(context.contains("(from research team, conf 0.60)"));
        for line in context.lines().filter(|l| !l.is_empty()) {
            let structural =
                line.starts_with("- ") || line.starts_with("## ") || line.starts_with("[Context");
            assert!(structural, "{:?}", line);
        }
    }

    #[test]
    fn test_limits_and_truncation() {
        let store = empty_store();
        for i in 0..12 {
            store.low_trust().append(&format!("claim-{:02}", i), "s", "w", "t1", 0.5).unwrap();
        }
        store.scratch().write("w", "t1", &"z".repeat(500)).unwrap();

        let budget = ContextBudget::default().with_limits(3, 5);
        let context = ContextAssembler::with_budget(&store, budget)
            .assemble("t1", "w", None)
            .unwrap();
        assert!(!context.contains("claim-08"));
        assert!(context.contains("claim-09"));
        assert!(context.contains("claim-11"));
        assert!(context.contains(&format!("{}…", "z".repeat(200))));
        assert!(!context.contains(&"z".repeat(201)));
    }

    #[test]
    fn test_budget_from_toml() {
        let budget = ContextBudget::from_toml("max_low_trust = 2").unwrap();
        assert_eq!(budget.max_low_trust, 2);
        assert_eq!(budget.max_scratch, 5);
    }
}
