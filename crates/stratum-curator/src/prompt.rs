//! Review payload rendering with deterministic pre-screen hints

use std::collections::HashMap;
use std::fmt::Write as _;
use stratum_domain::text::excerpt;
use stratum_domain::{CanonicalEntry, EntryId, LowTrustEntry};

/// Claims longer than this are cut in the payload
const MAX_CLAIM_CHARS: usize = 2_000;

/// A deterministic observation about one selected entry
///
/// Hints are advisory: they are rendered for the oracle and never applied
/// by themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenHint {
    /// Same normalised claim as an earlier entry in this batch
    DuplicateOf(EntryId),

    /// Same normalised text as an existing canonical entry
    AlreadyCanonical(String),
}

/// Compute hints for every selected entry, in selection order
///
/// Comparison ignores case, surrounding whitespace, repeated inner
/// whitespace and trailing sentence punctuation.
pub fn screen(
    entries: &[LowTrustEntry],
    canonical: &[CanonicalEntry],
) -> Vec<(EntryId, ScreenHint)> {
    let canonical_by_text: HashMap<String, &str> = canonical
        .iter()
        .map(|c| (normalise(&c.content), c.id.as_str()))
        .collect();

    let mut first_seen: HashMap<String, EntryId> = HashMap::new();
    let mut hints = Vec::new();

    for entry in entries {
        let text = normalise(&entry.claim);
        if text.is_empty() {
            continue;
        }
        if let Some(canonical_id) = canonical_by_text.get(&text) {
            hints.push((entry.id, ScreenHint::AlreadyCanonical(canonical_id.to_string())));
        }
        match first_seen.get(&text) {
            Some(original) => hints.push((entry.id, ScreenHint::DuplicateOf(*original))),
            None => {
                first_seen.insert(text, entry.id);
            }
        }
    }
    hints
}

fn normalise(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ';' | ','))
        .to_string()
}

/// Builds the structured-text review payload for a decision oracle
pub struct ReviewPromptBuilder<'a> {
    task_id: &'a str,
    entries: &'a [LowTrustEntry],
    canonical: &'a [CanonicalEntry],
    canonical_chars: usize,
}

impl<'a> ReviewPromptBuilder<'a> {
    /// Create a new builder
    pub fn new(task_id: &'a str, entries: &'a [LowTrustEntry]) -> Self {
        Self {
            task_id,
            entries,
            canonical: &[],
            canonical_chars: 150,
        }
    }

    /// Add the canonical slice used for conflict detection
    pub fn with_canonical(mut self, canonical: &'a [CanonicalEntry], excerpt_chars: usize) -> Self {
        self.canonical = canonical;
        self.canonical_chars = excerpt_chars;
        self
    }

    /// Render the payload
    pub fn build(&self) -> String {
        let mut hints_by_entry: HashMap<EntryId, Vec<ScreenHint>> = HashMap::new();
        for (id, hint) in screen(self.entries, self.canonical) {
            hints_by_entry.entry(id).or_default().push(hint);
        }

        let mut prompt = format!(
            "Curate these {} low-trust entries for task {}.\n\n",
            self.entries.len(),
            self.task_id
        );

        prompt.push_str("LOW-TRUST ENTRIES:\n");
        for entry in self.entries {
            let _ = writeln!(
                prompt,
                "  id={} origin={} conf={} source={}",
                entry.id, entry.origin, entry.confidence, entry.source
            );
            let _ = writeln!(prompt, "  claim: {}", excerpt(&entry.claim, MAX_CLAIM_CHARS));
            for hint in hints_by_entry.get(&entry.id).into_iter().flatten() {
                match hint {
                    ScreenHint::DuplicateOf(original) => {
                        let _ = writeln!(prompt, "  hint: repeats entry {}", original);
                    }
                    ScreenHint::AlreadyCanonical(key) => {
                        let _ = writeln!(prompt, "  hint: already recorded as Canonical[{}]", key);
                    }
                }
            }
        }

        prompt.push_str("\nEXISTING CANONICAL (for conflict detection):\n");
        if self.canonical.is_empty() {
            prompt.push_str("  (empty)\n");
        }
        for entry in self.canonical {
            let _ = writeln!(
                prompt,
                "  [{}]: {}",
                entry.id,
                excerpt(&entry.content, self.canonical_chars)
            );
        }

        prompt.push_str("\nFor each entry choose exactly one: promote, flag_conflict, or dismiss.");
        prompt
    }
}
