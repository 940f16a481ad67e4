//! Canonical entries - verified, never-overwritten facts

use crate::Confidence;
use std::fmt;

/// A `(namespace, key)` address in the canonical layer
///
/// The storage id is `"<namespace>/<key>"`. Namespaces may themselves contain
/// slashes (`projects/apollo`), so two different pairs can share an id; the
/// store treats the id as the unit of no-overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey {
    namespace: String,
    key: String,
}

impl CanonicalKey {
    /// Create a key, rejecting empty namespace or key parts
    ///
    /// # Examples
    ///
    /// ```
    /// use stratum_domain::CanonicalKey;
    ///
    /// let key = CanonicalKey::new("facts", "X").unwrap();
    /// assert_eq!(key.id(), "facts/X");
    /// assert!(CanonicalKey::new("", "X").is_err());
    /// ```
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Result<Self, String> {
        let namespace = namespace.into().trim().trim_matches('/').to_string();
        let key = key.into().trim().trim_matches('/').to_string();
        if namespace.is_empty() {
            return Err("canonical namespace cannot be empty".to_string());
        }
        if key.is_empty() {
            return Err("canonical key cannot be empty".to_string());
        }
        Ok(Self { namespace, key })
    }

    /// Namespace part
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key part
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Storage id: `<namespace>/<key>`
    pub fn id(&self) -> String {
        format!("{}/{}", self.namespace, self.key)
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.key)
    }
}

/// A verified fact in the canonical layer
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEntry {
    /// Storage id (`<namespace>/<key>`)
    pub id: String,

    /// Namespace the entry was written under
    pub namespace: String,

    /// The verified content
    pub content: String,

    /// Provenance, e.g. `buffer:<entry id>|curator_promoted`
    pub source: String,

    /// Curated confidence
    pub confidence: Confidence,

    /// Whether a human confirmed the fact
    pub confirmed_by_human: bool,

    /// When the entry was written (seconds since epoch)
    pub last_verified: u64,
}

/// Provenance string recorded for entries promoted from the low-trust layer
pub fn promotion_provenance(entry_id: &crate::EntryId) -> String {
    format!("buffer:{}|curator_promoted", entry_id)
}
