//! Hierarchy configuration

use serde::{Deserialize, Serialize};

/// Limits for a mission's agent hierarchy
///
/// # Examples
///
/// ```
/// use stratum_agent::HierarchyConfig;
///
/// let config = HierarchyConfig::from_toml("max_depth = 2").unwrap();
/// assert_eq!(config.max_depth, 2);
/// assert_eq!(config.output_chars, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Deepest scope allowed; the orchestrator sits at depth 0
    pub max_depth: usize,

    /// Characters of the final output kept in the task ledger
    pub output_chars: usize,

    /// Confidence for proposals that do not state one
    pub default_claim_confidence: f64,

    /// Confidence for direct canonical writes that do not state one
    pub default_canonical_confidence: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            output_chars: 500,
            default_claim_confidence: 0.5,
            default_canonical_confidence: 0.9,
        }
    }
}

impl HierarchyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.output_chars == 0 {
            return Err("output_chars must be greater than 0".to_string());
        }
        for (name, value) in [
            ("default_claim_confidence", self.default_claim_confidence),
            ("default_canonical_confidence", self.default_canonical_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0.0, 1.0]", name));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}
