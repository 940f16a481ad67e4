//! Configuration for the Promotion Engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Promotion Engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorConfig {
    /// Maximum canonical entries included in the review payload
    pub canonical_slice_limit: usize,

    /// Per-entry character budget for canonical content in the payload
    pub canonical_excerpt_chars: usize,

    /// Default oracle timeout (seconds) for [`crate::PromotionEngine::curate_task`]
    pub oracle_timeout_secs: u64,

    /// Confidence used when a promote decision omits one
    pub default_promote_confidence: f64,
}

impl CuratorConfig {
    /// Oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.canonical_slice_limit == 0 {
            return Err("canonical_slice_limit must be greater than 0".to_string());
        }
        if self.canonical_excerpt_chars == 0 {
            return Err("canonical_excerpt_chars must be greater than 0".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.default_promote_confidence) {
            return Err("default_promote_confidence must be in [0.0, 1.0]".to_string());
        }
        Ok(())
    }
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            canonical_slice_limit: 20,
            canonical_excerpt_chars: 150,
            oracle_timeout_secs: 120,
            default_promote_confidence: 0.7,
        }
    }
}

impl CuratorConfig {
    /// Strict preset: small payloads, short timeout, cautious default confidence
    pub fn strict() -> Self {
        Self {
            canonical_slice_limit: 10,
            canonical_excerpt_chars: 100,
            oracle_timeout_secs: 30,
            default_promote_confidence: 0.6,
        }
    }

    /// Lenient preset: more canonical context and a longer timeout
    pub fn lenient() -> Self {
        Self {
            canonical_slice_limit: 50,
            canonical_excerpt_chars: 300,
            oracle_timeout_secs: 300,
            default_promote_confidence: 0.8,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CuratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oracle_timeout(), Duration::from_secs(120));
        assert_eq!(config.default_promote_confidence, 0.7);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(CuratorConfig::strict().validate().is_ok());
        assert!(CuratorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = CuratorConfig {
            canonical_slice_limit: 0,
            ..CuratorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CuratorConfig {
            default_promote_confidence: 1.5,
            ..CuratorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CuratorConfig {
            oracle_timeout_secs: 0,
            ..CuratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CuratorConfig::strict();
        let toml_str = config.to_toml().unwrap();
        assert_eq!(CuratorConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_toml_missing_field() {
        assert!(CuratorConfig::from_toml("canonical_slice_limit = 5").is_err());
    }
}
