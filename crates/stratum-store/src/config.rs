//! Store configuration

use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for opening a [`crate::MemoryStore`]
///
/// # Examples
///
/// ```
/// use stratum_store::StoreConfig;
///
/// let config = StoreConfig::from_toml(r#"
///     data_dir = "/var/lib/stratum"
///     busy_timeout_ms = 2000
/// "#).unwrap();
/// assert!(config.seed_canonical);
/// assert_eq!(config.busy_timeout_ms, 2000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one database file per resource.
    /// `None` keeps every resource in a private in-memory database.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// How long a connection waits on a locked database file (milliseconds)
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Write the identity/standards entries on first use
    #[serde(default = "default_seed_canonical")]
    pub seed_canonical: bool,
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_seed_canonical() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            seed_canonical: default_seed_canonical(),
        }
    }
}

impl StoreConfig {
    /// In-memory store, seeded
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed store under `dir`, seeded
    pub fn at<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            data_dir: Some(dir.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Disable first-use seeding
    pub fn without_seed(mut self) -> Self {
        self.seed_canonical = false;
        self
    }

    /// Busy timeout as a Duration
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, StoreError> {
        toml::from_str(toml_str)
            .map_err(|e| StoreError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.data_dir.is_none());
        assert!(config.seed_canonical);
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_at_and_without_seed() {
        let config = StoreConfig::at("/tmp/stratum").without_seed();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/stratum")));
        assert!(!config.seed_canonical);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = StoreConfig::from_toml("").unwrap();
        assert!(config.data_dir.is_none());
        assert_eq!(config.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_invalid_toml() {
        let result = StoreConfig::from_toml("busy_timeout_ms = \"soon\"");
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
