//! Configuration loading for canopy.
//!
//! Reads `.canopy/config.json` and provides typed access to all settings.
//! Falls back to sensible defaults when the config file is missing or
//! incomplete, mirroring the teacher's tolerant, additive config evolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level canopy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanopyConfig {
    pub version: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub query: QueryDefaultsConfig,
}

/// Indexing tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_worker_count")]
    pub workers: usize,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
            parallel: true,
        }
    }
}

/// Defaults applied to query subcommands when flags are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDefaultsConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for QueryDefaultsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
fn default_limit() -> u32 {
    50
}
fn default_max_limit() -> u32 {
    500
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            languages: vec![],
            ignore_patterns: vec![],
            indexing: IndexingConfig::default(),
            query: QueryDefaultsConfig::default(),
        }
    }
}

impl CanopyConfig {
    /// Load configuration from `<repo_root>/.canopy/config.json`. Returns
    /// defaults if the file doesn't exist or can't be parsed.
    pub fn load(canopy_dir: &Path) -> Self {
        let config_path = canopy_dir.join("config.json");
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// The default database path: `<repo-root>/.canopy/index.db` (spec §6.3).
    pub fn default_db_path(repo_root: &Path) -> std::path::PathBuf {
        repo_root.join(".canopy").join("index.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_config() {
        let cfg = CanopyConfig::default();
        assert_eq!(cfg.query.default_limit, 50);
        assert_eq!(cfg.query.max_limit, 500);
        assert!(cfg.indexing.parallel);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let cfg = CanopyConfig::load(Path::new("/nonexistent/.canopy"));
        assert_eq!(cfg.query.default_limit, 50);
    }

    #[test]
    fn load_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            serde_json::json!({"version": "0.1.0", "languages": ["go", "python"]}).to_string(),
        )
        .unwrap();
        let cfg = CanopyConfig::load(dir.path());
        assert_eq!(cfg.languages, vec!["go", "python"]);
        assert_eq!(cfg.query.default_limit, 50);
        assert!(cfg.indexing.parallel);
    }

    #[test]
    fn load_malformed_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "not json").unwrap();
        let cfg = CanopyConfig::load(dir.path());
        assert_eq!(cfg, CanopyConfig::default());
    }

    #[test]
    fn default_db_path_is_dotcanopy_index_db() {
        let root = Path::new("/repo");
        assert_eq!(
            CanopyConfig::default_db_path(root),
            Path::new("/repo/.canopy/index.db")
        );
    }
}
