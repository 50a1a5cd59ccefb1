//! Persistent configuration for structgraph.
//!
//! Loads/saves a TOML config at `~/.structgraph/config.toml`.

use crate::StructgraphError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Standard-library packages skipped during traversal unless overridden.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "bufio", "bytes", "context", "errors", "fmt", "http", "io", "ioutil", "json", "log", "math",
    "net", "os", "path", "filepath", "reflect", "regexp", "runtime", "sort", "strconv", "strings",
    "sync", "atomic", "syscall", "testing", "time", "unicode", "unsafe", "url",
];

/// Top-level structgraph configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructgraphConfig {
    pub walk: WalkConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

impl StructgraphConfig {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, StructgraphError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| StructgraphError::Config(e.to_string()))
    }

    /// Save configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), StructgraphError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| StructgraphError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default path, or return defaults if the file doesn't exist.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Default config path: `~/.structgraph/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".structgraph")
            .join("config.toml")
    }
}

/// Import graph traversal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Package names never stored nor traversed.
    pub exclude: Vec<String>,
    /// Maximum import depth below the target; unlimited when unset.
    pub max_depth: Option<usize>,
    /// Parse `_test.go` files too.
    pub include_tests: bool,
    /// Store files that contribute no struct, interface or alias.
    pub keep_empty_files: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            max_depth: None,
            include_tests: false,
            keep_empty_files: false,
        }
    }
}

/// Roots used to resolve import paths. Unset entries are detected at run time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub workspace_root: Option<String>,
    pub system_root: Option<String>,
    pub module_cache: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let config = StructgraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).expect("default config should serialize to TOML");
        let parsed: StructgraphConfig =
            toml::from_str(&toml_str).expect("serialized TOML should parse back");
        assert_eq!(parsed, config);
        assert!(parsed.walk.exclude.iter().any(|e| e == "fmt"));
        assert!(parsed.output.pretty);
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let result = StructgraphConfig::load(Path::new("/tmp/nonexistent_structgraph_config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = StructgraphConfig::default();
        config.walk.exclude = vec!["bson".to_string()];
        config.walk.max_depth = Some(3);
        config.paths.system_root = Some("/usr/lib/go/src".to_string());

        config.save(&path).expect("save should succeed");
        let loaded = StructgraphConfig::load(&path).expect("load should succeed");

        assert_eq!(loaded.walk.exclude, vec!["bson".to_string()]);
        assert_eq!(loaded.walk.max_depth, Some(3));
        assert_eq!(loaded.paths.system_root.as_deref(), Some("/usr/lib/go/src"));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[walk\nexclude = 1").unwrap();
        let err = StructgraphConfig::load(&path).unwrap_err();
        assert!(matches!(err, StructgraphError::Config(_)));
    }

    #[test]
    fn default_path_ends_with_config_toml() {
        let path = StructgraphConfig::default_path();
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn partial_toml_uses_defaults_for_missing_fields() {
        let partial = r#"
[walk]
include_tests = true
"#;
        let config: StructgraphConfig = toml::from_str(partial).expect("partial TOML should parse");
        assert!(config.walk.include_tests);
        // Other fields should use defaults
        assert!(config.walk.exclude.iter().any(|e| e == "time"));
        assert_eq!(config.walk.max_depth, None);
        assert!(config.output.pretty);
    }
}
