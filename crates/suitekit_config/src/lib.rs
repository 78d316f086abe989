//! Run configuration for suitekit
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! environment variables, then whatever the command line overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming a single suite to run.
pub const ENV_SUITE: &str = "SUITEKIT_SUITE";
/// Environment variable overriding the default log filter.
pub const ENV_LOG_FILTER: &str = "SUITEKIT_LOG_FILTER";

pub const DEFAULT_LOG_FILTER: &str = "suitekit=info";

/// Which registered suites a run executes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "suite")]
pub enum RunMode {
    /// Every suite flagged automatic, in registry order
    #[default]
    Automatic,
    /// Only suites with this name, whether automatic or manual
    Named(String),
}

impl RunMode {
    pub fn named(name: impl Into<String>) -> Self {
        RunMode::Named(name.into())
    }

    /// Short label for log output
    pub fn describe(&self) -> String {
        match self {
            RunMode::Automatic => "all automatic suites".to_string(),
            RunMode::Named(name) => format!("suite {name}"),
        }
    }
}

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Suite selection
    pub mode: RunMode,

    /// Filter passed to the log subscriber when `SUITEKIT_LOG` is unset
    pub log_filter: String,

    /// List registered suites instead of running them
    pub list_only: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Automatic,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            list_only: false,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(lookup);
        config
    }

    /// Load configuration from TOML file
    #[cfg(feature = "toml-config")]
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: HarnessConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from TOML file (stub when toml feature is disabled)
    #[cfg(not(feature = "toml-config"))]
    pub fn from_file(_path: &Path) -> anyhow::Result<Self> {
        anyhow::bail!("TOML support not enabled. Enable the 'toml-config' feature.")
    }

    /// Merge with environment variables (env vars take precedence)
    pub fn merge_with_env(self) -> Self {
        self.merge_with_lookup(|key| std::env::var(key).ok())
    }

    pub fn merge_with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.apply_lookup(lookup);
        self
    }

    fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_SUITE).filter(|name| !name.trim().is_empty()) {
            self.mode = RunMode::Named(name.trim().to_string());
        }

        if let Some(filter) = lookup(ENV_LOG_FILTER).filter(|filter| !filter.is_empty()) {
            self.log_filter = filter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.mode, RunMode::Automatic);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(!config.list_only);
    }

    #[test]
    fn test_lookup_selects_named_suite() {
        let env = vars(&[(ENV_SUITE, " Interactive ")]);
        let config = HarnessConfig::from_lookup(|key| env.get(key).cloned());
        assert_eq!(config.mode, RunMode::named("Interactive"));
    }

    #[test]
    fn test_blank_suite_keeps_automatic_mode() {
        let env = vars(&[(ENV_SUITE, "  ")]);
        let config = HarnessConfig::from_lookup(|key| env.get(key).cloned());
        assert_eq!(config.mode, RunMode::Automatic);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let from_file = HarnessConfig {
            mode: RunMode::named("FromFile"),
            log_filter: "suitekit=debug".to_string(),
            list_only: true,
        };
        let env = vars(&[(ENV_LOG_FILTER, "suitekit=trace")]);
        let merged = from_file.merge_with_lookup(|key| env.get(key).cloned());

        assert_eq!(merged.mode, RunMode::named("FromFile"));
        assert_eq!(merged.log_filter, "suitekit=trace");
        assert!(merged.list_only);
    }

    #[test]
    fn test_describe_mode() {
        assert_eq!(RunMode::Automatic.describe(), "all automatic suites");
        assert_eq!(RunMode::named("X").describe(), "suite X");
    }

    #[test]
    #[cfg(feature = "toml-config")]
    fn test_config_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_filter = \"suitekit=debug\"\n\n[mode]\nkind = \"named\"\nsuite = \"Manual\""
        )
        .unwrap();

        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, RunMode::named("Manual"));
        assert_eq!(config.log_filter, "suitekit=debug");
        assert!(!config.list_only);
    }

    #[test]
    #[cfg(not(feature = "toml-config"))]
    fn test_config_from_file_requires_feature() {
        let err = HarnessConfig::from_file(Path::new("suitekit.toml")).unwrap_err();
        assert!(err.to_string().contains("toml-config"));
    }
}
