// File: rescue-rules/src/config.rs
// Purpose: Engine configuration parsed from rescue.toml

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How failures are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Stop at the first failing clause
    #[default]
    FailFast,
    /// Evaluate every clause of every field
    CollectAll,
}

/// Top-level file layout; the engine only reads `[validation]`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    validation: EngineConfig,
}

/// Validation engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default aggregation mode for `Validator::validate`
    #[serde(default)]
    pub mode: Mode,

    /// Skip the remaining clauses of a non-required field holding its zero value
    #[serde(default = "default_true")]
    pub skip_empty_optional: bool,

    /// How far in the past a `future` timestamp may lie
    #[serde(default = "default_future_tolerance_secs")]
    pub future_tolerance_secs: u64,

    /// Check every rule against the registry when a record spec is built
    #[serde(default = "default_true")]
    pub strict_build: bool,
}

fn default_true() -> bool {
    true
}

fn default_future_tolerance_secs() -> u64 {
    60 * 60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            skip_empty_optional: true,
            future_tolerance_secs: default_future_tolerance_secs(),
            strict_build: true,
        }
    }
}

impl EngineConfig {
    /// Load the `[validation]` table from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from `rescue.toml` in the working directory, or defaults if absent
    ///
    /// A file that fails to load is logged and replaced by the defaults.
    ///
    /// ```
    /// use rescue_rules::{EngineConfig, Validator};
    ///
    /// let validator = Validator::from_config(EngineConfig::load_or_default());
    /// assert!(validator.config().strict_build);
    /// ```
    pub fn load_or_default() -> Self {
        Self::load_or_default_from("rescue.toml")
    }

    fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using default validation config", e);
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("invalid [validation] table")?;
        file.validation.validate()?;
        Ok(file.validation)
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if chrono::Duration::from_std(self.future_tolerance()).is_err() {
            bail!(
                "future_tolerance_secs = {} is too large to represent",
                self.future_tolerance_secs
            );
        }
        Ok(())
    }

    pub fn future_tolerance(&self) -> Duration {
        Duration::from_secs(self.future_tolerance_secs)
    }
}
