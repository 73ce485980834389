//! Bridge configuration
//!
//! Loaded from a TOML file; every section and field may be omitted.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Authoring size units per native size unit.
pub const DEFAULT_SIZE_SCALE: f32 = 0.1;

/// Default cap on live native instances.
pub const DEFAULT_MAX_INSTANCES: usize = 1024;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub extraction: ExtractionConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

/// Authoring extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Applied once to the start-size curve and the shape radius.
    pub size_scale: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            size_scale: DEFAULT_SIZE_SCALE,
        }
    }
}

/// Instance lifecycle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum simultaneously registered instances.
    pub max_instances: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
    /// Route native engine log lines into `tracing`.
    pub forward_native: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            forward_native: true,
        }
    }
}

impl BridgeConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = self.to_toml_string().context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.extraction.size_scale.is_finite() && self.extraction.size_scale > 0.0,
            "extraction.size_scale must be a positive finite number, got {}",
            self.extraction.size_scale
        );
        anyhow::ensure!(
            self.runtime.max_instances > 0,
            "runtime.max_instances must be at least 1"
        );
        Ok(())
    }
}
