//! Settings discovery from implicit-tags.toml and pyproject.toml.
//!
//! Follows the ruff/black convention:
//! - Standalone `implicit-tags.toml` in the working directory
//! - `[tool.implicit-tags]` section in pyproject.toml
//!
//! ## Example
//!
//! ```toml
//! [tool.implicit-tags]
//! calibration-percentile = 30
//! min-specificity = 1.5
//! confidence-margin = 0.05
//! must-bridge = true
//! min-edge-weight = 3
//! ```
//!
//! Missing keys fall back to [`Settings::default`]. A file that exists but
//! does not parse or validate is an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, TaggingError};
use crate::types::{CalibrationPercentile, Settings};

/// Standalone config file name.
pub const CONFIG_FILE: &str = "implicit-tags.toml";

/// Settings together with the file they were read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Source file for this config (for display). `None` means defaults.
    pub source: Option<PathBuf>,
    pub settings: Settings,
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    calibration_percentile: Option<u8>,
    min_specificity: Option<f64>,
    confidence_margin: Option<f64>,
    must_bridge: Option<bool>,
    min_edge_weight: Option<usize>,
}

/// Wrapper for pyproject.toml structure.
#[derive(Debug, Deserialize)]
struct PyProject {
    tool: Option<PyProjectTool>,
}

#[derive(Debug, Deserialize)]
struct PyProjectTool {
    #[serde(rename = "implicit-tags")]
    implicit_tags: Option<RawConfig>,
}

impl Config {
    /// Load configuration for the given directory.
    ///
    /// Search order:
    /// 1. implicit-tags.toml in directory
    /// 2. pyproject.toml [tool.implicit-tags] in directory
    /// 3. Walk up to find a pyproject.toml carrying the section
    /// 4. Defaults if nothing found
    pub fn load(directory: &Path) -> Result<Self> {
        let standalone = directory.join(CONFIG_FILE);
        if standalone.exists() {
            return Self::load_standalone(&standalone);
        }

        let mut current = Some(directory);
        while let Some(dir) = current {
            let pyproject = dir.join("pyproject.toml");
            if pyproject.exists() {
                if let Some(config) = Self::load_pyproject(&pyproject)? {
                    return Ok(config);
                }
            }
            current = dir.parent();
        }

        debug!(directory = %directory.display(), "no config found, using defaults");
        Ok(Self::default())
    }

    /// Parse a standalone config document held in memory.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| TaggingError::Config {
            path: PathBuf::from("<memory>"),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: None,
            settings: raw.into_settings()?,
        })
    }

    fn load_standalone(path: &Path) -> Result<Self> {
        let content = read(path)?;
        let raw: RawConfig = toml::from_str(&content).map_err(|e| config_error(path, e))?;
        Self::from_raw(raw, path)
    }

    /// `Ok(None)` when the pyproject has no `[tool.implicit-tags]` section.
    fn load_pyproject(path: &Path) -> Result<Option<Self>> {
        let content = read(path)?;
        let pyproject: PyProject = toml::from_str(&content).map_err(|e| config_error(path, e))?;
        match pyproject.tool.and_then(|tool| tool.implicit_tags) {
            Some(raw) => Self::from_raw(raw, path).map(Some),
            None => Ok(None),
        }
    }

    fn from_raw(raw: RawConfig, source: &Path) -> Result<Self> {
        let settings = raw.into_settings().map_err(|e| config_error(source, e))?;
        debug!(source = %source.display(), "loaded settings");
        Ok(Self {
            source: Some(source.to_path_buf()),
            settings,
        })
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let s = &self.settings;
        let source = match self.source {
            Some(ref path) => path.display().to_string(),
            None => "(defaults)".to_string(),
        };
        [
            format!("   Config: {}", source),
            format!("   Percentile: {}", s.calibration_percentile),
            format!("   Min specificity: {:.1}", s.min_specificity),
            format!("   Confidence margin: {:.2}", s.confidence_margin),
            format!("   Must bridge: {}", s.must_bridge),
            format!("   Min edge weight: {}", s.min_edge_weight),
        ]
        .join("\n")
    }
}

impl RawConfig {
    fn into_settings(self) -> Result<Settings> {
        let defaults = Settings::default();
        let calibration_percentile = match self.calibration_percentile {
            Some(value) => CalibrationPercentile::try_from(value)?,
            None => defaults.calibration_percentile,
        };
        let settings = Settings {
            calibration_percentile,
            min_specificity: self.min_specificity.unwrap_or(defaults.min_specificity),
            confidence_margin: self.confidence_margin.unwrap_or(defaults.confidence_margin),
            must_bridge: self.must_bridge.unwrap_or(defaults.must_bridge),
            min_edge_weight: self.min_edge_weight.unwrap_or(defaults.min_edge_weight),
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| config_error(path, e))
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> TaggingError {
    TaggingError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
