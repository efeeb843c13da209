//! Build configuration
//!
//! Tolerances and cutting allowances shared by every generator, stored as
//! RON next to part requests.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{CUT_EXTENSION, DEFAULT_COLOR, ORTHOGONALITY_TOLERANCE, TOL};

/// Settings applied to every part build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Maximum |dot| accepted between normalized frame axes
    pub orthogonality_tolerance: f64,
    /// Length added at each end of cutting shapes (mm)
    pub cut_extension: f64,
    /// Printing clearance added to hole diameters (mm)
    pub clearance_tolerance: f64,
    /// Color used when a generator gives no hint (RGBA)
    pub default_color: [f32; 4],
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            orthogonality_tolerance: ORTHOGONALITY_TOLERANCE,
            cut_extension: CUT_EXTENSION,
            clearance_tolerance: TOL,
            default_color: DEFAULT_COLOR,
        }
    }
}

impl BuildConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.orthogonality_tolerance.is_finite() && self.orthogonality_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "orthogonality_tolerance must be positive, got {}",
                self.orthogonality_tolerance
            )));
        }
        if !(self.cut_extension.is_finite() && self.cut_extension >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cut_extension must not be negative, got {}",
                self.cut_extension
            )));
        }
        if !(self.clearance_tolerance.is_finite() && self.clearance_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "clearance_tolerance must not be negative, got {}",
                self.clearance_tolerance
            )));
        }
        Ok(())
    }

    /// Parse and validate a RON document
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: BuildConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
