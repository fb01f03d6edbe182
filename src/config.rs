//! Configuration management for the hat try-on pipeline

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera projection parameters
    pub projection: ProjectionConfig,

    /// Smoothing coefficients
    pub smoothing: SmoothingConfig,

    /// Anchor tuning constants
    pub anchor: AnchorConfig,

    /// User calibration sliders
    pub calibration: CalibrationConfig,

    /// Session start-up selection
    pub session: SessionConfig,
}

/// Camera projection parameters for the fixed depth-plane approximation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees
    pub vertical_fov_deg: f64,

    /// Width over height of the view
    pub aspect: f64,

    /// Assumed distance of the face plane from the camera. A calibration
    /// constant, not a measured depth.
    pub depth: f64,
}

/// Per-channel exponential smoothing coefficients, each in (0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Position blend factor
    pub position_alpha: f64,

    /// Orientation blend factor
    pub rotation_alpha: f64,

    /// Scale blend factor
    pub scale_alpha: f64,
}

/// Anchor derivation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Multiplier from world inter-eye distance to overlay scale. A
    /// calibration constant tuned per model family.
    pub scale_gain: f64,

    /// Fraction of the target scale the anchor is moved up from the
    /// forehead center toward the crown
    pub crown_offset: f64,
}

/// User-facing calibration, layered statically on the solved transform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Additional vertical offset in world units (-3 to 3)
    pub vertical_offset: f64,

    /// Uniform scale multiplier (0.1 to 3)
    pub scale_factor: f64,
}

/// Session start-up selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Camera device id; `None` selects the default device
    pub device_id: Option<String>,

    /// Overlay model loaded at start; `None` starts with no model
    pub model_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            smoothing: SmoothingConfig::default(),
            anchor: AnchorConfig::default(),
            calibration: CalibrationConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            vertical_fov_deg: 60.0,
            aspect: 16.0 / 9.0,
            depth: 1.0,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            position_alpha: 0.25,
            rotation_alpha: 0.25,
            scale_alpha: 0.25,
        }
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            scale_gain: 1.0,
            crown_offset: 0.25,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            vertical_offset: 0.0,
            scale_factor: 1.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            model_path: Some("models/hat1.glb".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.projection.vertical_fov_deg <= 0.0 || self.projection.vertical_fov_deg >= 180.0 {
            return Err(Error::ConfigError(
                "Vertical field of view must be between 0 and 180 degrees".to_string(),
            ));
        }
        if self.projection.aspect <= 0.0 {
            return Err(Error::ConfigError(
                "Aspect ratio must be positive".to_string(),
            ));
        }
        if self.projection.depth <= 0.0 {
            return Err(Error::ConfigError(
                "Depth plane distance must be positive".to_string(),
            ));
        }

        for (name, alpha) in [
            ("Position", self.smoothing.position_alpha),
            ("Rotation", self.smoothing.rotation_alpha),
            ("Scale", self.smoothing.scale_alpha),
        ] {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(Error::ConfigError(format!(
                    "{} alpha must be in (0, 1]",
                    name
                )));
            }
        }

        if self.anchor.scale_gain <= 0.0 {
            return Err(Error::ConfigError(
                "Scale gain must be positive".to_string(),
            ));
        }
        if self.anchor.crown_offset < 0.0 {
            return Err(Error::ConfigError(
                "Crown offset must be non-negative".to_string(),
            ));
        }

        if !(-3.0..=3.0).contains(&self.calibration.vertical_offset) {
            return Err(Error::ConfigError(
                "Vertical offset must be between -3.0 and 3.0".to_string(),
            ));
        }
        if !(0.1..=3.0).contains(&self.calibration.scale_factor) {
            return Err(Error::ConfigError(
                "Scale factor must be between 0.1 and 3.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Hat Try-On Configuration

# Camera projection (fixed depth-plane approximation)
projection:
  vertical_fov_deg: 60.0
  aspect: 1.7778
  depth: 1.0

# Exponential smoothing coefficients, each in (0, 1]
smoothing:
  position_alpha: 0.25
  rotation_alpha: 0.25
  scale_alpha: 0.25

# Anchor tuning
anchor:
  scale_gain: 1.0
  crown_offset: 0.25

# User calibration
calibration:
  vertical_offset: 0.0
  scale_factor: 1.0

# Session start-up selection
session:
  device_id: null
  model_path: "models/hat1.glb"
"#;
