//! Scene configuration loaded from TOML, validated before anything reaches the core.

use crate::color::Rgb;
use crate::error::ConfigError;
use crate::shape::ParticleShape;
use crate::snapshot::SnapshotConfig;
use crate::spectrum::AnalyserConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "RenderConfig::default_point_size")]
    pub point_size: f32,
    #[serde(default = "RenderConfig::default_opacity")]
    pub opacity: f32,
    #[serde(default = "RenderConfig::default_camera_distance")]
    pub camera_distance: f32,
    #[serde(default = "RenderConfig::default_fov_degrees")]
    pub fov_degrees: f32,
}

impl RenderConfig {
    fn default_point_size() -> f32 {
        0.08
    }
    fn default_opacity() -> f32 {
        0.8
    }
    fn default_camera_distance() -> f32 {
        15.0
    }
    fn default_fov_degrees() -> f32 {
        60.0
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            point_size: Self::default_point_size(),
            opacity: Self::default_opacity(),
            camera_distance: Self::default_camera_distance(),
            fov_degrees: Self::default_fov_degrees(),
        }
    }
}

/// Everything the configuration surface can set.
///
/// Shape and color are validated while deserializing, so an unknown shape
/// name or a malformed hex string fails here and never reaches the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub shape: ParticleShape,
    #[serde(default)]
    pub color: Rgb,
    #[serde(default)]
    pub camera_enabled: bool,
    #[serde(default)]
    pub audio_enabled: bool,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub audio: AnalyserConfig,
    #[serde(default)]
    pub snapshot: Option<SnapshotConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shape: ParticleShape::default(),
            color: Rgb::default(),
            camera_enabled: false,
            audio_enabled: false,
            render: RenderConfig::default(),
            audio: AnalyserConfig::default(),
            snapshot: None,
        }
    }
}

impl SceneConfig {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("[config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&contents)?;
        log::info!("[config] loaded {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.render;
        if !(r.point_size.is_finite() && r.point_size > 0.0) {
            return Err(invalid("render.point_size", "must be positive"));
        }
        if !(0.0..=1.0).contains(&r.opacity) {
            return Err(invalid("render.opacity", "must be within [0, 1]"));
        }
        if !(r.camera_distance.is_finite() && r.camera_distance > 0.0) {
            return Err(invalid("render.camera_distance", "must be positive"));
        }
        if !(1.0..179.0).contains(&r.fov_degrees) {
            return Err(invalid("render.fov_degrees", "must be within [1, 179)"));
        }
        let a = &self.audio;
        if !a.fft_size.is_power_of_two() || !(32..=32_768).contains(&a.fft_size) {
            return Err(invalid("audio.fft_size", "must be a power of two in [32, 32768]"));
        }
        if !(0.0..=1.0).contains(&a.smoothing) {
            return Err(invalid("audio.smoothing", "must be within [0, 1]"));
        }
        if a.min_db >= a.max_db {
            return Err(invalid("audio.min_db", "must be below audio.max_db"));
        }
        if let Some(s) = &self.snapshot {
            s.validate()?;
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}
