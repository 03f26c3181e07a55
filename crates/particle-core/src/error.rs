//! Error types for the configuration boundary and the sensor producers.
//!
//! Nothing in the per-frame path returns an error: configuration problems are
//! rejected before a value reaches the core, and sensor problems are recovered
//! by the session that owns the producer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown shape `{0}` (expected one of Sphere, Heart, Saturn, Galaxy, Cube, Burst)")]
    UnknownShape(String),
    #[error("invalid color `{0}` (expected #rrggbb or #rgb)")]
    InvalidColor(String),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures reported by a hand or audio producer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SensorError {
    /// Permission denied or no device present.
    #[error("sensor unavailable: {0}")]
    Unavailable(String),
    /// The inference back-end could not be started.
    #[error("model load failed: {0}")]
    ModelLoad(String),
    /// The inference back-end failed while running.
    #[error("inference failed: {0}")]
    Inference(String),
    /// The producer's source ended.
    #[error("sensor disconnected")]
    Disconnected,
    #[error("sensor session already running")]
    AlreadyRunning,
}
