//! Configuration errors.

use thiserror::Error;

/// Errors raised while validating or loading an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid scale bounds: min {min} must be positive and not exceed max {max}")]
    InvalidScaleBounds { min: f64, max: f64 },
    #[error("Invalid initial scale: {0}")]
    InvalidInitialScale(f64),
    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("History capacity must be at least 1")]
    ZeroHistoryCapacity,
    #[error("Invalid grid size: {0}")]
    InvalidGridSize(f64),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
