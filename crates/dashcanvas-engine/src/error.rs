//! Engine construction errors.

use dashcanvas_core::error::ConfigError;
use thiserror::Error;

/// Errors that prevent an engine from being built.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No container provided")]
    MissingContainer,
    #[error("Container has invalid bounds: {width}x{height}")]
    InvalidContainer { width: f64, height: f64 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Result type for engine construction.
pub type EngineResult<T> = Result<T, EngineError>;
