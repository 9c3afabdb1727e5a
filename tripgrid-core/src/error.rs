//! Error types for the tripgrid engine.
//!
//! Layout and gesture handling never fail: malformed items are skipped and
//! unmeasured viewports produce empty geometry. These errors only cover the
//! edges where the host hands the engine configuration or raw input.

use thiserror::Error;

/// Errors that can occur while configuring or feeding the grid.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid trip bounds: {start} is after {end}")]
    InvalidBounds { start: String, end: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for tripgrid operations.
pub type GridResult<T> = Result<T, GridError>;
