//! Error types for projection setup and grid transforms.

use thiserror::Error;

/// Errors raised while building a projection or transforming grid indices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The GCTP projection code has no implementation here.
    #[error("unsupported projection code: {0}")]
    UnsupportedCode(i32),

    /// A projection parameter is out of its valid domain.
    #[error("invalid projection parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The grid geometry cannot be used (zero sized, degenerate corners).
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),

    /// Row and column index slices disagree in length.
    #[error("row/column index length mismatch: {rows} rows vs {cols} cols")]
    IndexLengthMismatch { rows: usize, cols: usize },
}

impl ProjectionError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }

    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
