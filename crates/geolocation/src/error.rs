//! Error types for geolocation computation and caching.

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur while resolving, computing, caching or subsetting
/// grid coordinates.
#[derive(Error, Debug)]
pub enum GeolocationError {
    /// The cache configuration is unusable. Disables caching, never fatal
    /// to a request.
    #[error("configuration error: {0}")]
    Config(String),

    /// An advisory lock on a cache file could not be taken or released.
    #[error("lock error on {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A cache file exists but does not hold a complete entry.
    #[error("corrupt cache entry {key}: {reason}")]
    CacheCorrupt { key: String, reason: String },

    /// Projection metadata is missing or the projection cannot be evaluated.
    #[error("projection error: {0}")]
    Projection(String),

    /// The requested hyperslab does not fit the variable.
    #[error("invalid subset: {0}")]
    Subset(String),

    /// Undefined coordinates could not be reconstructed.
    #[error("cannot repair undefined {field} values: {reason}")]
    Repair { field: String, reason: String },

    /// The grid metadata provider failed.
    #[error("grid provider error: {0}")]
    Provider(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    Io(String),
}

impl GeolocationError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Lock error.
    pub fn lock(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Lock {
            path: path.into(),
            source,
        }
    }

    /// Create a CacheCorrupt error.
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheCorrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Projection error.
    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }

    /// Create a Subset error.
    pub fn subset(msg: impl Into<String>) -> Self {
        Self::Subset(msg.into())
    }

    /// Create a Repair error.
    pub fn repair(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Repair {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the request can proceed by discarding the cache entry and
    /// recomputing.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CacheCorrupt { .. })
    }
}

impl From<std::io::Error> for GeolocationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<projection::ProjectionError> for GeolocationError {
    fn from(err: projection::ProjectionError) -> Self {
        Self::Projection(err.to_string())
    }
}

impl From<ProviderError> for GeolocationError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

/// Result type for geolocation operations.
pub type Result<T> = std::result::Result<T, GeolocationError>;
