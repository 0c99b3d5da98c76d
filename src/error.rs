//! Errors returned by `HyperLogLog` construction, merging and decoding.

use thiserror::Error;

use crate::config::Configuration;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the immediate caller. Estimator state is never partially
/// modified when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Relative standard deviation or max cardinality is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Estimators built from different configurations cannot be merged.
    #[error("configuration mismatch: expected {expected:?}, got {actual:?}")]
    ConfigurationMismatch {
        expected: Configuration,
        actual: Configuration,
    },

    /// Serialized bytes are truncated or inconsistent with their header.
    #[error("malformed serialized data: {0}")]
    MalformedSerializedData(String),
}
