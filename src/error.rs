//! Error types for Flurry.
//!
//! Only configuration can fail: reading, parsing, validating or editing a
//! [`ParticleAsset`](crate::ParticleAsset). Simulation itself never errors;
//! capacity exhaustion and unknown enumerations degrade silently.

use std::io;
use thiserror::Error;

/// Errors that can occur while loading, validating or editing an asset.
#[derive(Error, Debug)]
pub enum AssetError {
    /// Failed to read or write asset data on disk.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Asset data is not well-formed.
    #[error("Malformed asset data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Asset parsed but one of its values is out of range.
    #[error("Invalid asset: `{field}` {reason}")]
    Invalid { field: String, reason: String },

    /// `set_property` was given a key that does not exist in the asset.
    #[error("Unknown property: `{0}`")]
    UnknownProperty(String),

    /// `set_property` was given a value the property cannot hold.
    #[error("Invalid value for property `{key}`: {reason}")]
    InvalidPropertyValue { key: String, reason: String },
}

impl AssetError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AssetError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using [`AssetError`].
pub type Result<T> = std::result::Result<T, AssetError>;
