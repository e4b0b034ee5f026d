//! Error types for decoding specifications and loading version catalogs

use thiserror::Error;

/// Failure to turn a serialized document into a [`crate::ClusterSpec`]
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The JSON document is malformed or does not match the model
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML document is malformed or does not match the model
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to build a version catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The TOML table could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A catalog entry is not a semantic version
    #[error("invalid catalog version '{version}' for {kind}")]
    InvalidVersion { kind: String, version: String },

    /// The default release is not a major.minor string
    #[error("invalid default release '{release}' for {kind}")]
    InvalidRelease { kind: String, release: String },
}

impl CatalogError {
    /// Create an invalid version error
    pub fn invalid_version(kind: impl Into<String>, version: impl Into<String>) -> Self {
        CatalogError::InvalidVersion {
            kind: kind.into(),
            version: version.into(),
        }
    }

    /// Create an invalid release error
    pub fn invalid_release(kind: impl Into<String>, release: impl Into<String>) -> Self {
        CatalogError::InvalidRelease {
            kind: kind.into(),
            release: release.into(),
        }
    }
}

/// Result type alias for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;
