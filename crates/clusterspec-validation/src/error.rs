//! Error types for cluster specification validation
//!
//! Validation is fail-fast: the first violated check becomes the single
//! [`ValidationError`] returned to the caller. The message is reported
//! verbatim; the variant classifies the failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, out-of-range or malformed field
    Structural,
    /// Mutually exclusive or inconsistent fields
    Conflict,
    /// Version cannot be resolved or is too old for a feature
    Version,
    /// Combination outside an allow-list
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Structural => write!(f, "structural"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::Version => write!(f, "version"),
            ErrorKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// The first violation found in a specification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Structural(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Version(String),

    #[error("{0}")]
    Unsupported(String),
}

impl ValidationError {
    /// Create a structural error
    pub fn structural(msg: impl Into<String>) -> Self {
        ValidationError::Structural(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        ValidationError::Conflict(msg.into())
    }

    /// Create a version error
    pub fn version(msg: impl Into<String>) -> Self {
        ValidationError::Version(msg.into())
    }

    /// Create an unsupported-combination error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        ValidationError::Unsupported(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Structural(_) => ErrorKind::Structural,
            ValidationError::Conflict(_) => ErrorKind::Conflict,
            ValidationError::Version(_) => ErrorKind::Version,
            ValidationError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    /// The human-readable reason
    pub fn message(&self) -> &str {
        match self {
            ValidationError::Structural(msg)
            | ValidationError::Conflict(msg)
            | ValidationError::Version(msg)
            | ValidationError::Unsupported(msg) => msg,
        }
    }
}

/// Result type alias for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_verbatim() {
        let err = ValidationError::structural("missing Properties.MasterProfile.DNSPrefix");
        assert_eq!(err.to_string(), "missing Properties.MasterProfile.DNSPrefix");
        assert_eq!(err.message(), "missing Properties.MasterProfile.DNSPrefix");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ValidationError::structural("x").kind(), ErrorKind::Structural);
        assert_eq!(ValidationError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(ValidationError::version("x").kind(), ErrorKind::Version);
        assert_eq!(ValidationError::unsupported("x").kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::Unsupported).unwrap();
        assert_eq!(json, "\"unsupported\"");
        assert_eq!(ErrorKind::Version.to_string(), "version");
    }
}
