//! Validator configuration

use serde::{Deserialize, Serialize};

/// Knobs for the validator that do not change which specifications pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Log advisory warnings (deprecations, preview features)
    pub emit_warnings: bool,

    /// Overrides the catalog's default Kubernetes release
    pub kubernetes_default_release: Option<String>,

    /// Overrides the catalog's default DCOS release
    pub dcos_default_release: Option<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            emit_warnings: true,
            kubernetes_default_release: None,
            dcos_default_release: None,
        }
    }
}

impl ValidatorConfig {
    /// Create a new config builder
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::new()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            emit_warnings: std::env::var("CLUSTERSPEC_EMIT_WARNINGS")
                .map(|v| v.parse().unwrap_or(true))
                .unwrap_or(true),
            kubernetes_default_release: std::env::var("CLUSTERSPEC_KUBERNETES_DEFAULT_RELEASE")
                .ok()
                .filter(|v| !v.is_empty()),
            dcos_default_release: std::env::var("CLUSTERSPEC_DCOS_DEFAULT_RELEASE")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

/// Builder for ValidatorConfig
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Enable or disable warning logs
    pub fn emit_warnings(mut self, enabled: bool) -> Self {
        self.config.emit_warnings = enabled;
        self
    }

    pub fn kubernetes_default_release(mut self, release: impl Into<String>) -> Self {
        self.config.kubernetes_default_release = Some(release.into());
        self
    }

    pub fn dcos_default_release(mut self, release: impl Into<String>) -> Self {
        self.config.dcos_default_release = Some(release.into());
        self
    }

    /// Build the config
    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}

impl Default for ValidatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
