//! Orchestrator selection and its type-specific configuration

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::kubernetes::KubernetesConfig;

/// The cluster-management system a specification targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrchestratorKind {
    Dcos,
    Swarm,
    Kubernetes,
    SwarmMode,
}

impl OrchestratorKind {
    /// All kinds, in declaration order
    pub const ALL: [OrchestratorKind; 4] = [
        OrchestratorKind::Dcos,
        OrchestratorKind::Swarm,
        OrchestratorKind::Kubernetes,
        OrchestratorKind::SwarmMode,
    ];

    /// Canonical, case-sensitive token
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestratorKind::Dcos => "DCOS",
            OrchestratorKind::Swarm => "Swarm",
            OrchestratorKind::Kubernetes => "Kubernetes",
            OrchestratorKind::SwarmMode => "SwarmMode",
        }
    }

    pub fn is_kubernetes(&self) -> bool {
        matches!(self, OrchestratorKind::Kubernetes)
    }

    pub fn is_dcos(&self) -> bool {
        matches!(self, OrchestratorKind::Dcos)
    }
}

impl fmt::Display for OrchestratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An orchestrator token that matches none of the known kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("OrchestratorType has unknown orchestrator: {0}")]
pub struct UnknownOrchestrator(pub String);

impl FromStr for OrchestratorKind {
    type Err = UnknownOrchestrator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrchestratorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOrchestrator(s.to_string()))
    }
}

impl Serialize for OrchestratorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrchestratorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Orchestrator kind, requested release/version and its configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorProfile {
    #[serde(rename = "orchestratorType")]
    pub kind: OrchestratorKind,

    /// Requested major.minor release
    #[serde(rename = "orchestratorRelease", default)]
    pub release: String,

    /// Requested full version
    #[serde(rename = "orchestratorVersion", default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_config: Option<KubernetesConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcos_config: Option<DcosConfig>,
}

impl OrchestratorProfile {
    /// Profile for `kind` with no release, version or configuration
    pub fn new(kind: OrchestratorKind) -> Self {
        Self {
            kind,
            release: String::new(),
            version: String::new(),
            kubernetes_config: None,
            dcos_config: None,
        }
    }

    pub fn is_kubernetes(&self) -> bool {
        self.kind.is_kubernetes()
    }
}

/// DCOS-only settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DcosConfig {
    #[serde(rename = "dcosBootstrapURL")]
    pub dcos_bootstrap_url: String,
    #[serde(rename = "dcosWindowsBootstrapURL")]
    pub dcos_windows_bootstrap_url: String,
    pub registry: String,
    pub registry_user: String,
    #[serde(rename = "registryPassword")]
    pub registry_pass: String,
    #[serde(rename = "dcosRepositoryURL")]
    pub dcos_repository_url: String,
    #[serde(rename = "dcosClusterPackageListID")]
    pub dcos_cluster_package_list_id: String,
    #[serde(rename = "dcosProviderPackageID")]
    pub dcos_provider_package_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_profile: Option<BootstrapProfile>,
}

impl DcosConfig {
    /// Whether every field holds its default value
    pub fn is_empty(&self) -> bool {
        *self == DcosConfig::default()
    }
}

/// DCOS bootstrap node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BootstrapProfile {
    pub vm_size: String,
    #[serde(rename = "osDiskSizeGB")]
    pub os_disk_size_gb: i32,
    pub oauth_enabled: bool,
    #[serde(rename = "staticIP")]
    pub static_ip: String,
    pub subnet: String,
}
