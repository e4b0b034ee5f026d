//! Cluster specification graph
//!
//! The decoder builds a [`ClusterSpec`] once; everything downstream reads it.
//! Field names follow the document format (camelCase, with the document's
//! own acronym spellings such as `vnetSubnetID`).

pub mod access;
pub mod cloud;
pub mod kubernetes;
pub mod orchestrator;
pub mod profiles;

pub use access::{
    AadProfile, KeyVaultCertificate, KeyVaultId, KeyVaultSecrets, KeyvaultSecretRef, LinuxProfile, PublicKey,
    PublicKeySet, ServicePrincipalProfile, WindowsProfile,
};
pub use cloud::{CloudEnvironment, CustomCloudProfile, ExtensionProfile, FeatureFlags};
pub use kubernetes::{AddonNodePoolsConfig, KubernetesAddon, KubernetesConfig, KubernetesContainerSpec};
pub use orchestrator::{BootstrapProfile, DcosConfig, OrchestratorKind, OrchestratorProfile, UnknownOrchestrator};
pub use profiles::{AgentPoolProfile, Extension, ImageReference, MasterProfile, SubnetAlreadySet};

use serde::{Deserialize, Serialize};

/// The root of a cluster specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default)]
    pub location: String,

    pub orchestrator_profile: OrchestratorProfile,

    pub master_profile: MasterProfile,

    #[serde(default)]
    pub agent_pool_profiles: Vec<AgentPoolProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_profile: Option<LinuxProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_profile: Option<WindowsProfile>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_profiles: Vec<ExtensionProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_profile: Option<ServicePrincipalProfile>,

    #[serde(default, rename = "aadProfile", skip_serializing_if = "Option::is_none")]
    pub aad_profile: Option<AadProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<FeatureFlags>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_cloud_profile: Option<CustomCloudProfile>,
}

impl ClusterSpec {
    /// A specification with the given orchestrator and master and nothing else
    pub fn new(orchestrator_profile: OrchestratorProfile, master_profile: MasterProfile) -> Self {
        Self {
            location: String::new(),
            orchestrator_profile,
            master_profile,
            agent_pool_profiles: Vec::new(),
            linux_profile: None,
            windows_profile: None,
            extension_profiles: Vec::new(),
            service_principal_profile: None,
            aad_profile: None,
            feature_flags: None,
            custom_cloud_profile: None,
        }
    }

    pub fn kubernetes_config(&self) -> Option<&KubernetesConfig> {
        self.orchestrator_profile.kubernetes_config.as_ref()
    }

    pub fn feature_flags(&self) -> FeatureFlags {
        self.feature_flags.unwrap_or_default()
    }

    pub fn has_windows(&self) -> bool {
        self.agent_pool_profiles.iter().any(AgentPoolProfile::is_windows)
    }

    pub fn has_coreos(&self) -> bool {
        self.master_profile.is_coreos() || self.agent_pool_profiles.iter().any(AgentPoolProfile::is_coreos)
    }

    /// Whether any master or agent profile declares zones
    pub fn has_availability_zones(&self) -> bool {
        self.master_profile.has_availability_zones()
            || self.agent_pool_profiles.iter().any(AgentPoolProfile::has_availability_zones)
    }

    /// Whether the master and every agent pool declare zones
    pub fn masters_and_agents_use_zones(&self) -> bool {
        self.master_profile.has_availability_zones()
            && self.agent_pool_profiles.iter().all(AgentPoolProfile::has_availability_zones)
    }

    /// Scale-set master with no availability-set agent pools
    pub fn is_cluster_all_vmss(&self) -> bool {
        self.master_profile.is_vmss() && !self.agent_pool_profiles.iter().any(AgentPoolProfile::is_availability_set)
    }

    pub fn agent_pool_by_name(&self, name: &str) -> Option<&AgentPoolProfile> {
        self.agent_pool_profiles.iter().find(|pool| pool.name == name)
    }

    pub fn is_azure_stack_cloud(&self) -> bool {
        self.custom_cloud_profile
            .as_ref()
            .map(CustomCloudProfile::is_azure_stack)
            .unwrap_or(false)
    }

    pub fn has_aad_admin_group_id(&self) -> bool {
        self.aad_profile
            .as_ref()
            .map(|aad| !aad.admin_group_id.is_empty())
            .unwrap_or(false)
    }

    pub fn is_ipv6_dual_stack(&self) -> bool {
        self.feature_flags().enable_ipv6_dual_stack
    }

    pub fn is_ipv6_only(&self) -> bool {
        self.feature_flags().enable_ipv6_only
    }

    /// Managed identity selected in the Kubernetes configuration
    pub fn uses_managed_identity(&self) -> bool {
        self.kubernetes_config().map(|k| k.use_managed_identity).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_pools(pools: Vec<AgentPoolProfile>) -> ClusterSpec {
        let mut spec = ClusterSpec::new(OrchestratorProfile::new(OrchestratorKind::Kubernetes), MasterProfile::default());
        spec.agent_pool_profiles = pools;
        spec
    }

    #[test]
    fn test_zone_predicates() {
        let mut zoned = AgentPoolProfile::new("zoned", 1, "Standard_D2_v2");
        zoned.availability_zones = vec!["1".to_string(), "2".to_string()];
        let plain = AgentPoolProfile::new("plain", 1, "Standard_D2_v2");

        let mut spec = spec_with_pools(vec![zoned.clone(), plain]);
        assert!(spec.has_availability_zones());
        assert!(!spec.masters_and_agents_use_zones());

        spec.master_profile.availability_zones = vec!["1".to_string()];
        spec.agent_pool_profiles = vec![zoned];
        assert!(spec.masters_and_agents_use_zones());
    }

    #[test]
    fn test_all_vmss() {
        let mut pool = AgentPoolProfile::new("pool", 1, "Standard_D2_v2");
        pool.availability_profile = "VirtualMachineScaleSets".to_string();
        let mut spec = spec_with_pools(vec![pool]);
        assert!(!spec.is_cluster_all_vmss());

        spec.master_profile.availability_profile = "VirtualMachineScaleSets".to_string();
        assert!(spec.is_cluster_all_vmss());

        spec.agent_pool_profiles[0].availability_profile = "AvailabilitySet".to_string();
        assert!(!spec.is_cluster_all_vmss());
    }

    #[test]
    fn test_profile_lookups() {
        let mut windows = AgentPoolProfile::new("winpool", 2, "Standard_D2_v2");
        windows.os_type = "Windows".to_string();
        let spec = spec_with_pools(vec![AgentPoolProfile::new("linux", 1, "Standard_D2_v2"), windows]);

        assert!(spec.has_windows());
        assert_eq!(spec.agent_pool_by_name("winpool").map(|p| p.count), Some(2));
        assert!(spec.agent_pool_by_name("other").is_none());
        assert!(!spec.is_azure_stack_cloud());
        assert!(!spec.has_aad_admin_group_id());
        assert!(!spec.uses_managed_identity());
    }
}
