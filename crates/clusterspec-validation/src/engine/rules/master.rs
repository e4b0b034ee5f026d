//! Master profile rule, plus the scale-set and distro checks shared with agent pools

use clusterspec_core::constants::{distro, storage};
use clusterspec_core::{ImageReference, OrchestratorKind};
use semver::Version;
use tracing::warn;

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::{validate_dns_prefix, validate_proximity_placement_group_id};

pub fn check_master_profile(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    let master = &spec.master_profile;

    if context.is_kubernetes() {
        if master.is_vmss() && master.is_custom_vnet() && !master.first_consecutive_static_ip.is_empty() {
            return Err(ValidationError::conflict(
                "when masterProfile's availabilityProfile is VirtualMachineScaleSets and a vnetSubnetID is specified, the firstConsecutiveStaticIP should be empty and will be determined by an offset from the first IP in the vnetCidr",
            ));
        }
        if (spec.is_ipv6_dual_stack() || spec.is_ipv6_only()) && master.is_coreos() {
            return Err(ValidationError::unsupported(format!(
                "Dual stack and single stack IPv6 feature is currently supported only with Ubuntu, but master is of distro type {}",
                master.distro
            )));
        }
    }

    if let Some(image_ref) = &master.image_ref {
        if !master.distro.is_empty() {
            return Err(ValidationError::conflict(
                "masterProfile includes a custom image configuration (imageRef) and an explicit distro configuration, you may use one of these but not both simultaneously",
            ));
        }
        validate_image_reference(image_ref)?;
    }

    if master.is_vmss() && context.is_kubernetes() {
        if context.warnings_enabled() {
            warn!("Clusters with VMSS masters are not yet upgradable! You will not be able to upgrade your cluster until a future version of aks-engine!");
        }
        validate_vmss(context, false, &master.storage_profile)?;
        if !spec.is_cluster_all_vmss() {
            return Err(ValidationError::conflict(
                "VirtualMachineScaleSets for master profile must be used together with virtualMachineScaleSets for agent profiles. Set \"availabilityProfile\" to \"VirtualMachineScaleSets\" for agent profiles",
            ));
        }
        let user_assigned_id = context
            .kubernetes_config()
            .map(|k| k.user_assigned_id.as_str())
            .unwrap_or_default();
        if spec.uses_managed_identity() && user_assigned_id.is_empty() {
            return Err(ValidationError::conflict(
                "virtualMachineScaleSets for master profile can be used only with user assigned MSI ! Please specify \"userAssignedID\" in \"kubernetesConfig\"",
            ));
        }
    }

    if master.single_placement_group.is_set() && master.is_availability_set() {
        return Err(ValidationError::conflict(
            "singlePlacementGroup is only supported with VirtualMachineScaleSets",
        ));
    }

    if !master.proximity_placement_group_id.is_empty() {
        validate_proximity_placement_group_id(&master.proximity_placement_group_id)?;
    }
    validate_distro(&master.distro, context.is_update)?;

    if master.audit_d_enabled.is_enabled() && !master.distro.is_empty() && !master.is_ubuntu() {
        return Err(ValidationError::conflict(
            "You have enabled auditd for master vms, but you did not specify an Ubuntu-based distro.",
        ));
    }

    validate_dns_prefix(&master.dns_prefix)
}

/// A custom image names both the image and its resource group, or neither
pub(crate) fn validate_image_reference(image_ref: &ImageReference) -> Result<()> {
    if !image_ref.is_partial() {
        return Ok(());
    }
    if image_ref.name.is_empty() {
        Err(ValidationError::structural(
            "imageName needs to be specified when imageResourceGroup is provided",
        ))
    } else {
        Err(ValidationError::structural(
            "imageResourceGroup needs to be specified when imageName is provided",
        ))
    }
}

/// Deprecated distros are tolerated only when updating an existing cluster
pub(crate) fn validate_distro(name: &str, is_update: bool) -> Result<()> {
    if distro::VALUES.contains(&name) {
        return Ok(());
    }
    if is_update && distro::DEPRECATED_VALUES.contains(&name) {
        return Ok(());
    }
    let message = match name {
        distro::AKS_DOCKER_ENGINE | distro::AKS_1604_DEPRECATED => format!(
            "The {} distro is deprecated, please use {} instead",
            name,
            distro::AKS_UBUNTU_1604
        ),
        distro::AKS_1804_DEPRECATED => format!(
            "The {} distro is deprecated, please use {} instead",
            name,
            distro::AKS_UBUNTU_1804
        ),
        _ => format!("The {} distro is not supported", name),
    };
    Err(ValidationError::unsupported(message))
}

/// Version and storage requirements of scale-set backed profiles
pub(crate) fn validate_vmss(context: &RuleContext<'_>, is_update: bool, storage_profile: &str) -> Result<()> {
    if context.kind() != OrchestratorKind::Kubernetes {
        return Ok(());
    }

    let (kind, release, version) = (context.kind(), context.raw_release(), context.raw_version());
    let resolved = context
        .rationalizer()
        .resolve(kind, release, version, is_update, false)
        .ok_or_else(|| {
            ValidationError::version(format!(
                "the following OrchestratorProfile configuration is not supported: OrchestratorType: {}, OrchestratorRelease: {}, OrchestratorVersion: {}. Please check supported Release or Version for this build of aks-engine",
                kind, release, version
            ))
        })?;
    let sv = Version::parse(&resolved)
        .map_err(|_| ValidationError::version(format!("could not validate version {}", resolved)))?;

    if sv < Version::new(1, 10, 0) {
        return Err(ValidationError::version(
            "VirtualMachineScaleSets are only available in Kubernetes version 1.10.0 or greater. Please set \"orchestratorVersion\" to 1.10.0 or above",
        ));
    }

    let instance_metadata = context
        .kubernetes_config()
        .map(|k| k.use_instance_metadata.is_enabled())
        .unwrap_or(false);
    if instance_metadata && sv < Version::new(1, 10, 2) {
        return Err(ValidationError::version(
            "VirtualMachineScaleSets with instance metadata is supported for Kubernetes version 1.10.2 or greater. Please set \"useInstanceMetadata\": false in \"kubernetesConfig\" or set \"orchestratorVersion\" to 1.10.2 or above",
        ));
    }

    if storage_profile == storage::STORAGE_ACCOUNT {
        return Err(ValidationError::conflict(
            "VirtualMachineScaleSets does not support StorageAccount disks.  Please specify \"storageProfile\": \"ManagedDisks\" (recommended) or \"availabilityProfile\": \"AvailabilitySet\"",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::error::ErrorKind;
    use clusterspec_core::{
        AgentPoolProfile, ClusterSpec, FeatureFlags, KubernetesConfig, MasterProfile, OrchestratorProfile,
        StaticCatalog, Toggle,
    };

    fn spec() -> ClusterSpec {
        let mut orchestrator = OrchestratorProfile::new(OrchestratorKind::Kubernetes);
        orchestrator.kubernetes_config = Some(KubernetesConfig::default());
        let mut master = MasterProfile::default();
        master.count = 1;
        master.dns_prefix = "mycluster".into();
        master.vm_size = "Standard_D2_v2".into();
        let mut spec = ClusterSpec::new(orchestrator, master);
        spec.agent_pool_profiles = vec![AgentPoolProfile::new("agentpool1", 1, "Standard_D2_v2")];
        spec
    }

    fn vmss_spec() -> ClusterSpec {
        let mut s = spec();
        s.master_profile.availability_profile = "VirtualMachineScaleSets".into();
        s.agent_pool_profiles[0].availability_profile = "VirtualMachineScaleSets".into();
        s
    }

    fn run(spec: &ClusterSpec, is_update: bool) -> Result<()> {
        let catalog = StaticCatalog::new();
        let config = ValidatorConfig::builder().emit_warnings(false).build();
        check_master_profile(&RuleContext::new(spec, is_update, &catalog, &config))
    }

    #[test]
    fn test_valid_master() {
        assert!(run(&spec(), false).is_ok());
        assert!(run(&vmss_spec(), false).is_ok());
    }

    #[test]
    fn test_vmss_custom_vnet_static_ip() {
        let mut s = vmss_spec();
        s.master_profile.vnet_subnet_id = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/master".into();
        s.master_profile.first_consecutive_static_ip = "10.239.255.239".into();
        let err = run(&s, false).unwrap_err();
        assert!(err.to_string().starts_with("when masterProfile's availabilityProfile is VirtualMachineScaleSets"));
    }

    #[test]
    fn test_ipv6_requires_ubuntu_master() {
        let mut s = spec();
        s.master_profile.distro = "coreos".into();
        s.feature_flags = Some(FeatureFlags {
            enable_ipv6_dual_stack: true,
            ..Default::default()
        });
        let err = run(&s, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dual stack and single stack IPv6 feature is currently supported only with Ubuntu, but master is of distro type coreos"
        );
    }

    #[test]
    fn test_image_reference() {
        let mut s = spec();
        s.master_profile.image_ref = Some(ImageReference {
            name: "custom".into(),
            ..Default::default()
        });
        let err = run(&s, false).unwrap_err();
        assert_eq!(err.to_string(), "imageResourceGroup needs to be specified when imageName is provided");

        s.master_profile.distro = "ubuntu".into();
        let err = run(&s, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_vmss_master_requires_vmss_agents() {
        let mut s = vmss_spec();
        s.agent_pool_profiles[0].availability_profile = "AvailabilitySet".into();
        let err = run(&s, false).unwrap_err();
        assert!(err.to_string().starts_with("VirtualMachineScaleSets for master profile must be used together"));
    }

    #[test]
    fn test_vmss_master_with_system_assigned_identity() {
        let mut s = vmss_spec();
        if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
            k.use_managed_identity = true;
        }
        let err = run(&s, false).unwrap_err();
        assert!(err.to_string().contains("can be used only with user assigned MSI"));

        if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
            k.user_assigned_id = "clusterIdentity".into();
        }
        assert!(run(&s, false).is_ok());
    }

    #[test]
    fn test_vmss_storage_account() {
        let mut s = vmss_spec();
        s.master_profile.storage_profile = "StorageAccount".into();
        let err = run(&s, false).unwrap_err();
        assert!(err.to_string().starts_with("VirtualMachineScaleSets does not support StorageAccount disks."));
    }

    #[test]
    fn test_single_placement_group_requires_vmss() {
        let mut s = spec();
        s.master_profile.availability_profile = "AvailabilitySet".into();
        s.master_profile.single_placement_group = Toggle::Enabled;
        let err = run(&s, false).unwrap_err();
        assert_eq!(err.to_string(), "singlePlacementGroup is only supported with VirtualMachineScaleSets");
    }

    #[test]
    fn test_distro() {
        let mut s = spec();
        s.master_profile.distro = "aks-1804".into();
        let err = run(&s, false).unwrap_err();
        assert_eq!(err.to_string(), "The aks-1804 distro is deprecated, please use aks-ubuntu-18.04 instead");
        assert!(run(&s, true).is_ok());

        s.master_profile.distro = "aks".into();
        let err = run(&s, false).unwrap_err();
        assert_eq!(err.to_string(), "The aks distro is deprecated, please use aks-ubuntu-16.04 instead");

        s.master_profile.distro = "windows".into();
        let err = run(&s, true).unwrap_err();
        assert_eq!(err.to_string(), "The windows distro is not supported");
    }

    #[test]
    fn test_auditd_requires_ubuntu() {
        let mut s = spec();
        s.master_profile.audit_d_enabled = Toggle::Enabled;
        assert!(run(&s, false).is_ok());

        s.master_profile.distro = "coreos".into();
        let err = run(&s, false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You have enabled auditd for master vms, but you did not specify an Ubuntu-based distro."
        );
    }

    #[test]
    fn test_dns_prefix_checked_last() {
        let mut s = spec();
        s.master_profile.dns_prefix = "Invalid_Prefix".into();
        let err = run(&s, false).unwrap_err();
        assert!(err.to_string().starts_with("DNSPrefix 'Invalid_Prefix' is invalid"));
    }
}
