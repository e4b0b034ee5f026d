//! Agent pool rule
//!
//! Walks the pools in document order and stops at the first failing pool.
//! Within a pool the checks run from naming and operating system, through
//! orchestrator-specific properties and images, down to scale-set and
//! placement settings.

use std::collections::HashSet;

use clusterspec_core::constants::{availability, os, scale_set, storage};
use clusterspec_core::{skus, AgentPoolProfile, OrchestratorKind};
use tracing::warn;

use super::master::{validate_distro, validate_image_reference, validate_vmss};
use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::{
    validate_disk_encryption_set_id, validate_dns_prefix, validate_label_key, validate_label_value,
    validate_pool_name, validate_proximity_placement_group_id,
};

pub fn check_agent_pool_profiles(context: &RuleContext<'_>) -> Result<()> {
    let mut names = HashSet::new();
    for pool in &context.spec.agent_pool_profiles {
        check_pool(context, pool, &mut names)?;
    }
    Ok(())
}

fn check_pool<'a>(context: &RuleContext<'a>, pool: &'a AgentPoolProfile, names: &mut HashSet<&'a str>) -> Result<()> {
    let spec = context.spec;
    let kind = context.kind();

    validate_pool_name(&pool.name)?;

    if spec.is_ipv6_dual_stack() || spec.is_ipv6_only() {
        if pool.is_windows() {
            return Err(ValidationError::unsupported(format!(
                "Dual stack and single stack IPv6 feature is supported only with Linux, but agent pool '{}' is of os type {}",
                pool.name, pool.os_type
            )));
        }
        if pool.is_coreos() {
            return Err(ValidationError::unsupported(format!(
                "Dual stack and single stack IPv6 feature is currently supported only with Ubuntu, but agent pool '{}' is of distro type {}",
                pool.name, pool.distro
            )));
        }
    }

    if !names.insert(pool.name.as_str()) {
        return Err(ValidationError::conflict(format!(
            "profile name '{}' already exists, profile names must be unique across pools",
            pool.name
        )));
    }

    if !matches!(pool.os_type.as_str(), "" | os::LINUX | os::WINDOWS) {
        return Err(ValidationError::unsupported(
            "AgentPoolProfile.osType must be either Linux or Windows",
        ));
    }

    check_accelerated_networking(context, pool)?;

    if pool.vmss_over_provisioning_enabled.is_enabled() && !pool.is_vmss() {
        return Err(ValidationError::conflict(format!(
            "You have specified VMSS Overprovisioning in agent pool {}, but you did not specify VMSS",
            pool.name
        )));
    }
    if pool.audit_d_enabled.is_enabled() && !pool.distro.is_empty() && !pool.is_ubuntu() {
        return Err(ValidationError::conflict(format!(
            "You have enabled auditd in agent pool {}, but you did not specify an Ubuntu-based distro",
            pool.name
        )));
    }
    if pool.enable_vmss_node_public_ip.is_enabled() && !pool.is_vmss() {
        return Err(ValidationError::conflict(format!(
            "You have enabled VMSS node public IP in agent pool {}, but you did not specify VMSS",
            pool.name
        )));
    }

    check_orchestrator_specific(kind, pool)?;

    if let Some(image_ref) = &pool.image_ref {
        if !pool.distro.is_empty() {
            return Err(ValidationError::conflict(format!(
                "agentPoolProfile {} includes a custom image configuration (imageRef) and an explicit distro configuration, you may use one of these but not both simultaneously",
                pool.name
            )));
        }
        validate_image_reference(image_ref)?;
    }

    match pool.availability_profile.as_str() {
        "" | availability::AVAILABILITY_SET | availability::VIRTUAL_MACHINE_SCALE_SETS => {}
        other => {
            return Err(ValidationError::unsupported(format!(
                "unknown availability profile type '{}' for agent pool '{}'.  Specify either {}, or {}",
                other,
                pool.name,
                availability::AVAILABILITY_SET,
                availability::VIRTUAL_MACHINE_SCALE_SETS
            )))
        }
    }

    // only the default role is recognised
    if !pool.role.is_empty() {
        return Err(ValidationError::unsupported(format!(
            "Role {:?} is not supported for Orchestrator {}",
            pool.role, kind
        )));
    }

    check_custom_node_labels(kind, pool)?;

    if pool.is_vmss() {
        validate_vmss(context, context.is_update, &pool.storage_profile)?;
    }

    if kind.is_kubernetes() {
        let first = &spec.agent_pool_profiles[0];
        if first.availability_profile != pool.availability_profile {
            return Err(ValidationError::conflict(
                "mixed mode availability profiles are not allowed. Please set either VirtualMachineScaleSets or AvailabilitySet in availabilityProfile for all agent pools",
            ));
        }
        if pool.is_availability_set() && pool.single_placement_group.is_set() {
            return Err(ValidationError::conflict(
                "singlePlacementGroup is only supported with VirtualMachineScaleSets",
            ));
        }
        validate_distro(&pool.distro, context.is_update)?;
    }

    if pool.load_balancer_backend_address_pool_ids.iter().any(String::is_empty) {
        return Err(ValidationError::structural(format!(
            "AgentPoolProfile.LoadBalancerBackendAddressPoolIDs can not contain empty string. Agent pool name: {}",
            pool.name
        )));
    }

    if pool.is_ephemeral() && context.warnings_enabled() {
        warn!(
            pool = %pool.name,
            "Ephemeral disks are enabled for Agent Pool {}. This feature in AKS-Engine is experimental, and data could be lost in some cases.",
            pool.name
        );
    }

    if !pool.proximity_placement_group_id.is_empty() {
        validate_proximity_placement_group_id(&pool.proximity_placement_group_id)?;
    }
    Ok(())
}

fn check_accelerated_networking(context: &RuleContext<'_>, pool: &AgentPoolProfile) -> Result<()> {
    let linux = pool.accelerated_networking_enabled.is_enabled();
    let windows = pool.accelerated_networking_enabled_windows.is_enabled();
    if !linux && !windows {
        return Ok(());
    }

    if context.spec.is_azure_stack_cloud() {
        return Err(ValidationError::unsupported(
            "AcceleratedNetworkingEnabled or AcceleratedNetworkingEnabledWindows shouldn't be set to true as feature is not yet supported on Azure Stack",
        ));
    }
    if windows {
        return Err(ValidationError::unsupported(
            "Accelerated Networking is currently unstable for Windows + Kubernetes, please set acceleratedNetworkingEnabledWindows to false",
        ));
    }
    if !skus::accelerated_networking_supported(&pool.vm_size) {
        return Err(ValidationError::unsupported(format!(
            "AgentPoolProfile.vmsize {} does not support AgentPoolProfile.acceleratedNetworking",
            pool.vm_size
        )));
    }
    Ok(())
}

fn check_orchestrator_specific(kind: OrchestratorKind, pool: &AgentPoolProfile) -> Result<()> {
    if kind.is_kubernetes() {
        if !pool.dns_prefix.is_empty() {
            return Err(ValidationError::conflict("AgentPoolProfile.DNSPrefix must be empty for Kubernetes"));
        }
        if !pool.ports.is_empty() {
            return Err(ValidationError::conflict("AgentPoolProfile.Ports must be empty for Kubernetes"));
        }
        if pool.scale_set_priority == scale_set::PRIORITY_REGULAR
            && !pool.scale_set_eviction_policy.is_empty()
        {
            return Err(ValidationError::conflict(
                "property 'AgentPoolProfile.ScaleSetEvictionPolicy' must be empty for AgentPoolProfile.Priority of Regular",
            ));
        }
    }

    if !pool.dns_prefix.is_empty() {
        validate_dns_prefix(&pool.dns_prefix)?;
        let mut seen = HashSet::new();
        if let Some(port) = pool.ports.iter().find(|port| !seen.insert(**port)) {
            return Err(ValidationError::conflict(format!(
                "agent profile '{}' has duplicate port '{}', ports must be unique",
                pool.name, port
            )));
        }
    } else if !pool.ports.is_empty() {
        return Err(ValidationError::conflict(format!(
            "AgentPoolProfile.Ports must be empty when AgentPoolProfile.DNSPrefix is empty for Orchestrator: {}",
            kind
        )));
    }

    if pool.has_disks() {
        if !matches!(pool.storage_profile.as_str(), storage::STORAGE_ACCOUNT | storage::MANAGED_DISKS) {
            return Err(ValidationError::structural(
                "property 'StorageProfile' must be set to either 'StorageAccount' or 'ManagedDisks' when attaching disks",
            ));
        }
        if !pool.is_vmss() && !pool.is_availability_set() {
            return Err(ValidationError::structural(
                "property 'AvailabilityProfile' must be set to either 'VirtualMachineScaleSets' or 'AvailabilitySet' when attaching disks",
            ));
        }
        if pool.is_storage_account() && pool.is_vmss() {
            return Err(ValidationError::conflict(
                "VirtualMachineScaleSets does not support storage account attached disks.  Instead specify 'StorageAccount': 'ManagedDisks' or specify AvailabilityProfile 'AvailabilitySet'",
            ));
        }
    }

    if !pool.disk_encryption_set_id.is_empty() {
        validate_disk_encryption_set_id(&pool.disk_encryption_set_id)?;
    }
    Ok(())
}

fn check_custom_node_labels(kind: OrchestratorKind, pool: &AgentPoolProfile) -> Result<()> {
    if pool.custom_node_labels.is_empty() {
        return Ok(());
    }
    match kind {
        OrchestratorKind::Kubernetes => {
            for (key, value) in &pool.custom_node_labels {
                validate_label_key(key)?;
                validate_label_value(value)?;
            }
            Ok(())
        }
        OrchestratorKind::Dcos => Ok(()),
        _ => Err(ValidationError::unsupported(
            "Agent CustomNodeLabels are only supported for DCOS and Kubernetes",
        )),
    }
}
