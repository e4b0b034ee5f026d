//! Entity-local field checks
//!
//! Required values, ranges and enumerations that can be decided by looking
//! at one profile at a time. Runs master, agent pools in order, then the
//! Linux profile.

use clusterspec_core::constants::{limits, scale_set, storage};
use clusterspec_core::{AgentPoolProfile, ClusterSpec, LinuxProfile, MasterProfile};

use crate::error::{Result, ValidationError};

/// Validate every entity of `spec` in isolation
pub fn validate_fields(spec: &ClusterSpec) -> Result<()> {
    validate_master(&spec.master_profile)?;

    if spec.agent_pool_profiles.is_empty() {
        return Err(ValidationError::structural("missing Properties.AgentPoolProfiles"));
    }
    for (i, pool) in spec.agent_pool_profiles.iter().enumerate() {
        validate_agent_pool(i, pool)?;
    }

    if let Some(linux) = &spec.linux_profile {
        validate_linux(linux)?;
    }
    Ok(())
}

fn os_disk_size_in_range(size: i32) -> bool {
    size == 0 || (limits::MIN_DISK_SIZE_GB..=limits::MAX_OS_DISK_SIZE_GB).contains(&size)
}

fn os_disk_size_error(size: i32) -> ValidationError {
    ValidationError::structural(format!(
        "Invalid os disk size of {} specified.  The range of valid values are [{}, {}]",
        size,
        limits::MIN_DISK_SIZE_GB,
        limits::MAX_OS_DISK_SIZE_GB
    ))
}

fn ip_address_count_in_range(count: i32) -> bool {
    (limits::MIN_IP_ADDRESS_COUNT..=limits::MAX_IP_ADDRESS_COUNT).contains(&count)
}

fn validate_master(master: &MasterProfile) -> Result<()> {
    if !limits::MASTER_COUNTS.contains(&master.count) {
        return Err(ValidationError::structural("MasterProfile count needs to be 1, 3, or 5"));
    }
    if master.dns_prefix.is_empty() {
        return Err(ValidationError::structural("missing Properties.MasterProfile.DNSPrefix"));
    }
    if master.vm_size.is_empty() {
        return Err(ValidationError::structural("missing Properties.MasterProfile.VMSize"));
    }
    if !os_disk_size_in_range(master.os_disk_size_gb) {
        return Err(os_disk_size_error(master.os_disk_size_gb));
    }
    if !ip_address_count_in_range(master.ip_address_count) {
        return Err(ValidationError::structural(format!(
            "MasterProfile.IPAddressCount needs to be in the range [{},{}]",
            limits::MIN_IP_ADDRESS_COUNT,
            limits::MAX_IP_ADDRESS_COUNT
        )));
    }
    match master.storage_profile.as_str() {
        "" | storage::STORAGE_ACCOUNT | storage::MANAGED_DISKS => Ok(()),
        other => Err(ValidationError::unsupported(format!(
            "Unknown storageProfile '{}'. Specify either {} or {}",
            other,
            storage::STORAGE_ACCOUNT,
            storage::MANAGED_DISKS
        ))),
    }
}

fn validate_agent_pool(index: usize, pool: &AgentPoolProfile) -> Result<()> {
    if pool.name.is_empty() {
        return Err(ValidationError::structural(format!(
            "missing Properties.AgentPoolProfiles[{}].Name",
            index
        )));
    }
    if !(limits::MIN_AGENT_COUNT..=limits::MAX_AGENT_COUNT).contains(&pool.count) {
        return Err(ValidationError::structural(format!(
            "AgentPoolProfile count needs to be in the range [{},{}]",
            limits::MIN_AGENT_COUNT,
            limits::MAX_AGENT_COUNT
        )));
    }
    if pool.vm_size.is_empty() {
        return Err(ValidationError::structural(format!(
            "missing Properties.AgentPoolProfiles[{}].VMSize",
            index
        )));
    }
    if !os_disk_size_in_range(pool.os_disk_size_gb) {
        return Err(os_disk_size_error(pool.os_disk_size_gb));
    }
    if pool
        .ports
        .iter()
        .any(|port| !(limits::MIN_PORT..=limits::MAX_PORT).contains(port))
    {
        return Err(ValidationError::structural(format!(
            "AgentPoolProfile Ports must be in the range[{}, {}]",
            limits::MIN_PORT,
            limits::MAX_PORT
        )));
    }

    match pool.scale_set_priority.as_str() {
        "" | scale_set::PRIORITY_REGULAR | scale_set::PRIORITY_LOW | scale_set::PRIORITY_SPOT => {}
        other => {
            return Err(ValidationError::unsupported(format!(
                "Unknown scaleSetPriority '{}'. Specify {}, {}, or {}",
                other,
                scale_set::PRIORITY_REGULAR,
                scale_set::PRIORITY_LOW,
                scale_set::PRIORITY_SPOT
            )))
        }
    }
    match pool.scale_set_eviction_policy.as_str() {
        "" | scale_set::EVICTION_DELETE | scale_set::EVICTION_DEALLOCATE => {}
        other => {
            return Err(ValidationError::unsupported(format!(
                "Unknown scaleSetEvictionPolicy '{}'. Specify either {} or {}",
                other,
                scale_set::EVICTION_DELETE,
                scale_set::EVICTION_DEALLOCATE
            )))
        }
    }
    match pool.storage_profile.as_str() {
        "" | storage::STORAGE_ACCOUNT | storage::MANAGED_DISKS | storage::EPHEMERAL => {}
        other => {
            return Err(ValidationError::unsupported(format!(
                "Unknown storageProfile '{}'. Specify {}, {}, or {}",
                other,
                storage::STORAGE_ACCOUNT,
                storage::MANAGED_DISKS,
                storage::EPHEMERAL
            )))
        }
    }

    let disk_out_of_range = pool
        .disk_sizes_gb
        .iter()
        .any(|size| !(limits::MIN_DISK_SIZE_GB..=limits::MAX_DATA_DISK_SIZE_GB).contains(size));
    if pool.disk_sizes_gb.len() > limits::MAX_DISKS || disk_out_of_range {
        return Err(ValidationError::structural(format!(
            "A maximum of {} disks may be specified, The range of valid disk size values are [{}, {}]",
            limits::MAX_DISKS,
            limits::MIN_DISK_SIZE_GB,
            limits::MAX_DATA_DISK_SIZE_GB
        )));
    }

    if !ip_address_count_in_range(pool.ip_address_count) {
        return Err(ValidationError::structural(format!(
            "AgentPoolProfile.IPAddressCount needs to be in the range [{},{}]",
            limits::MIN_IP_ADDRESS_COUNT,
            limits::MAX_IP_ADDRESS_COUNT
        )));
    }
    Ok(())
}

fn validate_linux(linux: &LinuxProfile) -> Result<()> {
    if linux.admin_username.is_empty() {
        return Err(ValidationError::structural("missing Properties.LinuxProfile.AdminUsername"));
    }
    if linux.ssh.public_keys.is_empty() {
        return Err(ValidationError::structural("missing Properties.LinuxProfile.SSH.PublicKeys"));
    }
    Ok(())
}
