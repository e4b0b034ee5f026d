//! Custom VNET rule
//!
//! Either every profile brings its own subnet or none does. With custom
//! subnets all of them must live in one VNET, identified by subscription,
//! resource group and VNET name.

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::{parse_cidr, parse_ip, parse_subnet_id};

pub fn check_vnet(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    let master = &spec.master_profile;
    let custom = master.is_custom_vnet();

    if spec.agent_pool_profiles.iter().any(|pool| pool.is_custom_vnet() != custom) {
        return Err(ValidationError::conflict(
            "Multiple VNET Subnet configurations specified.  The master profile and each agent pool profile must all specify a custom VNET Subnet, or none at all",
        ));
    }
    if !custom {
        return Ok(());
    }

    if master.is_vmss() && master.agent_vnet_subnet_id.is_empty() {
        return Err(ValidationError::structural(
            "when master profile is using VirtualMachineScaleSets and is custom vnet, set \"vnetsubnetid\" and \"agentVnetSubnetID\" for master profile",
        ));
    }

    let master_subnet = parse_subnet_id(&master.vnet_subnet_id)?;
    for pool in &spec.agent_pool_profiles {
        let pool_subnet = parse_subnet_id(&pool.vnet_subnet_id)?;
        if pool_subnet.subscription != master_subnet.subscription
            || pool_subnet.resource_group != master_subnet.resource_group
            || pool_subnet.vnet != master_subnet.vnet
        {
            return Err(ValidationError::conflict(
                "Multiple VNETS specified.  The master profile and each agent pool must reference the same VNET (but it is ok to reference different subnets on that VNET)",
            ));
        }
    }

    if parse_ip(&master.first_consecutive_static_ip).is_none() && !master.is_vmss() {
        return Err(ValidationError::structural(format!(
            "MasterProfile.FirstConsecutiveStaticIP (with VNET Subnet specification) '{}' is an invalid IP address",
            master.first_consecutive_static_ip
        )));
    }

    if !master.vnet_cidr.is_empty() && parse_cidr(&master.vnet_cidr).is_none() {
        return Err(ValidationError::structural(format!(
            "MasterProfile.VnetCidr '{}' contains invalid cidr notation",
            master.vnet_cidr
        )));
    }
    Ok(())
}
