//! Master and agent pool node profiles

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{availability, distro, os, storage};
use crate::skus;
use crate::toggle::Toggle;

/// A derived subnet was assigned twice
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("subnet is already set to '{current}'")]
pub struct SubnetAlreadySet {
    pub current: String,
}

fn set_once(cell: &OnceCell<String>, subnet: impl Into<String>) -> Result<(), SubnetAlreadySet> {
    cell.set(subnet.into()).map_err(|_| SubnetAlreadySet {
        current: cell.get().cloned().unwrap_or_default(),
    })
}

/// Custom OS image location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageReference {
    pub name: String,
    pub resource_group: String,
    #[serde(rename = "subscriptionId")]
    pub subscription_id: String,
    pub gallery: String,
    pub version: String,
}

impl ImageReference {
    /// Whether exactly one of name and resource group is given
    pub fn is_partial(&self) -> bool {
        self.name.is_empty() != self.resource_group.is_empty()
    }
}

/// A VM extension reference on a node profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extension {
    pub name: String,
    pub single_or_all: String,
    pub template: String,
}

/// Control plane topology
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MasterProfile {
    pub count: i32,
    pub dns_prefix: String,
    pub subject_alt_names: Vec<String>,
    pub vm_size: String,
    #[serde(rename = "osDiskSizeGB")]
    pub os_disk_size_gb: i32,
    #[serde(rename = "vnetSubnetID")]
    pub vnet_subnet_id: String,
    pub vnet_cidr: String,
    #[serde(rename = "agentVnetSubnetID")]
    pub agent_vnet_subnet_id: String,
    #[serde(rename = "firstConsecutiveStaticIP")]
    pub first_consecutive_static_ip: String,
    pub ip_address_count: i32,
    pub storage_profile: String,
    pub distro: String,
    #[serde(rename = "imageReference", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageReference>,
    pub availability_profile: String,
    pub availability_zones: Vec<String>,
    pub single_placement_group: Toggle,
    pub audit_d_enabled: Toggle,
    #[serde(rename = "proximityPlacementGroupID")]
    pub proximity_placement_group_id: String,
    pub extensions: Vec<Extension>,

    #[serde(skip)]
    subnet: OnceCell<String>,
    #[serde(skip)]
    subnet_ipv6: OnceCell<String>,
}

impl MasterProfile {
    pub fn is_custom_vnet(&self) -> bool {
        !self.vnet_subnet_id.is_empty()
    }

    pub fn is_vmss(&self) -> bool {
        self.availability_profile == availability::VIRTUAL_MACHINE_SCALE_SETS
    }

    pub fn is_availability_set(&self) -> bool {
        self.availability_profile == availability::AVAILABILITY_SET
    }

    pub fn is_storage_account(&self) -> bool {
        self.storage_profile == storage::STORAGE_ACCOUNT
    }

    pub fn is_ubuntu(&self) -> bool {
        distro::is_ubuntu(&self.distro)
    }

    pub fn is_coreos(&self) -> bool {
        self.distro == distro::COREOS
    }

    pub fn has_availability_zones(&self) -> bool {
        !self.availability_zones.is_empty()
    }

    /// Subnet resolved by the provisioning layer, if assigned
    pub fn subnet(&self) -> Option<&str> {
        self.subnet.get().map(String::as_str)
    }

    pub fn subnet_ipv6(&self) -> Option<&str> {
        self.subnet_ipv6.get().map(String::as_str)
    }

    /// Assign the resolved subnet; it can only be assigned once
    pub fn set_subnet(&self, subnet: impl Into<String>) -> Result<(), SubnetAlreadySet> {
        set_once(&self.subnet, subnet)
    }

    pub fn set_subnet_ipv6(&self, subnet: impl Into<String>) -> Result<(), SubnetAlreadySet> {
        set_once(&self.subnet_ipv6, subnet)
    }
}

/// One worker node pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentPoolProfile {
    pub name: String,
    pub count: i32,
    pub vm_size: String,
    #[serde(rename = "osDiskSizeGB")]
    pub os_disk_size_gb: i32,
    pub dns_prefix: String,
    pub os_type: String,
    pub ports: Vec<i32>,
    pub availability_profile: String,
    pub scale_set_priority: String,
    pub scale_set_eviction_policy: String,
    pub spot_max_price: Option<f64>,
    pub storage_profile: String,
    #[serde(rename = "diskSizesGB")]
    pub disk_sizes_gb: Vec<i32>,
    #[serde(rename = "vnetSubnetID")]
    pub vnet_subnet_id: String,
    pub ip_address_count: i32,
    pub distro: String,
    pub role: String,
    #[serde(rename = "imageReference", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageReference>,
    pub accelerated_networking_enabled: Toggle,
    pub accelerated_networking_enabled_windows: Toggle,
    pub vmss_over_provisioning_enabled: Toggle,
    pub audit_d_enabled: Toggle,
    #[serde(rename = "enableVMSSNodePublicIP")]
    pub enable_vmss_node_public_ip: Toggle,
    pub single_placement_group: Toggle,
    #[serde(rename = "diskEncryptionSetID")]
    pub disk_encryption_set_id: String,
    #[serde(rename = "proximityPlacementGroupID")]
    pub proximity_placement_group_id: String,
    pub custom_node_labels: BTreeMap<String, String>,
    pub availability_zones: Vec<String>,
    #[serde(rename = "loadBalancerBackendAddressPoolIDs")]
    pub load_balancer_backend_address_pool_ids: Vec<String>,
    pub extensions: Vec<Extension>,

    #[serde(skip)]
    subnet: OnceCell<String>,
}

impl AgentPoolProfile {
    /// A Linux pool with the given name and size and no other settings
    pub fn new(name: impl Into<String>, count: i32, vm_size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count,
            vm_size: vm_size.into(),
            ..Default::default()
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os_type == os::WINDOWS
    }

    pub fn is_linux(&self) -> bool {
        self.os_type == os::LINUX
    }

    pub fn is_custom_vnet(&self) -> bool {
        !self.vnet_subnet_id.is_empty()
    }

    pub fn is_vmss(&self) -> bool {
        self.availability_profile == availability::VIRTUAL_MACHINE_SCALE_SETS
    }

    pub fn is_availability_set(&self) -> bool {
        self.availability_profile == availability::AVAILABILITY_SET
    }

    pub fn is_storage_account(&self) -> bool {
        self.storage_profile == storage::STORAGE_ACCOUNT
    }

    pub fn is_managed_disks(&self) -> bool {
        self.storage_profile == storage::MANAGED_DISKS
    }

    pub fn is_ephemeral(&self) -> bool {
        self.storage_profile == storage::EPHEMERAL
    }

    pub fn has_disks(&self) -> bool {
        !self.disk_sizes_gb.is_empty()
    }

    pub fn has_availability_zones(&self) -> bool {
        !self.availability_zones.is_empty()
    }

    /// Ubuntu-based distro on a non-Windows pool
    pub fn is_ubuntu(&self) -> bool {
        !self.is_windows() && distro::is_ubuntu(&self.distro)
    }

    pub fn is_coreos(&self) -> bool {
        self.distro == distro::COREOS
    }

    pub fn is_nseries_sku(&self) -> bool {
        skus::is_nvidia_enabled_sku(&self.vm_size)
    }

    pub fn subnet(&self) -> Option<&str> {
        self.subnet.get().map(String::as_str)
    }

    /// Assign the resolved subnet; it can only be assigned once
    pub fn set_subnet(&self, subnet: impl Into<String>) -> Result<(), SubnetAlreadySet> {
        set_once(&self.subnet, subnet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_is_write_once() {
        let master = MasterProfile::default();
        assert_eq!(master.subnet(), None);

        master.set_subnet("10.240.255.0/24").unwrap();
        assert_eq!(master.subnet(), Some("10.240.255.0/24"));

        let err = master.set_subnet("10.0.0.0/8").unwrap_err();
        assert_eq!(err.current, "10.240.255.0/24");
        assert_eq!(master.subnet(), Some("10.240.255.0/24"));
    }

    #[test]
    fn test_subnet_is_not_decoded() {
        let pool: AgentPoolProfile =
            serde_json::from_str(r#"{"name": "pool1", "subnet": "10.0.0.0/24"}"#).unwrap();
        assert_eq!(pool.subnet(), None);
        pool.set_subnet("10.1.0.0/24").unwrap();
        assert!(pool.set_subnet("10.2.0.0/24").is_err());
    }

    #[test]
    fn test_agent_pool_predicates() {
        let mut pool = AgentPoolProfile::new("linuxpool", 3, "Standard_NC6");
        pool.distro = "aks-ubuntu-18.04".to_string();
        pool.availability_profile = "VirtualMachineScaleSets".to_string();

        assert!(pool.is_ubuntu());
        assert!(pool.is_vmss());
        assert!(pool.is_nseries_sku());
        assert!(!pool.is_availability_set());

        pool.os_type = "Windows".to_string();
        assert!(!pool.is_ubuntu());
        assert!(pool.is_windows());
    }

    #[test]
    fn test_decode_master_document_names() {
        let master: MasterProfile = serde_json::from_str(
            r#"{
                "count": 3,
                "dnsPrefix": "mycluster",
                "vnetSubnetID": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/v/subnets/m",
                "firstConsecutiveStaticIP": "10.239.255.239",
                "osDiskSizeGB": 128,
                "imageReference": {"name": "img", "resourceGroup": "rg"}
            }"#,
        )
        .unwrap();

        assert_eq!(master.count, 3);
        assert!(master.is_custom_vnet());
        assert_eq!(master.first_consecutive_static_ip, "10.239.255.239");
        assert_eq!(master.os_disk_size_gb, 128);
        assert!(!master.image_ref.unwrap().is_partial());
    }

    #[test]
    fn test_image_reference_partial() {
        let image = ImageReference {
            name: "img".to_string(),
            ..Default::default()
        };
        assert!(image.is_partial());
        assert!(!ImageReference::default().is_partial());
    }
}
