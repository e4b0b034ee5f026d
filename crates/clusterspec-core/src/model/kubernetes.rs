//! Kubernetes-specific configuration and addons

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{load_balancer, network};
use crate::toggle::Toggle;

/// Kubernetes-only cluster settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesConfig {
    pub kubernetes_image_base: String,
    pub cluster_subnet: String,
    pub network_policy: String,
    pub network_plugin: String,
    pub network_mode: String,
    pub container_runtime: String,
    pub max_pods: i32,
    pub docker_bridge_subnet: String,
    #[serde(rename = "dnsServiceIP")]
    pub dns_service_ip: String,
    pub service_cidr: String,

    pub use_managed_identity: bool,
    #[serde(rename = "userAssignedID")]
    pub user_assigned_id: String,
    #[serde(rename = "userAssignedClientID")]
    pub user_assigned_client_id: String,

    pub custom_hyperkube_image: String,
    #[serde(rename = "customKubeAPIServerImage")]
    pub custom_kube_api_server_image: String,
    pub custom_kube_controller_manager_image: String,
    pub custom_kube_proxy_image: String,
    pub custom_kube_scheduler_image: String,
    #[serde(rename = "customKubeBinaryURL")]
    pub custom_kube_binary_url: String,
    pub private_azure_registry_server: String,

    pub docker_engine_version: String,
    pub moby_version: String,
    pub containerd_version: String,
    pub custom_ccm_image: String,
    pub use_cloud_controller_manager: Toggle,
    pub use_instance_metadata: Toggle,

    pub enable_rbac: Toggle,
    #[serde(rename = "enableAggregatedAPIs")]
    pub enable_aggregated_apis: bool,
    pub enable_data_encryption_at_rest: Toggle,
    pub enable_encryption_with_external_kms: Toggle,
    pub enable_pod_security_policy: Toggle,

    pub etcd_version: String,
    #[serde(rename = "etcdDiskSizeGB")]
    pub etcd_disk_size_gb: String,
    pub etcd_encryption_key: String,

    pub addons: Vec<KubernetesAddon>,

    pub container_runtime_config: BTreeMap<String, String>,
    pub kubelet_config: BTreeMap<String, String>,
    pub controller_manager_config: BTreeMap<String, String>,
    pub cloud_controller_manager_config: BTreeMap<String, String>,
    pub api_server_config: BTreeMap<String, String>,
    pub scheduler_config: BTreeMap<String, String>,

    pub cloud_provider_backoff: Toggle,
    pub cloud_provider_backoff_retries: i32,
    pub cloud_provider_backoff_jitter: f64,
    pub cloud_provider_backoff_duration: i32,
    pub cloud_provider_backoff_exponent: f64,
    pub cloud_provider_rate_limit: Toggle,
    #[serde(rename = "cloudProviderRateLimitQPS")]
    pub cloud_provider_rate_limit_qps: f64,
    pub cloud_provider_rate_limit_bucket: i32,

    pub load_balancer_sku: String,
    #[serde(rename = "excludeMasterFromStandardLB")]
    pub exclude_master_from_standard_lb: Toggle,
    #[serde(rename = "loadBalancerOutboundIPs")]
    pub load_balancer_outbound_ips: Option<i32>,
    pub maximum_load_balancer_rule_count: i32,
    pub outbound_rule_idle_timeout_in_minutes: i32,

    #[serde(rename = "kubeProxyMode")]
    pub proxy_mode: String,
}

impl KubernetesConfig {
    pub fn is_rbac_enabled(&self) -> bool {
        self.enable_rbac.is_enabled()
    }

    /// Whether any per-component image or the binary URL overrides hyperkube
    pub fn is_using_custom_kube_components(&self) -> bool {
        !self.custom_kube_api_server_image.is_empty()
            || !self.custom_kube_controller_manager_image.is_empty()
            || !self.custom_kube_proxy_image.is_empty()
            || !self.custom_kube_scheduler_image.is_empty()
            || !self.custom_kube_binary_url.is_empty()
    }

    pub fn is_standard_load_balancer(&self) -> bool {
        self.load_balancer_sku.eq_ignore_ascii_case(load_balancer::STANDARD)
    }

    pub fn is_azure_cni(&self) -> bool {
        self.network_plugin == network::PLUGIN_AZURE
    }

    /// Look up an addon by name
    pub fn addon(&self, name: &str) -> Option<&KubernetesAddon> {
        self.addons.iter().find(|addon| addon.name == name)
    }

    /// Whether the named addon is present and explicitly enabled
    pub fn is_addon_enabled(&self, name: &str) -> bool {
        self.addon(name).map(KubernetesAddon::is_enabled).unwrap_or(false)
    }

    /// Whether the named addon is present and explicitly disabled
    pub fn is_addon_disabled(&self, name: &str) -> bool {
        self.addon(name)
            .map(|addon| addon.enabled == Toggle::Disabled)
            .unwrap_or(false)
    }
}

/// An optional cluster component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesAddon {
    pub name: String,
    pub enabled: Toggle,
    pub mode: String,
    pub containers: Vec<KubernetesContainerSpec>,
    pub config: BTreeMap<String, String>,
    pub pools: Vec<AddonNodePoolsConfig>,
    /// Base64-encoded manifest that replaces `config` and `containers`
    pub data: String,
}

impl KubernetesAddon {
    /// An addon with the given name and enablement
    pub fn new(name: impl Into<String>, enabled: Toggle) -> Self {
        Self {
            name: name.into(),
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }
}

/// Resource settings for one addon container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(rename = "cpuRequests")]
    pub cpu_requests: String,
    pub memory_requests: String,
    #[serde(rename = "cpuLimits")]
    pub cpu_limits: String,
    pub memory_limits: String,
}

/// Per-pool addon settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddonNodePoolsConfig {
    pub name: String,
    pub config: BTreeMap<String, String>,
}
