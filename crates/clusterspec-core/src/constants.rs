//! Literal values recognised in cluster specifications

/// Operating system types for agent pools
pub mod os {
    pub const LINUX: &str = "Linux";
    pub const WINDOWS: &str = "Windows";
}

/// Node pool availability profiles
pub mod availability {
    pub const AVAILABILITY_SET: &str = "AvailabilitySet";
    pub const VIRTUAL_MACHINE_SCALE_SETS: &str = "VirtualMachineScaleSets";
}

/// Disk storage profiles
pub mod storage {
    pub const STORAGE_ACCOUNT: &str = "StorageAccount";
    pub const MANAGED_DISKS: &str = "ManagedDisks";
    pub const EPHEMERAL: &str = "Ephemeral";
}

/// Node image distributions
pub mod distro {
    pub const UBUNTU: &str = "ubuntu";
    pub const UBUNTU_1804: &str = "ubuntu-18.04";
    pub const UBUNTU_1804_GEN2: &str = "ubuntu-18.04-gen2";
    pub const RHEL: &str = "rhel";
    pub const COREOS: &str = "coreos";
    pub const AKS_UBUNTU_1604: &str = "aks-ubuntu-16.04";
    pub const AKS_UBUNTU_1804: &str = "aks-ubuntu-18.04";
    pub const ACC_1604: &str = "acc-16.04";
    /// Deprecated alias of `aks-ubuntu-16.04`
    pub const AKS_1604_DEPRECATED: &str = "aks";
    /// Deprecated alias of `aks-ubuntu-18.04`
    pub const AKS_1804_DEPRECATED: &str = "aks-1804";
    /// Deprecated docker-engine image
    pub const AKS_DOCKER_ENGINE: &str = "aks-docker-engine";

    /// Distros accepted when creating a cluster
    pub const VALUES: &[&str] = &[
        "",
        UBUNTU,
        UBUNTU_1804,
        RHEL,
        COREOS,
        AKS_UBUNTU_1604,
        AKS_UBUNTU_1804,
        ACC_1604,
    ];

    /// Distros additionally tolerated when updating an existing cluster
    pub const DEPRECATED_VALUES: &[&str] = &[AKS_DOCKER_ENGINE, AKS_1604_DEPRECATED, AKS_1804_DEPRECATED];

    /// Whether the distro is one of the Ubuntu 16.04 or 18.04 images
    pub fn is_ubuntu(distro: &str) -> bool {
        matches!(
            distro,
            AKS_UBUNTU_1604 | UBUNTU | ACC_1604 | AKS_UBUNTU_1804 | UBUNTU_1804 | UBUNTU_1804_GEN2
        )
    }
}

/// Kubernetes network plugins, policies and modes
pub mod network {
    pub const PLUGIN_KUBENET: &str = "kubenet";
    pub const PLUGIN_AZURE: &str = "azure";
    pub const PLUGIN_CILIUM: &str = "cilium";
    pub const PLUGIN_FLANNEL: &str = "flannel";
    pub const PLUGIN_ANTREA: &str = "antrea";

    pub const POLICY_CALICO: &str = "calico";
    pub const POLICY_CILIUM: &str = "cilium";
    pub const POLICY_AZURE: &str = "azure";
    pub const POLICY_NONE: &str = "none";
    pub const POLICY_ANTREA: &str = "antrea";

    pub const MODE_TRANSPARENT: &str = "transparent";
    pub const MODE_BRIDGE: &str = "bridge";

    pub const PLUGIN_VALUES: &[&str] = &["", PLUGIN_KUBENET, PLUGIN_AZURE, PLUGIN_CILIUM, PLUGIN_FLANNEL, PLUGIN_ANTREA];
    pub const POLICY_VALUES: &[&str] = &["", POLICY_CALICO, POLICY_CILIUM, POLICY_AZURE, POLICY_NONE, POLICY_ANTREA];
    pub const MODE_VALUES: &[&str] = &["", MODE_TRANSPARENT, MODE_BRIDGE];
}

/// Container runtimes
pub mod runtime {
    pub const DOCKER: &str = "docker";
    pub const CLEAR_CONTAINERS: &str = "clear-containers";
    pub const KATA_CONTAINERS: &str = "kata-containers";
    pub const CONTAINERD: &str = "containerd";

    pub const VALUES: &[&str] = &["", DOCKER, CLEAR_CONTAINERS, KATA_CONTAINERS, CONTAINERD];

    /// Runtimes that are not docker and therefore accept a containerd version
    pub const NON_DOCKER: &[&str] = &[CLEAR_CONTAINERS, KATA_CONTAINERS, CONTAINERD];

    /// Key of the data directory in `containerRuntimeConfig`
    pub const DATA_DIR_KEY: &str = "dataDir";
}

/// Load balancer SKUs
pub mod load_balancer {
    pub const STANDARD: &str = "Standard";
    pub const BASIC: &str = "Basic";
}

/// kube-proxy modes
pub mod proxy_mode {
    pub const IPTABLES: &str = "iptables";
    pub const IPVS: &str = "ipvs";
}

/// Addon names with dedicated preconditions
pub mod addons {
    pub const CLUSTER_AUTOSCALER: &str = "cluster-autoscaler";
    pub const NVIDIA_DEVICE_PLUGIN: &str = "nvidia-device-plugin";
    pub const AAD: &str = "aad";
    pub const BLOBFUSE_FLEXVOLUME: &str = "blobfuse-flexvolume";
    pub const SMB_FLEXVOLUME: &str = "smb-flexvolume";
    pub const KEYVAULT_FLEXVOLUME: &str = "keyvault-flexvolume";
    pub const APPGW_INGRESS: &str = "appgw-ingress";
    pub const AZURE_DISK_CSI_DRIVER: &str = "azuredisk-csi-driver";
    pub const AZURE_FILE_CSI_DRIVER: &str = "azurefile-csi-driver";
    pub const CLOUD_NODE_MANAGER: &str = "cloud-node-manager";
    pub const CILIUM: &str = "cilium";
    pub const ANTREA: &str = "antrea";
    pub const FLANNEL: &str = "flannel";
    pub const AZURE_POLICY: &str = "azure-policy";
    pub const KUBE_DNS: &str = "kube-dns";
    pub const COREDNS: &str = "coredns";
    pub const AZURE_CLOUD_PROVIDER: &str = "azure-cloud-provider";

    pub const MODE_ENSURE_EXISTS: &str = "EnsureExists";
    pub const MODE_RECONCILE: &str = "Reconcile";
}

/// Custom cloud profile values
pub mod cloud {
    pub const AZURE_STACK_CLOUD: &str = "AzureStackCloud";

    pub const CLIENT_SECRET_AUTH: &str = "client_secret";
    pub const CLIENT_CERTIFICATE_AUTH: &str = "client_certificate";

    pub const AZURE_AD_IDENTITY: &str = "azure_ad";
    pub const ADFS_IDENTITY: &str = "adfs";

    pub const DEPENDENCIES_LOCATION_VALUES: &[&str] = &["", "public", "china", "german", "usgovernment"];

    /// Largest managed disk Azure Stack supports, in GiB
    pub const MAX_AZURE_STACK_MANAGED_DISK_SIZE_GB: i64 = 1023;
}

/// Scale set priorities and eviction policies
pub mod scale_set {
    pub const PRIORITY_REGULAR: &str = "Regular";
    pub const PRIORITY_LOW: &str = "Low";
    pub const PRIORITY_SPOT: &str = "Spot";

    pub const EVICTION_DELETE: &str = "Delete";
    pub const EVICTION_DEALLOCATE: &str = "Deallocate";
}

/// Numeric limits for profile fields
pub mod limits {
    pub const MIN_AGENT_COUNT: i32 = 1;
    pub const MAX_AGENT_COUNT: i32 = 100;
    pub const MIN_PORT: i32 = 1;
    pub const MAX_PORT: i32 = 65535;
    pub const MAX_DISKS: usize = 4;
    pub const MIN_DISK_SIZE_GB: i32 = 1;
    pub const MAX_OS_DISK_SIZE_GB: i32 = 2048;
    pub const MAX_DATA_DISK_SIZE_GB: i32 = 32767;
    pub const MIN_IP_ADDRESS_COUNT: i32 = 0;
    pub const MAX_IP_ADDRESS_COUNT: i32 = 256;
    pub const MASTER_COUNTS: &[i32] = &[1, 3, 5];
    pub const KUBERNETES_MIN_MAX_PODS: i32 = 5;
}
