//! KubernetesConfig checks
//!
//! Runs against the rationalized Kubernetes version. The checks cover:
//!
//! - IPv6 feature gating;
//! - subnet and service CIDR arithmetic;
//! - Go-style duration knobs;
//! - runtime versions;
//! - the network compatibility matrix.

use std::time::Duration;

use clusterspec_core::constants::{limits, network, proxy_mode, runtime};
use clusterspec_core::KubernetesConfig;
use semver::Version;

use crate::error::{Result, ValidationError};
use crate::network::validate_network;
use crate::primitives::{format_list, parse_cidr, parse_ip, CONTAINERD_VALID_VERSIONS, ETCD_VALID_VERSIONS};

/// Minimum node-monitor-grace-period / node-status-update-frequency ratio
const MIN_KUBELET_RETRIES: f64 = 4.0;

const NODE_STATUS_UPDATE_FREQUENCY: &str = "--node-status-update-frequency";
const NODE_MONITOR_GRACE_PERIOD: &str = "--node-monitor-grace-period";
const POD_EVICTION_TIMEOUT: &str = "--pod-eviction-timeout";
const ROUTE_RECONCILIATION_PERIOD: &str = "--route-reconciliation-period";

/// IPv6 feature flags that influence the checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ipv6Flags {
    pub dual_stack: bool,
    pub ipv6_only: bool,
}

fn parse_duration(key: &str, raw: &str) -> Result<Duration> {
    humantime::parse_duration(raw)
        .map_err(|_| ValidationError::structural(format!("{} '{}' is not a valid duration", key, raw)))
}

fn at_least(sv: &Version, min: &str) -> bool {
    Version::parse(min).map(|min| *sv >= min).unwrap_or(false)
}

/// Validate a KubernetesConfig for the resolved `k8s_version`
pub fn validate_kubernetes_config(
    config: &KubernetesConfig,
    k8s_version: &str,
    has_windows: bool,
    flags: Ipv6Flags,
) -> Result<()> {
    if flags.dual_stack && flags.ipv6_only {
        return Err(ValidationError::conflict(
            "featureFlags.EnableIPv6DualStack and featureFlags.EnableIPv6Only can't be enabled at the same time.",
        ));
    }

    let sv = Version::parse(k8s_version)
        .map_err(|_| ValidationError::version(format!("could not validate version {}", k8s_version)))?;

    validate_ipv6(config, &sv, k8s_version, flags)?;
    validate_cluster_subnet(config, flags.dual_stack)?;

    if !config.docker_bridge_subnet.is_empty() && parse_cidr(&config.docker_bridge_subnet).is_none() {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.DockerBridgeSubnet '{}' is an invalid subnet",
            config.docker_bridge_subnet
        )));
    }

    if config.max_pods != 0 && config.max_pods < limits::KUBERNETES_MIN_MAX_PODS {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.MaxPods '{}' must be at least {}",
            config.max_pods,
            limits::KUBERNETES_MIN_MAX_PODS
        )));
    }

    validate_durations(config)?;
    validate_service_cidr(config, flags.dual_stack)?;

    let mode = config.proxy_mode.as_str();
    if !mode.is_empty() && mode != proxy_mode::IPTABLES && mode != proxy_mode::IPVS {
        return Err(ValidationError::unsupported(format!(
            "Invalid KubeProxyMode {}. Allowed modes are {} and {}",
            mode,
            proxy_mode::IPTABLES,
            proxy_mode::IPVS
        )));
    }
    if flags.dual_stack && mode == proxy_mode::IPTABLES && !at_least(&sv, "1.18.0") {
        return Err(ValidationError::version(format!(
            "KubeProxyMode {} in dualstack not supported with {} version",
            mode, k8s_version
        )));
    }

    validate_etcd_version(&config.etcd_version)?;
    validate_containerd(config)?;

    if (config.use_cloud_controller_manager.is_enabled() || !config.custom_ccm_image.is_empty())
        && !at_least(&sv, "1.8.0")
    {
        return Err(ValidationError::version(format!(
            "OrchestratorProfile.KubernetesConfig.UseCloudControllerManager and OrchestratorProfile.KubernetesConfig.CustomCcmImage not available in kubernetes version {}",
            k8s_version
        )));
    }

    validate_network(config, k8s_version, has_windows)?;
    validate_container_runtime_config(config)
}

fn validate_ipv6(config: &KubernetesConfig, sv: &Version, k8s_version: &str, flags: Ipv6Flags) -> Result<()> {
    let plugin = config.network_plugin.as_str();
    if flags.dual_stack {
        if !at_least(sv, "1.16.0") {
            return Err(ValidationError::version(format!(
                "IPv6 dual stack not available in kubernetes version {}",
                k8s_version
            )));
        }
        if plugin != network::PLUGIN_KUBENET {
            return Err(ValidationError::unsupported(format!(
                "OrchestratorProfile.KubernetesConfig.NetworkPlugin '{}' is invalid. IPv6 dual stack supported only with kubenet.",
                plugin
            )));
        }
    }
    if flags.ipv6_only {
        if !at_least(sv, "1.18.0") {
            return Err(ValidationError::version(format!(
                "IPv6 single stack not available in kubernetes version {}",
                k8s_version
            )));
        }
        if plugin != network::PLUGIN_KUBENET {
            return Err(ValidationError::unsupported(format!(
                "OrchestratorProfile.KubernetesConfig.NetworkPlugin '{}' is invalid. IPv6 single stack supported only with kubenet.",
                plugin
            )));
        }
    }
    Ok(())
}

fn validate_cluster_subnet(config: &KubernetesConfig, dual_stack: bool) -> Result<()> {
    let raw = config.cluster_subnet.as_str();
    if raw.is_empty() {
        return Ok(());
    }

    let subnets: Vec<&str> = raw.split(',').collect();
    if !dual_stack && subnets.len() > 1 {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.ClusterSubnet '{}' is an invalid subnet",
            raw
        )));
    }
    if dual_stack && subnets.len() > 2 {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.ClusterSubnet '{}' is an invalid subnet. Not more than 2 subnets for ipv6 dual stack.",
            raw
        )));
    }

    for subnet in subnets {
        let cidr = parse_cidr(subnet).ok_or_else(|| {
            ValidationError::structural(format!(
                "OrchestratorProfile.KubernetesConfig.ClusterSubnet '{}' is an invalid subnet",
                subnet
            ))
        })?;
        if config.network_plugin == network::PLUGIN_AZURE && cidr.host_bits() <= 8 {
            return Err(ValidationError::structural(format!(
                "OrchestratorProfile.KubernetesConfig.ClusterSubnet '{}' must reserve at least 9 bits for nodes",
                subnet
            )));
        }
    }
    Ok(())
}

fn validate_durations(config: &KubernetesConfig) -> Result<()> {
    let frequency = config
        .kubelet_config
        .get(NODE_STATUS_UPDATE_FREQUENCY)
        .map(|raw| parse_duration(NODE_STATUS_UPDATE_FREQUENCY, raw))
        .transpose()?;
    let grace = config
        .controller_manager_config
        .get(NODE_MONITOR_GRACE_PERIOD)
        .map(|raw| parse_duration(NODE_MONITOR_GRACE_PERIOD, raw))
        .transpose()?;

    if let (Some(frequency), Some(grace)) = (frequency, grace) {
        // a zero frequency yields an infinite (or NaN) ratio, which passes
        let retries = grace.as_secs_f64() / frequency.as_secs_f64();
        if retries < MIN_KUBELET_RETRIES {
            return Err(ValidationError::conflict(format!(
                "aks-engine requires that --node-monitor-grace-period({:.6})s be larger than nodeStatusUpdateFrequency({:.6})s by at least a factor of {}; ",
                grace.as_secs_f64(),
                frequency.as_secs_f64(),
                MIN_KUBELET_RETRIES as i32
            )));
        }
    }

    for key in [POD_EVICTION_TIMEOUT, ROUTE_RECONCILIATION_PERIOD] {
        if let Some(raw) = config.controller_manager_config.get(key) {
            parse_duration(key, raw)?;
        }
    }
    Ok(())
}

fn validate_service_cidr(config: &KubernetesConfig, dual_stack: bool) -> Result<()> {
    let dns_ip = config.dns_service_ip.as_str();
    let service_cidr = config.service_cidr.as_str();
    if dns_ip.is_empty() && service_cidr.is_empty() {
        return Ok(());
    }
    if dns_ip.is_empty() {
        return Err(ValidationError::structural(
            "OrchestratorProfile.KubernetesConfig.DNSServiceIP must be specified when ServiceCidr is",
        ));
    }
    if service_cidr.is_empty() {
        return Err(ValidationError::structural(
            "OrchestratorProfile.KubernetesConfig.ServiceCidr must be specified when DNSServiceIP is",
        ));
    }

    let ip = parse_ip(dns_ip).ok_or_else(|| {
        ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.DNSServiceIP '{}' is an invalid IP address",
            dns_ip
        ))
    })?;

    let invalid_cidr = |cidr: &str| {
        ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.ServiceCidr '{}' is an invalid CIDR subnet",
            cidr
        ))
    };

    let mut primary = service_cidr;
    if dual_stack {
        let cidrs: Vec<&str> = service_cidr.split(',').collect();
        if cidrs.len() > 2 {
            return Err(ValidationError::structural(format!(
                "OrchestratorProfile.KubernetesConfig.ServiceCidr '{}' is an invalid CIDR subnet. More than 2 CIDRs not allowed for dualstack",
                service_cidr
            )));
        }
        if let [first, second] = cidrs.as_slice() {
            if parse_cidr(second).is_none() {
                return Err(invalid_cidr(second));
            }
            primary = first;
        }
    }

    let cidr = parse_cidr(primary).ok_or_else(|| invalid_cidr(primary))?;
    if !cidr.contains(ip) {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.DNSServiceIP '{}' is not within the ServiceCidr '{}'",
            dns_ip, primary
        )));
    }
    if cidr.broadcast() == Some(ip) {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.DNSServiceIP '{}' cannot be the broadcast address of ServiceCidr '{}'",
            dns_ip, primary
        )));
    }
    if cidr.first_ip() == ip {
        return Err(ValidationError::structural(format!(
            "OrchestratorProfile.KubernetesConfig.DNSServiceIP '{}' cannot be the first IP of ServiceCidr '{}'",
            dns_ip, primary
        )));
    }
    Ok(())
}

/// An empty version maps to the default and is accepted
pub fn validate_etcd_version(version: &str) -> Result<()> {
    if version.is_empty() || ETCD_VALID_VERSIONS.contains(&version) {
        return Ok(());
    }
    Err(ValidationError::unsupported(format!(
        "Invalid etcd version \"{}\", please use one of the following versions: {}",
        version,
        format_list(ETCD_VALID_VERSIONS)
    )))
}

fn validate_containerd(config: &KubernetesConfig) -> Result<()> {
    let version = config.containerd_version.as_str();
    let runtime_name = config.container_runtime.as_str();
    if runtime_name.is_empty() || runtime_name == runtime::DOCKER {
        if !version.is_empty() {
            return Err(ValidationError::conflict(format!(
                "containerdVersion is only valid in a non-docker context, use {} containerRuntime values instead if you wish to provide a containerdVersion",
                runtime_choices(runtime::NON_DOCKER)
            )));
        }
        return Ok(());
    }
    if version.is_empty() || CONTAINERD_VALID_VERSIONS.contains(&version) {
        return Ok(());
    }
    Err(ValidationError::unsupported(format!(
        "Invalid containerd version \"{}\", please use one of the following versions: {}",
        version,
        format_list(CONTAINERD_VALID_VERSIONS)
    )))
}

/// "a, b or c"
fn runtime_choices(values: &[&str]) -> String {
    match values.split_last() {
        None => String::new(),
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

fn validate_container_runtime_config(config: &KubernetesConfig) -> Result<()> {
    if let Some(dir) = config.container_runtime_config.get(runtime::DATA_DIR_KEY) {
        if dir.is_empty() {
            return Err(ValidationError::structural(format!(
                "OrchestratorProfile.KubernetesConfig.ContainerRuntimeConfig.DataDir '{}' is invalid: must not be empty",
                dir
            )));
        }
        if !dir.starts_with('/') {
            return Err(ValidationError::structural(format!(
                "OrchestratorProfile.KubernetesConfig.ContainerRuntimeConfig.DataDir '{}' is invalid: must be absolute path",
                dir
            )));
        }
    }
    Ok(())
}
