//! Addon rule
//!
//! Each addon entry is checked in document order: raw manifest data, then
//! reconcile mode, then the preconditions of the named addon. An entry that
//! is not explicitly enabled only fails when the addon is mandatory.

use base64::Engine as _;
use clusterspec_core::constants::{addons, availability, network};
use clusterspec_core::{AddonNodePoolsConfig, KubernetesAddon, KubernetesConfig};

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::version::is_version_ge;

pub fn check_addons(context: &RuleContext<'_>) -> Result<()> {
    let Some(config) = context.kubernetes_config() else {
        return Ok(());
    };
    if config.addons.is_empty() {
        return Ok(());
    }

    let mut kube_dns_enabled = false;
    let mut coredns_enabled = false;
    for addon in &config.addons {
        check_addon_data(addon)?;

        if !addon.mode.is_empty() && addon.mode != addons::MODE_ENSURE_EXISTS && addon.mode != addons::MODE_RECONCILE {
            return Err(ValidationError::unsupported(format!(
                "addon {} has a mode configuration '{}', must be either {} or {}",
                addon.name,
                addon.mode,
                addons::MODE_ENSURE_EXISTS,
                addons::MODE_RECONCILE
            )));
        }

        if addon.is_enabled() {
            match addon.name.as_str() {
                addons::KUBE_DNS => kube_dns_enabled = true,
                addons::COREDNS => coredns_enabled = true,
                _ => check_enabled_addon(context, config, addon)?,
            }
        } else {
            check_disabled_addon(context, config, addon)?;
        }
    }

    if kube_dns_enabled && coredns_enabled {
        return Err(ValidationError::conflict(
            "Both kube-dns and coredns addons are enabled, only one of these may be enabled on a cluster",
        ));
    }
    Ok(())
}

fn check_addon_data(addon: &KubernetesAddon) -> Result<()> {
    if addon.data.is_empty() {
        return Ok(());
    }
    if !addon.config.is_empty() || !addon.containers.is_empty() {
        return Err(ValidationError::conflict(
            "Config and containers should be empty when addon.Data is specified",
        ));
    }
    if base64::engine::general_purpose::STANDARD.decode(&addon.data).is_err() {
        return Err(ValidationError::structural(format!(
            "Addon {}'s data should be base64 encoded",
            addon.name
        )));
    }
    Ok(())
}

fn check_enabled_addon(context: &RuleContext<'_>, config: &KubernetesConfig, addon: &KubernetesAddon) -> Result<()> {
    let spec = context.spec;
    let version = context.raw_version();
    let ccm = config.use_cloud_controller_manager.is_enabled();

    match addon.name.as_str() {
        addons::CLUSTER_AUTOSCALER => {
            if spec.agent_pool_profiles.iter().any(|pool| pool.is_availability_set()) {
                return Err(ValidationError::conflict(format!(
                    "cluster-autoscaler addon can only be used with VirtualMachineScaleSets. Please specify \"availabilityProfile\": \"{}\"",
                    availability::VIRTUAL_MACHINE_SCALE_SETS
                )));
            }
            for pool in &addon.pools {
                check_autoscaler_pool(context, pool)?;
            }
        }
        addons::NVIDIA_DEVICE_PLUGIN => {
            let valid_version = context.rationalizer().is_valid_min_version(
                context.kind(),
                context.raw_release(),
                version,
                "1.10.0",
            )?;
            let nseries = spec.agent_pool_profiles.iter().any(|pool| pool.is_nseries_sku());
            if nseries && !valid_version {
                return Err(ValidationError::version(
                    "NVIDIA Device Plugin add-on can only be used Kubernetes 1.10 or above. Please specify \"orchestratorRelease\": \"1.10\"",
                ));
            }
            if spec.has_coreos() {
                return Err(ValidationError::unsupported(
                    "NVIDIA Device Plugin add-on not currently supported on coreos. Please use node pools with Ubuntu only",
                ));
            }
        }
        addons::AAD => {
            if !spec.has_aad_admin_group_id() {
                return Err(ValidationError::conflict(
                    "aad addon can't be enabled without a valid aadProfile w/ adminGroupID",
                ));
            }
        }
        addons::BLOBFUSE_FLEXVOLUME | addons::SMB_FLEXVOLUME | addons::KEYVAULT_FLEXVOLUME => {
            if spec.has_coreos() {
                return Err(ValidationError::unsupported(
                    "flexvolume add-ons not currently supported on coreos distro. Please use Ubuntu",
                ));
            }
        }
        addons::APPGW_INGRESS => {
            let has_object_id = spec
                .service_principal_profile
                .as_ref()
                .map(|sp| !sp.object_id.is_empty())
                .unwrap_or(false);
            if !has_object_id && !config.use_managed_identity {
                return Err(ValidationError::conflict(
                    "appgw-ingress add-ons requires 'objectID' to be specified or UseManagedIdentity to be true",
                ));
            }
            if config.network_plugin != network::PLUGIN_AZURE {
                return Err(ValidationError::conflict(
                    "appgw-ingress add-ons can only be used with Network Plugin as 'azure'",
                ));
            }
            if addon.config.get("appgw-subnet").map(String::is_empty).unwrap_or(true) {
                return Err(ValidationError::structural(
                    "appgw-ingress add-ons requires 'appgw-subnet' in the Config. It is used to provision the subnet for Application Gateway in the vnet",
                ));
            }
        }
        addons::AZURE_DISK_CSI_DRIVER | addons::AZURE_FILE_CSI_DRIVER => {
            if !ccm {
                return Err(requires_ccm(&addon.name));
            }
        }
        addons::CLOUD_NODE_MANAGER => {
            if !is_version_ge(version, "1.16.0") {
                return Err(ValidationError::version(format!(
                    "{} add-on can only be used Kubernetes 1.16 or above",
                    addon.name
                )));
            }
            if !ccm {
                return Err(requires_ccm(&addon.name));
            }
        }
        addons::CILIUM => {
            if is_version_ge(version, "1.16.0") {
                return Err(ValidationError::version(format!(
                    "{} addon is not supported on Kubernetes v1.16.0 or greater",
                    addons::CILIUM
                )));
            }
            if config.network_policy != network::POLICY_CILIUM {
                return Err(ValidationError::conflict(format!(
                    "{} addon may only be enabled if the networkPolicy={}",
                    addons::CILIUM,
                    network::POLICY_CILIUM
                )));
            }
        }
        addons::ANTREA => {
            if config.network_policy != network::POLICY_ANTREA {
                return Err(ValidationError::conflict(format!(
                    "{} addon may only be enabled if the networkPolicy={}",
                    addons::ANTREA,
                    network::POLICY_ANTREA
                )));
            }
        }
        addons::FLANNEL => {
            if !config.network_policy.is_empty() {
                return Err(ValidationError::conflict(format!(
                    "{} addon does not support NetworkPolicy, replace {} with \"\"",
                    addons::FLANNEL,
                    config.network_policy
                )));
            }
            let plugin = config.network_plugin.as_str();
            if !plugin.is_empty() && plugin != network::PLUGIN_FLANNEL {
                return Err(ValidationError::conflict(format!(
                    "{} addon is not supported with networkPlugin={}, please use networkPlugin={}",
                    addons::FLANNEL,
                    plugin,
                    network::PLUGIN_FLANNEL
                )));
            }
        }
        addons::AZURE_POLICY => {
            let valid_version = context.rationalizer().is_valid_min_version(
                context.kind(),
                context.raw_release(),
                version,
                "1.10.0",
            )?;
            if !valid_version {
                return Err(ValidationError::version(
                    "Azure Policy add-on can only be used with Kubernetes v1.10 and above. Please specify a compatible version",
                ));
            }
            if spec.service_principal_profile.is_none() || config.use_managed_identity {
                return Err(ValidationError::conflict(
                    "Azure Policy add-on requires service principal profile to be specified",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_autoscaler_pool(context: &RuleContext<'_>, pool: &AddonNodePoolsConfig) -> Result<()> {
    if pool.name.is_empty() {
        return Err(ValidationError::structural(
            "cluster-autoscaler addon pools configuration must have a 'name' property that correlates with a pool name in the agentPoolProfiles array",
        ));
    }
    if context.spec.agent_pool_by_name(&pool.name).is_none() {
        return Err(ValidationError::conflict(format!(
            "cluster-autoscaler addon pool 'name' {} does not match any agentPoolProfiles nodepool name",
            pool.name
        )));
    }

    let bound = |key: &str| -> Result<i64> {
        match pool.config.get(key).map(String::as_str) {
            None | Some("") => Ok(0),
            Some(raw) => raw.parse().map_err(|_| {
                ValidationError::structural(format!(
                    "cluster-autoscaler addon pool 'name' {} has invalid '{}' config, must be a string int, got {}",
                    pool.name, key, raw
                ))
            }),
        }
    };
    let min = bound("min-nodes")?;
    let max = bound("max-nodes")?;
    if min > max {
        return Err(ValidationError::structural(format!(
            "cluster-autoscaler addon pool 'name' {} has invalid config, 'max-nodes' {} must be greater than or equal to 'min-nodes' {}",
            pool.name, max, min
        )));
    }
    Ok(())
}

/// Mandatory addons; an entry that is unset counts as disabled
fn check_disabled_addon(context: &RuleContext<'_>, config: &KubernetesConfig, addon: &KubernetesAddon) -> Result<()> {
    match addon.name.as_str() {
        addons::CLOUD_NODE_MANAGER
            if config.use_cloud_controller_manager.is_enabled() && is_version_ge(context.raw_version(), "1.16.0") =>
        {
            Err(ValidationError::conflict(format!(
                "{} add-on is required when useCloudControllerManager is true in Kubernetes 1.16 or above",
                addon.name
            )))
        }
        addons::AZURE_CLOUD_PROVIDER => Err(ValidationError::conflict(format!(
            "{} add-on is required, it cannot be disabled",
            addon.name
        ))),
        _ => Ok(()),
    }
}

fn requires_ccm(name: &str) -> ValidationError {
    ValidationError::conflict(format!("{} add-on requires useCloudControllerManager to be true", name))
}
