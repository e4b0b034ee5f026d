//! Orchestrator profile rule
//!
//! Outside update mode the requested version must rationalize to a
//! creatable catalog entry, and for Kubernetes the KubernetesConfig and the
//! version-gated feature flags are checked against the resolved version.
//! In update mode any catalog entry, or the latest patch of the requested
//! minor, is accepted.

use base64::Engine as _;
use clusterspec_core::constants::{cloud, load_balancer, runtime};
use clusterspec_core::{KubernetesConfig, OrchestratorKind};
use semver::Version;
use tracing::warn;

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::kubernetes_config::{validate_kubernetes_config, Ipv6Flags};
use crate::primitives::{format_list, parse_ip};

pub fn check_orchestrator_profile(context: &RuleContext<'_>) -> Result<()> {
    if context.is_update {
        check_update_version(context)?;
    } else {
        match context.kind() {
            OrchestratorKind::Dcos => check_dcos(context)?,
            OrchestratorKind::Swarm | OrchestratorKind::SwarmMode => {}
            OrchestratorKind::Kubernetes => check_kubernetes(context)?,
        }
    }

    let profile = &context.spec.orchestrator_profile;
    if !context.is_kubernetes() && profile.kubernetes_config.is_some() {
        return Err(ValidationError::conflict(
            "KubernetesConfig can be specified only when OrchestratorType is Kubernetes",
        ));
    }
    let has_dcos_config = profile.dcos_config.as_ref().map(|c| !c.is_empty()).unwrap_or(false);
    if !context.kind().is_dcos() && has_dcos_config {
        return Err(ValidationError::conflict(
            "DcosConfig can be specified only when OrchestratorType is DCOS",
        ));
    }

    check_container_runtime(context)
}

fn check_update_version(context: &RuleContext<'_>) -> Result<()> {
    let kind = context.kind();
    if !matches!(kind, OrchestratorKind::Dcos | OrchestratorKind::Kubernetes) {
        return Ok(());
    }

    let windows = context.spec.has_windows();
    let (release, version) = (context.raw_release(), context.raw_version());
    let rationalizer = context.rationalizer();
    if rationalizer.resolve(kind, release, version, false, windows).is_some()
        || rationalizer.valid_patch_version(kind, version, true, windows).is_some()
    {
        return Ok(());
    }

    let message = if windows {
        format!(
            "the following OrchestratorProfile configuration is not supported with Windows agentpools: OrchestratorType: \"{}\", OrchestratorRelease: \"{}\", OrchestratorVersion: \"{}\". Please check supported Release or Version for this build of aks-engine",
            kind, release, version
        )
    } else {
        format!(
            "the following OrchestratorProfile configuration is not supported: OrchestratorType: \"{}\", OrchestratorRelease: \"{}\", OrchestratorVersion: \"{}\". Please check supported Release or Version for this build of aks-engine",
            kind, release, version
        )
    };
    Err(ValidationError::version(message))
}

fn check_dcos(context: &RuleContext<'_>) -> Result<()> {
    let kind = context.kind();
    let (release, version) = (context.raw_release(), context.raw_version());
    if context.rationalizer().resolve(kind, release, version, false, false).is_none() {
        return Err(ValidationError::version(format!(
            "the following OrchestratorProfile configuration is not supported: OrchestratorType: {}, OrchestratorRelease: {}, OrchestratorVersion: {}. Please check supported Release or Version for this build of aks-engine",
            kind, release, version
        )));
    }

    let static_ip = context
        .spec
        .orchestrator_profile
        .dcos_config
        .as_ref()
        .and_then(|c| c.bootstrap_profile.as_ref())
        .map(|b| b.static_ip.as_str())
        .unwrap_or_default();
    if !static_ip.is_empty() && parse_ip(static_ip).is_none() {
        return Err(ValidationError::structural(format!(
            "DcosConfig.BootstrapProfile.StaticIP '{}' is an invalid IP address",
            static_ip
        )));
    }
    Ok(())
}

fn check_kubernetes(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    let kind = context.kind();
    let windows = spec.has_windows();
    let (release, version) = (context.raw_release(), context.raw_version());

    let resolved = context
        .rationalizer()
        .resolve(kind, release, version, false, windows)
        .ok_or_else(|| {
            let supported = format_list(&context.catalog.supported_versions(kind, false, windows));
            if windows {
                ValidationError::version(format!(
                    "the following OrchestratorProfile configuration is not supported with OsType \"Windows\": OrchestratorType: \"{}\", OrchestratorRelease: \"{}\", OrchestratorVersion: \"{}\". Please use one of the following versions: {}",
                    kind, release, version, supported
                ))
            } else {
                ValidationError::version(format!(
                    "the following OrchestratorProfile configuration is not supported: OrchestratorType: \"{}\", OrchestratorRelease: \"{}\", OrchestratorVersion: \"{}\". Please use one of the following versions: {}",
                    kind, release, version, supported
                ))
            }
        })?;

    let sv = Version::parse(&resolved)
        .map_err(|_| ValidationError::version(format!("could not validate version {}", resolved)))?;

    if spec.has_availability_zones() && sv < Version::new(1, 12, 0) {
        return Err(ValidationError::version(
            "availabilityZone is only available in Kubernetes version 1.12 or greater",
        ));
    }

    let Some(config) = context.kubernetes_config() else {
        return Ok(());
    };

    let flags = Ipv6Flags {
        dual_stack: spec.is_ipv6_dual_stack(),
        ipv6_only: spec.is_ipv6_only(),
    };
    validate_kubernetes_config(config, &resolved, windows, flags)?;
    check_feature_gates(context, config, &sv)?;
    check_load_balancer(context, config, &sv)?;

    if spec.is_azure_stack_cloud() {
        check_azure_stack_limits(config)?;
    }
    Ok(())
}

fn check_feature_gates(context: &RuleContext<'_>, config: &KubernetesConfig, sv: &Version) -> Result<()> {
    let version = context.raw_version();

    if config.enable_aggregated_apis && !config.is_rbac_enabled() {
        return Err(ValidationError::conflict(
            "enableAggregatedAPIs requires the enableRbac feature as a prerequisite",
        ));
    }

    if config.enable_data_encryption_at_rest.is_enabled() {
        if *sv < Version::new(1, 7, 0) {
            return Err(ValidationError::version(format!(
                "enableDataEncryptionAtRest is only available in Kubernetes version 1.7.0 or greater; unable to validate for Kubernetes version {}",
                version
            )));
        }
        if !config.etcd_encryption_key.is_empty()
            && base64::engine::general_purpose::STANDARD
                .decode(&config.etcd_encryption_key)
                .is_err()
        {
            return Err(ValidationError::structural(
                "etcdEncryptionKey must be base64 encoded. Please provide a valid base64 encoded value or leave the etcdEncryptionKey empty to auto-generate the value",
            ));
        }
    }

    if config.enable_encryption_with_external_kms.is_enabled() && *sv < Version::new(1, 10, 0) {
        return Err(ValidationError::version(format!(
            "enableEncryptionWithExternalKms is only available in Kubernetes version 1.10.0 or greater; unable to validate for Kubernetes version {}",
            version
        )));
    }

    if config.enable_rbac.is_set() && !config.is_rbac_enabled() && *sv >= Version::new(1, 15, 0) {
        return Err(ValidationError::version(format!(
            "RBAC support is required for Kubernetes version 1.15.0 or greater; unable to build Kubernetes v{} cluster with enableRbac=false",
            version
        )));
    }

    if config.enable_pod_security_policy.is_enabled() {
        if context.warnings_enabled() {
            warn!("EnablePodSecurityPolicy is deprecated in favor of the addon pod-security-policy.");
        }
        if !config.is_rbac_enabled() {
            return Err(ValidationError::conflict(
                "enablePodSecurityPolicy requires the enableRbac feature as a prerequisite",
            ));
        }
    }
    Ok(())
}

fn check_load_balancer(context: &RuleContext<'_>, config: &KubernetesConfig, sv: &Version) -> Result<()> {
    let sku = config.load_balancer_sku.as_str();
    if !sku.is_empty()
        && !sku.eq_ignore_ascii_case(load_balancer::STANDARD)
        && !sku.eq_ignore_ascii_case(load_balancer::BASIC)
    {
        return Err(ValidationError::unsupported(format!(
            "Invalid value for loadBalancerSku, only {} and {} are supported",
            load_balancer::STANDARD,
            load_balancer::BASIC
        )));
    }

    // the version and exclusion requirements only apply to the exact canonical spelling
    let standard = sku == load_balancer::STANDARD;
    if standard {
        if *sv < Version::new(1, 11, 0) {
            return Err(ValidationError::version(format!(
                "loadBalancerSku is only available in Kubernetes version 1.11.0 or greater; unable to validate for Kubernetes version {}",
                context.raw_version()
            )));
        }
        if !config.exclude_master_from_standard_lb.is_enabled() {
            return Err(ValidationError::conflict(
                "standard loadBalancerSku should exclude master nodes. Please set KubernetesConfig \"ExcludeMasterFromStandardLB\" to \"true\"",
            ));
        }
    }

    if !config.docker_engine_version.is_empty() && context.warnings_enabled() {
        warn!(
            docker_engine_version = %config.docker_engine_version,
            "docker-engine is deprecated in favor of moby, but you passed in a dockerEngineVersion configuration. This will be ignored."
        );
    }

    if config.maximum_load_balancer_rule_count < 0 {
        return Err(ValidationError::structural(
            "maximumLoadBalancerRuleCount shouldn't be less than 0",
        ));
    }

    let idle_timeout = config.outbound_rule_idle_timeout_in_minutes;
    if standard && idle_timeout != 0 && !(4..=120).contains(&idle_timeout) {
        return Err(ValidationError::structural(
            "outboundRuleIdleTimeoutInMinutes shouldn't be less than 4 or greater than 120",
        ));
    }
    Ok(())
}

fn check_azure_stack_limits(config: &KubernetesConfig) -> Result<()> {
    if config.use_instance_metadata.is_enabled() {
        return Err(ValidationError::unsupported(
            "useInstanceMetadata shouldn't be set to true as feature not yet supported on Azure Stack",
        ));
    }
    if !config.etcd_disk_size_gb.is_empty() {
        let size: i64 = config
            .etcd_disk_size_gb
            .parse()
            .map_err(|_| ValidationError::structural("could not convert EtcdDiskSizeGB to int"))?;
        if size > cloud::MAX_AZURE_STACK_MANAGED_DISK_SIZE_GB {
            return Err(ValidationError::structural(format!(
                "EtcdDiskSizeGB max size supported on Azure Stack is {}",
                cloud::MAX_AZURE_STACK_MANAGED_DISK_SIZE_GB
            )));
        }
    }
    Ok(())
}

/// Runtime allow-list; kata-containers and containerd have no Windows support
fn check_container_runtime(context: &RuleContext<'_>) -> Result<()> {
    if !context.is_kubernetes() {
        return Ok(());
    }
    let name = context
        .kubernetes_config()
        .map(|k| k.container_runtime.as_str())
        .unwrap_or_default();

    if !runtime::VALUES.contains(&name) {
        return Err(ValidationError::unsupported(format!(
            "unknown containerRuntime \"{}\" specified",
            name
        )));
    }
    if (name == runtime::KATA_CONTAINERS || name == runtime::CONTAINERD) && context.spec.has_windows() {
        return Err(ValidationError::unsupported(format!(
            "containerRuntime \"{}\" is not supporting windows agents",
            name
        )));
    }
    Ok(())
}
