//! Network plugin, policy and mode compatibility

use clusterspec_core::constants::network;
use clusterspec_core::KubernetesConfig;

use crate::error::{Result, ValidationError};
use crate::version::is_version_ge;

/// (plugin, policy) pairs that may be combined
pub const ALLOWED_PLUGIN_POLICY_PAIRS: &[(&str, &str)] = &[
    ("", ""),
    (network::PLUGIN_AZURE, ""),
    (network::PLUGIN_AZURE, network::POLICY_AZURE),
    (network::PLUGIN_KUBENET, ""),
    (network::PLUGIN_FLANNEL, ""),
    (network::PLUGIN_CILIUM, network::POLICY_CILIUM),
    (network::PLUGIN_KUBENET, network::POLICY_CALICO),
    (network::PLUGIN_AZURE, network::POLICY_CALICO),
    ("", network::POLICY_CALICO),
    ("", network::POLICY_CILIUM),
    (network::PLUGIN_ANTREA, network::POLICY_ANTREA),
    ("", network::POLICY_ANTREA),
    // legacy policy-only spellings
    ("", network::POLICY_AZURE),
    ("", network::POLICY_NONE),
];

pub fn is_plugin_policy_allowed(plugin: &str, policy: &str) -> bool {
    ALLOWED_PLUGIN_POLICY_PAIRS
        .iter()
        .any(|(p, q)| *p == plugin && *q == policy)
}

pub fn validate_network_plugin(plugin: &str, has_windows: bool) -> Result<()> {
    if !network::PLUGIN_VALUES.contains(&plugin) {
        return Err(ValidationError::unsupported(format!(
            "unknown networkPlugin '{}' specified",
            plugin
        )));
    }
    if plugin == network::PLUGIN_ANTREA && has_windows {
        return Err(ValidationError::unsupported(format!(
            "networkPlugin '{}' is not supporting windows agents",
            plugin
        )));
    }
    Ok(())
}

pub fn validate_network_policy(plugin: &str, policy: &str, k8s_version: &str, has_windows: bool) -> Result<()> {
    if !network::POLICY_VALUES.contains(&policy) {
        return Err(ValidationError::unsupported(format!(
            "unknown networkPolicy '{}' specified",
            policy
        )));
    }
    if policy == network::POLICY_AZURE && plugin == network::PLUGIN_AZURE && !is_version_ge(k8s_version, "1.8.0") {
        return Err(ValidationError::version(
            "networkPolicy azure requires kubernetes version of 1.8 or higher",
        ));
    }
    let linux_only = [network::POLICY_CALICO, network::POLICY_CILIUM, network::POLICY_ANTREA];
    if linux_only.contains(&policy) && has_windows {
        return Err(ValidationError::unsupported(format!(
            "networkPolicy '{}' is not supporting windows agents",
            policy
        )));
    }
    Ok(())
}

pub fn validate_plugin_policy_pair(plugin: &str, policy: &str) -> Result<()> {
    if !is_plugin_policy_allowed(plugin, policy) {
        return Err(ValidationError::unsupported(format!(
            "networkPolicy '{}' is not supported with networkPlugin '{}'",
            policy, plugin
        )));
    }
    Ok(())
}

pub fn validate_network_mode(plugin: &str, policy: &str, mode: &str) -> Result<()> {
    if !network::MODE_VALUES.contains(&mode) {
        return Err(ValidationError::unsupported(format!(
            "unknown networkMode '{}' specified",
            mode
        )));
    }
    if !mode.is_empty() {
        if plugin != network::PLUGIN_AZURE {
            return Err(ValidationError::conflict("networkMode requires network plugin to be 'azure'"));
        }
        if policy == network::POLICY_CALICO && mode != network::MODE_TRANSPARENT {
            return Err(ValidationError::unsupported(format!(
                "networkMode '{}' is not supported by calico",
                mode
            )));
        }
    }
    Ok(())
}

/// Plugin, policy, pair and mode checks in that order
pub fn validate_network(config: &KubernetesConfig, k8s_version: &str, has_windows: bool) -> Result<()> {
    let plugin = config.network_plugin.as_str();
    let policy = config.network_policy.as_str();

    validate_network_plugin(plugin, has_windows)?;
    validate_network_policy(plugin, policy, k8s_version, has_windows)?;
    validate_plugin_policy_pair(plugin, policy)?;
    validate_network_mode(plugin, policy, &config.network_mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(plugin: &str, policy: &str, mode: &str) -> KubernetesConfig {
        KubernetesConfig {
            network_plugin: plugin.to_string(),
            network_policy: policy.to_string(),
            network_mode: mode.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_allowed_pairs() {
        for (plugin, policy) in ALLOWED_PLUGIN_POLICY_PAIRS {
            assert!(validate_network(&config(plugin, policy, ""), "1.18.19", false).is_ok());
        }
        assert!(!is_plugin_policy_allowed("azure", "cilium"));
        assert!(!is_plugin_policy_allowed("kubenet", "kubenet"));
    }

    #[test]
    fn test_unknown_values() {
        let err = validate_network(&config("weave", "", ""), "1.18.19", false).unwrap_err();
        assert_eq!(err.to_string(), "unknown networkPlugin 'weave' specified");

        let err = validate_network(&config("", "weave", ""), "1.18.19", false).unwrap_err();
        assert_eq!(err.to_string(), "unknown networkPolicy 'weave' specified");

        let err = validate_network(&config("azure", "", "tunnel"), "1.18.19", false).unwrap_err();
        assert_eq!(err.to_string(), "unknown networkMode 'tunnel' specified");
    }

    #[test]
    fn test_windows_restrictions() {
        let err = validate_network(&config("antrea", "antrea", ""), "1.18.19", true).unwrap_err();
        assert_eq!(err.to_string(), "networkPlugin 'antrea' is not supporting windows agents");

        let err = validate_network(&config("kubenet", "calico", ""), "1.18.19", true).unwrap_err();
        assert_eq!(err.to_string(), "networkPolicy 'calico' is not supporting windows agents");
    }

    #[test]
    fn test_azure_policy_version() {
        let err = validate_network(&config("azure", "azure", ""), "1.7.16", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Version);
        assert!(validate_network(&config("azure", "azure", ""), "1.8.0", false).is_ok());
    }

    #[test]
    fn test_pair_and_mode() {
        let err = validate_network(&config("azure", "cilium", ""), "1.18.19", false).unwrap_err();
        assert_eq!(err.to_string(), "networkPolicy 'cilium' is not supported with networkPlugin 'azure'");

        let err = validate_network(&config("kubenet", "", "bridge"), "1.18.19", false).unwrap_err();
        assert_eq!(err.to_string(), "networkMode requires network plugin to be 'azure'");

        let err = validate_network(&config("azure", "calico", "bridge"), "1.18.19", false).unwrap_err();
        assert_eq!(err.to_string(), "networkMode 'bridge' is not supported by calico");

        assert!(validate_network(&config("azure", "calico", "transparent"), "1.18.19", false).is_ok());
    }
}
