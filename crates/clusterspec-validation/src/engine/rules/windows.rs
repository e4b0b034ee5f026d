//! Windows profile rule

use super::linux::validate_keyvault_secrets;
use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::password_complexity;
use crate::version::is_version_ge;

const CSI_PROXY_MIN: &str = "1.18.0-beta.1";

pub fn check_windows_profile(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    if !spec.has_windows() {
        return Ok(());
    }

    // only Kubernetes versions are tracked per operating system
    let version = if context.is_kubernetes() {
        let resolved = context
            .rationalizer()
            .resolve(context.kind(), context.raw_release(), context.raw_version(), false, true)
            .ok_or_else(|| {
                ValidationError::version(format!(
                    "Orchestrator {} version {} does not support Windows",
                    context.kind(),
                    context.raw_version()
                ))
            })?;
        Some(resolved)
    } else {
        None
    };

    let Some(windows) = &spec.windows_profile else {
        return Err(ValidationError::structural(
            "WindowsProfile is required when the cluster definition contains Windows agent pools",
        ));
    };
    if windows.admin_username.is_empty() {
        return Err(ValidationError::structural(
            "WindowsProfile.AdminUsername is required, when agent pool specifies Windows",
        ));
    }
    if windows.admin_password.is_empty() {
        return Err(ValidationError::structural(
            "WindowsProfile.AdminPassword is required, when agent pool specifies Windows",
        ));
    }
    if !password_complexity(&windows.admin_username, &windows.admin_password) {
        return Err(ValidationError::structural(
            "WindowsProfile.AdminPassword complexity not met. Windows password should contain 3 of the following categories - uppercase letters(A-Z), lowercase(a-z) letters, digits(0-9), special characters (~!@#$%^&*_-+=`|\\(){}[]:;<>,.?/')",
        ));
    }
    validate_keyvault_secrets(&windows.secrets, true)?;

    if let Some(version) = version {
        if windows.is_csi_proxy_enabled() {
            if !is_version_ge(&version, CSI_PROXY_MIN) {
                return Err(ValidationError::version(
                    "CSI proxy for Windows is only available in Kubernetes versions 1.18.0 or greater",
                ));
            }
            if windows.csi_proxy_url.is_empty() {
                return Err(ValidationError::structural(
                    "windowsProfile.csiProxyURL must be specified if enableCSIProxy is set",
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use clusterspec_core::{
        AgentPoolProfile, ClusterSpec, KeyVaultCertificate, KeyVaultId, KeyVaultSecrets, MasterProfile,
        OrchestratorKind, OrchestratorProfile, StaticCatalog, Toggle, WindowsProfile,
    };

    fn windows_spec(kind: OrchestratorKind, version: &str) -> ClusterSpec {
        let mut orchestrator = OrchestratorProfile::new(kind);
        orchestrator.version = version.into();
        let mut spec = ClusterSpec::new(orchestrator, MasterProfile::default());
        let mut pool = AgentPoolProfile::new("win", 1, "Standard_D2_v2");
        pool.os_type = "Windows".into();
        spec.agent_pool_profiles = vec![pool];
        spec.windows_profile = Some(WindowsProfile {
            admin_username: "azureuser".into(),
            admin_password: "Replace_Me_123".into(),
            ..Default::default()
        });
        spec
    }

    fn run(spec: &ClusterSpec) -> Result<()> {
        let catalog = StaticCatalog::new();
        let config = ValidatorConfig::default();
        check_windows_profile(&RuleContext::new(spec, false, &catalog, &config))
    }

    fn message(spec: &ClusterSpec) -> String {
        run(spec).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_windows_profile() {
        assert!(run(&windows_spec(OrchestratorKind::Kubernetes, "")).is_ok());
        assert!(run(&windows_spec(OrchestratorKind::Dcos, "")).is_ok());
    }

    #[test]
    fn test_linux_only_cluster_skips() {
        let mut s = windows_spec(OrchestratorKind::Kubernetes, "");
        s.agent_pool_profiles[0].os_type = "Linux".into();
        s.windows_profile = None;
        assert!(run(&s).is_ok());
    }

    #[test]
    fn test_version_without_windows_support() {
        let s = windows_spec(OrchestratorKind::Kubernetes, "1.14.8");
        assert_eq!(message(&s), "Orchestrator Kubernetes version 1.14.8 does not support Windows");
    }

    #[test]
    fn test_required_credentials() {
        let mut s = windows_spec(OrchestratorKind::Kubernetes, "");
        s.windows_profile = None;
        assert_eq!(
            message(&s),
            "WindowsProfile is required when the cluster definition contains Windows agent pools"
        );

        let mut s = windows_spec(OrchestratorKind::Kubernetes, "");
        if let Some(w) = s.windows_profile.as_mut() {
            w.admin_password.clear();
        }
        assert_eq!(
            message(&s),
            "WindowsProfile.AdminPassword is required, when agent pool specifies Windows"
        );

        let mut s = windows_spec(OrchestratorKind::Kubernetes, "");
        if let Some(w) = s.windows_profile.as_mut() {
            w.admin_password = "password".into();
        }
        assert!(message(&s).starts_with("WindowsProfile.AdminPassword complexity not met."));
    }

    #[test]
    fn test_secrets_need_certificate_store() {
        let mut s = windows_spec(OrchestratorKind::Kubernetes, "");
        if let Some(w) = s.windows_profile.as_mut() {
            w.secrets = vec![KeyVaultSecrets {
                source_vault: Some(KeyVaultId { id: "/subscriptions/s/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/kv".into() }),
                vault_certificates: vec![KeyVaultCertificate {
                    certificate_url: "https://kv.vault.azure.net/secrets/cert/1".into(),
                    certificate_store: String::new(),
                }],
            }];
        }
        assert!(message(&s).starts_with("KeyVaultCertificate.CertificateStore must be a non-empty value"));
    }

    #[test]
    fn test_csi_proxy() {
        assert!(run(&windows_spec(OrchestratorKind::Kubernetes, "1.17.17")).is_ok());
        assert!(run(&windows_spec(OrchestratorKind::Kubernetes, "1.18.19")).is_ok());

        let mut s = windows_spec(OrchestratorKind::Kubernetes, "1.17.17");
        if let Some(w) = s.windows_profile.as_mut() {
            w.enable_csi_proxy = Toggle::Enabled;
            w.csi_proxy_url = "https://packages.example.com/csi-proxy.tar.gz".into();
        }
        assert_eq!(
            message(&s),
            "CSI proxy for Windows is only available in Kubernetes versions 1.18.0 or greater"
        );

        let mut s = windows_spec(OrchestratorKind::Kubernetes, "1.17.17");
        if let Some(w) = s.windows_profile.as_mut() {
            w.enable_csi_proxy = Toggle::Disabled;
        }
        assert!(run(&s).is_ok());

        let mut s = windows_spec(OrchestratorKind::Kubernetes, "1.18.19");
        if let Some(w) = s.windows_profile.as_mut() {
            w.enable_csi_proxy = Toggle::Enabled;
        }
        assert_eq!(
            message(&s),
            "windowsProfile.csiProxyURL must be specified if enableCSIProxy is set"
        );

        if let Some(w) = s.windows_profile.as_mut() {
            w.csi_proxy_url = "https://packages.example.com/csi-proxy.tar.gz".into();
        }
        assert!(run(&s).is_ok());
    }
}
