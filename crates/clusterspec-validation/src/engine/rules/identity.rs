//! Cluster identity rules: service principal, managed identity and AAD

use clusterspec_core::OrchestratorKind;
use semver::Version;
use uuid::Uuid;

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::is_keyvault_id;

/// Without managed identity, Kubernetes needs a complete service principal
pub fn check_service_principal(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    if spec.uses_managed_identity() {
        return Ok(());
    }
    let kind = context.kind();

    let Some(sp) = &spec.service_principal_profile else {
        return Err(ValidationError::structural(format!(
            "ServicePrincipalProfile must be specified with Orchestrator {}",
            kind
        )));
    };
    if sp.client_id.is_empty() {
        return Err(ValidationError::structural(format!(
            "the service principal client ID must be specified with Orchestrator {}",
            kind
        )));
    }
    // exactly one of the inline secret and the key vault reference
    if sp.secret.is_empty() == sp.keyvault_secret_ref.is_none() {
        return Err(ValidationError::conflict(format!(
            "either the service principal client secret or keyvault secret reference must be specified with Orchestrator {}",
            kind
        )));
    }

    let external_kms = context
        .kubernetes_config()
        .map(|k| k.enable_encryption_with_external_kms.is_enabled())
        .unwrap_or(false);
    if external_kms && sp.object_id.is_empty() {
        return Err(ValidationError::structural(format!(
            "the service principal object ID must be specified with Orchestrator {} when enableEncryptionWithExternalKms is true",
            kind
        )));
    }

    if let Some(secret_ref) = &sp.keyvault_secret_ref {
        if secret_ref.vault_id.is_empty() {
            return Err(ValidationError::structural(format!(
                "the Keyvault ID must be specified for the Service Principle with Orchestrator {}",
                kind
            )));
        }
        if secret_ref.secret_name.is_empty() {
            return Err(ValidationError::structural(format!(
                "the Keyvault Secret must be specified for the Service Principle with Orchestrator {}",
                kind
            )));
        }
        if !is_keyvault_id(&secret_ref.vault_id) {
            return Err(ValidationError::structural(
                "service principal client keyvault secret reference is of incorrect format",
            ));
        }
    }
    Ok(())
}

/// Managed identity with scale-set masters or a user assigned identity needs 1.12+
pub fn check_managed_identity(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    let Some(config) = context.kubernetes_config() else {
        return Ok(());
    };
    if !config.use_managed_identity {
        return Ok(());
    }

    let (kind, release, version) = (context.kind(), context.raw_release(), context.raw_version());
    let resolved = context
        .rationalizer()
        .resolve(kind, release, version, false, false)
        .ok_or_else(|| {
            ValidationError::version(format!(
                "the following user supplied OrchestratorProfile configuration is not supported: OrchestratorType: {}, OrchestratorRelease: {}, OrchestratorVersion: {}. Please check supported Release or Version for this build of aks-engine",
                kind, release, version
            ))
        })?;
    let sv = Version::parse(&resolved)
        .map_err(|_| ValidationError::version(format!("could not validate version {}", resolved)))?;
    let min = Version::new(1, 12, 0);

    if spec.master_profile.is_vmss() {
        if sv < min {
            return Err(ValidationError::version(
                "managed identity and VMSS masters can only be used with Kubernetes 1.12.0 or above. Please specify \"orchestratorRelease\": \"1.12\"",
            ));
        }
    } else if !config.user_assigned_id.is_empty() && sv < min {
        return Err(ValidationError::version(
            "user assigned identity can only be used with Kubernetes 1.12.0 or above. Please specify \"orchestratorRelease\": \"1.12\"",
        ));
    }
    Ok(())
}

pub fn check_aad_profile(context: &RuleContext<'_>) -> Result<()> {
    let Some(aad) = &context.spec.aad_profile else {
        return Ok(());
    };
    if !context.is_kubernetes() {
        return Err(ValidationError::unsupported(format!(
            "'aadProfile' is only supported by orchestrator '{}'",
            OrchestratorKind::Kubernetes
        )));
    }

    let invalid = |field: &str, value: &str| ValidationError::structural(format!("{} '{}' is invalid", field, value));
    if Uuid::parse_str(&aad.client_app_id).is_err() {
        return Err(invalid("clientAppID", &aad.client_app_id));
    }
    if Uuid::parse_str(&aad.server_app_id).is_err() {
        return Err(invalid("serverAppID", &aad.server_app_id));
    }
    if !aad.tenant_id.is_empty() && Uuid::parse_str(&aad.tenant_id).is_err() {
        return Err(invalid("tenantID", &aad.tenant_id));
    }
    if !aad.admin_group_id.is_empty() && Uuid::parse_str(&aad.admin_group_id).is_err() {
        return Err(invalid("adminGroupID", &aad.admin_group_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::error::ErrorKind;
    use clusterspec_core::{
        AadProfile, ClusterSpec, KeyvaultSecretRef, KubernetesConfig, MasterProfile, OrchestratorProfile,
        ServicePrincipalProfile, StaticCatalog, Toggle,
    };

    const CLIENT_APP: &str = "92444486-5bc3-4291-818b-d53ae480991b";
    const SERVER_APP: &str = "403f018b-4d89-495b-b548-0cf9868cdb0a";

    fn spec(kind: OrchestratorKind, config: Option<KubernetesConfig>) -> ClusterSpec {
        let mut orchestrator = OrchestratorProfile::new(kind);
        orchestrator.kubernetes_config = config;
        ClusterSpec::new(orchestrator, MasterProfile::default())
    }

    fn run(check: fn(&RuleContext<'_>) -> Result<()>, spec: &ClusterSpec) -> Result<()> {
        let catalog = StaticCatalog::new();
        let config = ValidatorConfig::default();
        check(&RuleContext::new(spec, false, &catalog, &config))
    }

    fn message(check: fn(&RuleContext<'_>) -> Result<()>, spec: &ClusterSpec) -> String {
        run(check, spec).unwrap_err().to_string()
    }

    #[test]
    fn test_service_principal_required() {
        let mut s = spec(OrchestratorKind::Kubernetes, None);
        assert_eq!(
            message(check_service_principal, &s),
            "ServicePrincipalProfile must be specified with Orchestrator Kubernetes"
        );

        s.service_principal_profile = Some(ServicePrincipalProfile::default());
        assert_eq!(
            message(check_service_principal, &s),
            "the service principal client ID must be specified with Orchestrator Kubernetes"
        );

        s.service_principal_profile = Some(ServicePrincipalProfile {
            client_id: "client".into(),
            ..Default::default()
        });
        assert!(message(check_service_principal, &s).starts_with("either the service principal client secret"));

        s.service_principal_profile = Some(ServicePrincipalProfile {
            client_id: "client".into(),
            secret: "secret".into(),
            ..Default::default()
        });
        assert!(run(check_service_principal, &s).is_ok());
    }

    #[test]
    fn test_service_principal_secret_and_reference_are_exclusive() {
        let mut s = spec(OrchestratorKind::Kubernetes, None);
        s.service_principal_profile = Some(ServicePrincipalProfile {
            client_id: "client".into(),
            secret: "secret".into(),
            keyvault_secret_ref: Some(KeyvaultSecretRef::default()),
            ..Default::default()
        });
        let err = run(check_service_principal, &s).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_service_principal_keyvault_reference() {
        let mut s = spec(OrchestratorKind::Kubernetes, None);
        s.service_principal_profile = Some(ServicePrincipalProfile {
            client_id: "client".into(),
            keyvault_secret_ref: Some(KeyvaultSecretRef {
                vault_id: "vault".into(),
                secret_name: "spsecret".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            message(check_service_principal, &s),
            "service principal client keyvault secret reference is of incorrect format"
        );
    }

    #[test]
    fn test_external_kms_needs_object_id() {
        let mut s = spec(
            OrchestratorKind::Kubernetes,
            Some(KubernetesConfig {
                enable_encryption_with_external_kms: Toggle::Enabled,
                ..Default::default()
            }),
        );
        s.service_principal_profile = Some(ServicePrincipalProfile {
            client_id: "client".into(),
            secret: "secret".into(),
            ..Default::default()
        });
        assert!(message(check_service_principal, &s).starts_with("the service principal object ID must be specified"));
    }

    #[test]
    fn test_managed_identity_skips_service_principal() {
        let s = spec(
            OrchestratorKind::Kubernetes,
            Some(KubernetesConfig {
                use_managed_identity: true,
                ..Default::default()
            }),
        );
        assert!(run(check_service_principal, &s).is_ok());
        assert!(run(check_managed_identity, &s).is_ok());
    }

    #[test]
    fn test_managed_identity_unsupported_version() {
        let mut s = spec(
            OrchestratorKind::Kubernetes,
            Some(KubernetesConfig {
                use_managed_identity: true,
                ..Default::default()
            }),
        );
        s.orchestrator_profile.version = "1.11.0".into();
        assert!(message(check_managed_identity, &s)
            .starts_with("the following user supplied OrchestratorProfile configuration is not supported"));
    }

    #[test]
    fn test_aad_profile() {
        let mut s = spec(OrchestratorKind::Kubernetes, None);
        s.aad_profile = Some(AadProfile {
            client_app_id: CLIENT_APP.into(),
            server_app_id: SERVER_APP.into(),
            ..Default::default()
        });
        assert!(run(check_aad_profile, &s).is_ok());

        s.aad_profile = Some(AadProfile {
            client_app_id: CLIENT_APP.into(),
            server_app_id: SERVER_APP.into(),
            tenant_id: "tenant".into(),
            ..Default::default()
        });
        assert_eq!(message(check_aad_profile, &s), "tenantID 'tenant' is invalid");

        s.aad_profile = Some(AadProfile {
            client_app_id: "1".into(),
            ..Default::default()
        });
        assert_eq!(message(check_aad_profile, &s), "clientAppID '1' is invalid");

        let mut swarm = spec(OrchestratorKind::Swarm, None);
        swarm.aad_profile = Some(AadProfile::default());
        assert_eq!(message(check_aad_profile, &swarm), "'aadProfile' is only supported by orchestrator 'Kubernetes'");
    }
}
