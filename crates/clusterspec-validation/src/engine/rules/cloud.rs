//! Cloud environment rules: location, custom cloud profile and Azure Stack support

use clusterspec_core::constants::{availability, cloud, network};
use tracing::warn;

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::format_list;

pub fn check_location(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    if spec.is_azure_stack_cloud() && spec.location.is_empty() {
        return Err(ValidationError::structural("missing ContainerService Location"));
    }
    Ok(())
}

pub fn check_custom_cloud_profile(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    let Some(profile) = &spec.custom_cloud_profile else {
        return Ok(());
    };

    if profile.portal_url.is_empty() {
        return Err(ValidationError::structural(
            "portalURL needs to be specified when CustomCloudProfile is provided",
        ));
    }
    let prefix = format!("https://portal.{}.", spec.location);
    if !profile.portal_url.starts_with(&prefix) {
        return Err(ValidationError::structural(format!(
            "portalURL needs to start with {} ",
            prefix
        )));
    }

    let method = profile.authentication_method.as_str();
    if !method.is_empty() && method != cloud::CLIENT_SECRET_AUTH && method != cloud::CLIENT_CERTIFICATE_AUTH {
        return Err(ValidationError::unsupported(format!(
            "authenticationMethod allowed values are '{}' and '{}'",
            cloud::CLIENT_CERTIFICATE_AUTH,
            cloud::CLIENT_SECRET_AUTH
        )));
    }

    let identity = profile.identity_system.as_str();
    if !identity.is_empty() && identity != cloud::AZURE_AD_IDENTITY && identity != cloud::ADFS_IDENTITY {
        return Err(ValidationError::unsupported(format!(
            "identitySystem allowed values are '{}' and '{}'",
            cloud::AZURE_AD_IDENTITY,
            cloud::ADFS_IDENTITY
        )));
    }

    if !cloud::DEPENDENCIES_LOCATION_VALUES.contains(&profile.dependencies_location.as_str()) {
        return Err(ValidationError::unsupported(format!(
            "The {} dependenciesLocation is not supported. The supported vaules are {}",
            profile.dependencies_location,
            format_list(cloud::DEPENDENCIES_LOCATION_VALUES)
        )));
    }
    Ok(())
}

/// Kubernetes on Azure Stack: plugin and availability restrictions
pub fn check_azure_stack_support(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    if !spec.is_azure_stack_cloud() {
        return Ok(());
    }

    let plugin = context
        .kubernetes_config()
        .map(|k| k.network_plugin.as_str())
        .unwrap_or_default();
    if (plugin == network::PLUGIN_AZURE || plugin.is_empty()) && context.warnings_enabled() {
        warn!(
            network_plugin = plugin,
            "NetworkPlugin 'azure' is a private preview feature on Azure Stack clouds"
        );
    }
    if plugin != network::PLUGIN_AZURE && plugin != network::PLUGIN_KUBENET && !plugin.is_empty() {
        return Err(ValidationError::unsupported(format!(
            "kubernetesConfig.networkPlugin '{}' is not supported on Azure Stack clouds",
            plugin
        )));
    }

    if !spec.master_profile.is_availability_set() {
        return Err(ValidationError::unsupported(format!(
            "masterProfile.availabilityProfile should be set to '{}' on Azure Stack clouds",
            availability::AVAILABILITY_SET
        )));
    }
    if let Some(pool) = spec.agent_pool_profiles.iter().find(|pool| !pool.is_availability_set()) {
        return Err(ValidationError::unsupported(format!(
            "agentPoolProfiles[{}].availabilityProfile should be set to '{}' on Azure Stack clouds",
            pool.name,
            availability::AVAILABILITY_SET
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use clusterspec_core::{
        AgentPoolProfile, CloudEnvironment, ClusterSpec, CustomCloudProfile, KubernetesConfig, MasterProfile,
        OrchestratorKind, OrchestratorProfile, StaticCatalog,
    };

    fn azure_stack_spec() -> ClusterSpec {
        let mut orchestrator = OrchestratorProfile::new(OrchestratorKind::Kubernetes);
        orchestrator.kubernetes_config = Some(KubernetesConfig::default());
        let mut master = MasterProfile::default();
        master.availability_profile = "AvailabilitySet".into();
        let mut spec = ClusterSpec::new(orchestrator, master);
        spec.location = "local".into();
        spec.custom_cloud_profile = Some(CustomCloudProfile {
            portal_url: "https://portal.local.azurestack.external/".into(),
            ..Default::default()
        });
        let mut pool = AgentPoolProfile::new("agentpool1", 1, "Standard_D2_v2");
        pool.availability_profile = "AvailabilitySet".into();
        spec.agent_pool_profiles = vec![pool];
        spec
    }

    fn run(check: fn(&RuleContext<'_>) -> Result<()>, spec: &ClusterSpec) -> Result<()> {
        let catalog = StaticCatalog::new();
        let config = ValidatorConfig::default();
        check(&RuleContext::new(spec, false, &catalog, &config))
    }

    #[test]
    fn test_location_required_on_azure_stack() {
        let mut spec = azure_stack_spec();
        assert!(run(check_location, &spec).is_ok());

        spec.location.clear();
        let err = run(check_location, &spec).unwrap_err();
        assert_eq!(err.to_string(), "missing ContainerService Location");

        spec.custom_cloud_profile = Some(CustomCloudProfile {
            environment: Some(CloudEnvironment {
                name: "AzurePublicCloud".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(run(check_location, &spec).is_ok());
    }

    #[test]
    fn test_custom_cloud_profile() {
        let mut spec = azure_stack_spec();
        assert!(run(check_custom_cloud_profile, &spec).is_ok());

        spec.location = "westus".into();
        let err = run(check_custom_cloud_profile, &spec).unwrap_err();
        assert_eq!(err.to_string(), "portalURL needs to start with https://portal.westus. ");

        let mut spec = azure_stack_spec();
        if let Some(profile) = spec.custom_cloud_profile.as_mut() {
            profile.authentication_method = "password".into();
        }
        let err = run(check_custom_cloud_profile, &spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "authenticationMethod allowed values are 'client_certificate' and 'client_secret'"
        );

        let mut spec = azure_stack_spec();
        if let Some(profile) = spec.custom_cloud_profile.as_mut() {
            profile.dependencies_location = "mars".into();
        }
        let err = run(check_custom_cloud_profile, &spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The mars dependenciesLocation is not supported. The supported vaules are [ public china german usgovernment]"
        );
    }

    #[test]
    fn test_azure_stack_support() {
        let mut spec = azure_stack_spec();
        assert!(run(check_azure_stack_support, &spec).is_ok());

        spec.agent_pool_profiles[0].availability_profile = "VirtualMachineScaleSets".into();
        let err = run(check_azure_stack_support, &spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "agentPoolProfiles[agentpool1].availabilityProfile should be set to 'AvailabilitySet' on Azure Stack clouds"
        );

        let mut spec = azure_stack_spec();
        if let Some(k) = spec.orchestrator_profile.kubernetes_config.as_mut() {
            k.network_plugin = "flannel".into();
        }
        let err = run(check_azure_stack_support, &spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "kubernetesConfig.networkPlugin 'flannel' is not supported on Azure Stack clouds"
        );
    }
}
