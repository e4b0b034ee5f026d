//! Availability zone rule

use clusterspec_core::constants::availability;

use super::RuleContext;
use crate::error::{Result, ValidationError};

/// Zones are all-or-nothing across profiles, and need scale sets and a standard load balancer
pub fn check_zones(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;
    if !spec.has_availability_zones() {
        return Ok(());
    }

    if !spec.masters_and_agents_use_zones() {
        return Err(ValidationError::conflict(
            "Availability Zones need to be defined for master profile and all agent pool profiles. Please set \"availabilityZones\" for all profiles",
        ));
    }

    if spec.agent_pool_profiles.iter().any(|pool| pool.is_availability_set()) {
        return Err(ValidationError::conflict(format!(
            "Availability Zones are not supported with an {}. Please either remove availabilityProfile or set availabilityProfile to {}",
            availability::AVAILABILITY_SET,
            availability::VIRTUAL_MACHINE_SCALE_SETS
        )));
    }

    let non_standard_sku = context
        .kubernetes_config()
        .map(|k| !k.load_balancer_sku.is_empty() && !k.is_standard_load_balancer())
        .unwrap_or(false);
    if non_standard_sku {
        return Err(ValidationError::conflict(
            "Availability Zones requires Standard LoadBalancer. Please set KubernetesConfig \"LoadBalancerSku\" to \"Standard\"",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use clusterspec_core::{
        AgentPoolProfile, ClusterSpec, KubernetesConfig, MasterProfile, OrchestratorKind, OrchestratorProfile,
        StaticCatalog,
    };

    fn zoned_spec() -> ClusterSpec {
        let mut orchestrator = OrchestratorProfile::new(OrchestratorKind::Kubernetes);
        orchestrator.kubernetes_config = Some(KubernetesConfig {
            load_balancer_sku: "Standard".into(),
            ..Default::default()
        });
        let mut master = MasterProfile::default();
        master.availability_zones = vec!["1".into(), "2".into()];
        let mut spec = ClusterSpec::new(orchestrator, master);
        let mut pool = AgentPoolProfile::new("agentpool1", 3, "Standard_D2_v2");
        pool.availability_profile = "VirtualMachineScaleSets".into();
        pool.availability_zones = vec!["1".into(), "2".into()];
        spec.agent_pool_profiles = vec![pool];
        spec
    }

    fn run(spec: &ClusterSpec) -> Result<()> {
        let catalog = StaticCatalog::new();
        let config = ValidatorConfig::default();
        check_zones(&RuleContext::new(spec, false, &catalog, &config))
    }

    #[test]
    fn test_no_zones_passes() {
        let mut s = zoned_spec();
        s.master_profile.availability_zones.clear();
        s.agent_pool_profiles[0].availability_zones.clear();
        if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
            k.load_balancer_sku = "Basic".into();
        }
        assert!(run(&s).is_ok());
    }

    #[test]
    fn test_all_profiles_zoned() {
        assert!(run(&zoned_spec()).is_ok());

        let mut s = zoned_spec();
        s.master_profile.availability_zones.clear();
        assert!(run(&s).unwrap_err().to_string().starts_with("Availability Zones need to be defined"));

        let mut s = zoned_spec();
        s.agent_pool_profiles.push(AgentPoolProfile::new("agentpool2", 1, "Standard_D2_v2"));
        assert!(run(&s).is_err());
    }

    #[test]
    fn test_zones_with_availability_set() {
        let mut s = zoned_spec();
        s.agent_pool_profiles[0].availability_profile = "AvailabilitySet".into();
        assert_eq!(
            run(&s).unwrap_err().to_string(),
            "Availability Zones are not supported with an AvailabilitySet. Please either remove availabilityProfile or set availabilityProfile to VirtualMachineScaleSets"
        );
    }

    #[test]
    fn test_zones_require_standard_load_balancer() {
        let mut s = zoned_spec();
        if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
            k.load_balancer_sku = "Basic".into();
        }
        assert_eq!(
            run(&s).unwrap_err().to_string(),
            "Availability Zones requires Standard LoadBalancer. Please set KubernetesConfig \"LoadBalancerSku\" to \"Standard\""
        );

        if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
            k.load_balancer_sku.clear();
        }
        assert!(run(&s).is_ok());
    }

    #[test]
    fn test_load_balancer_sku_is_case_insensitive() {
        for sku in ["standard", "STANDARD", "Standard"] {
            let mut s = zoned_spec();
            if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
                k.load_balancer_sku = sku.into();
            }
            assert!(run(&s).is_ok(), "{}", sku);
        }

        let mut s = zoned_spec();
        if let Some(k) = s.orchestrator_profile.kubernetes_config.as_mut() {
            k.load_balancer_sku = "basic".into();
        }
        assert!(run(&s).is_err());
    }
}
