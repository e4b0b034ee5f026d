//! Property tests for the validator and its primitives

use std::net::{IpAddr, Ipv4Addr};

use anyhow::Result;
use clusterspec_core::constants::network;
use clusterspec_core::{
    AgentPoolProfile, ClusterSpec, KubernetesConfig, MasterProfile, OrchestratorKind, OrchestratorProfile,
    ServicePrincipalProfile, StaticCatalog, VersionCatalog,
};
use clusterspec_validation::kubernetes_config::{validate_kubernetes_config, Ipv6Flags};
use clusterspec_validation::network::{is_plugin_policy_allowed, ALLOWED_PLUGIN_POLICY_PAIRS};
use clusterspec_validation::primitives::{parse_cidr, password_complexity, validate_label_value, validate_pool_name};
use clusterspec_validation::version::Rationalizer;
use clusterspec_validation::Validator;
use proptest::prelude::*;

const VERSIONED_KINDS: [OrchestratorKind; 2] = [OrchestratorKind::Kubernetes, OrchestratorKind::Dcos];

fn spec_with_pools(pools: usize) -> ClusterSpec {
    let mut master = MasterProfile::default();
    master.count = 1;
    master.dns_prefix = "mycluster".into();
    master.vm_size = "Standard_D2_v2".into();
    let mut spec = ClusterSpec::new(OrchestratorProfile::new(OrchestratorKind::Kubernetes), master);
    spec.agent_pool_profiles = (0..pools)
        .map(|i| AgentPoolProfile::new(format!("pool{}", i), 1, "Standard_D2_v2"))
        .collect();
    spec.service_principal_profile = Some(ServicePrincipalProfile {
        client_id: "client".into(),
        secret: "secret".into(),
        ..Default::default()
    });
    spec
}

#[test]
fn test_every_catalog_entry_resolves() {
    let catalog = StaticCatalog::new();
    let rationalizer = Rationalizer::new(&catalog);

    for kind in VERSIONED_KINDS {
        for version in catalog.supported_versions(kind, true, false) {
            assert_eq!(
                rationalizer.resolve(kind, "", &version, true, false).as_deref(),
                Some(version.as_str()),
                "{} {}",
                kind,
                version
            );
        }
        for version in catalog.supported_versions(kind, false, false) {
            assert_eq!(rationalizer.resolve(kind, "", &version, false, false), Some(version.clone()));
            assert_eq!(
                rationalizer.resolve(kind, "", &format!("v{}", version), false, false),
                Some(version.clone())
            );

            let release = version.splitn(3, '.').take(2).collect::<Vec<_>>().join(".");
            let latest = rationalizer.resolve(kind, &release, "", false, false);
            assert!(latest.map(|v| !v.is_empty()).unwrap_or(false), "{} {}", kind, release);
        }
        assert!(rationalizer.resolve(kind, "", "", false, false).is_some());
    }
}

#[test]
fn test_unknown_triples_do_not_resolve() {
    let catalog = StaticCatalog::new();
    let rationalizer = Rationalizer::new(&catalog);

    assert_eq!(rationalizer.resolve(OrchestratorKind::Kubernetes, "", "1.2.3", false, false), None);
    assert_eq!(rationalizer.resolve(OrchestratorKind::Kubernetes, "1.3", "", false, false), None);
    assert_eq!(rationalizer.resolve(OrchestratorKind::Kubernetes, "1.17", "1.18.19", false, false), None);
    assert_eq!(rationalizer.resolve(OrchestratorKind::Dcos, "", "1.7.0", false, false), None);
    assert_eq!(rationalizer.resolve(OrchestratorKind::Swarm, "", "", false, false), None);
    assert_eq!(rationalizer.resolve(OrchestratorKind::SwarmMode, "", "", true, false), None);
}

#[test]
fn test_allow_listed_pairs_are_compatible() {
    for (plugin, policy) in ALLOWED_PLUGIN_POLICY_PAIRS {
        assert!(is_plugin_policy_allowed(plugin, policy), "{} + {}", plugin, policy);
    }
    assert!(!is_plugin_policy_allowed(network::PLUGIN_AZURE, network::POLICY_CILIUM));
    assert!(!is_plugin_policy_allowed(network::PLUGIN_KUBENET, network::PLUGIN_KUBENET));
}

#[test]
fn test_dns_service_ip_examples() -> Result<()> {
    let check = |dns_ip: &str| {
        let config = KubernetesConfig {
            service_cidr: "172.99.0.1/16".into(),
            dns_service_ip: dns_ip.into(),
            ..Default::default()
        };
        validate_kubernetes_config(&config, "1.18.19", false, Ipv6Flags::default())
    };

    check("172.99.255.10")?;
    let broadcast = check("172.99.255.255").unwrap_err();
    assert!(broadcast.to_string().contains("cannot be the broadcast address"));
    let first = check("172.99.0.1").unwrap_err();
    assert!(first.to_string().contains("cannot be the first IP"));
    Ok(())
}

#[test]
fn test_password_examples() {
    assert!(!password_complexity("User@123", "User@123"));
    assert!(!password_complexity("azureuser", "123!@#"));
    assert!(password_complexity("azureuser", "Replace_Me_123"));
}

#[test]
fn test_validation_is_idempotent_for_known_specs() {
    let validator = Validator::new();
    let mut invalid = spec_with_pools(2);
    invalid.agent_pool_profiles[1].name = "pool0".into();

    for spec in [spec_with_pools(1), invalid] {
        assert_eq!(validator.validate(&spec, false), validator.validate(&spec, false));
        assert_eq!(validator.validate(&spec, true), validator.validate(&spec, true));
    }
}

proptest! {
    #[test]
    fn prop_matrix_membership(
        plugin in prop::sample::select(network::PLUGIN_VALUES),
        policy in prop::sample::select(network::POLICY_VALUES),
    ) {
        let listed = ALLOWED_PLUGIN_POLICY_PAIRS.iter().any(|(p, q)| *p == plugin && *q == policy);
        prop_assert_eq!(is_plugin_policy_allowed(plugin, policy), listed);
    }

    #[test]
    fn prop_cidr_contains_its_addresses(octets in any::<[u8; 4]>(), prefix in 0u8..=32) {
        let address = Ipv4Addr::from(octets);
        let cidr = parse_cidr(&format!("{}/{}", address, prefix)).unwrap();

        prop_assert!(cidr.contains(IpAddr::V4(address)));
        let broadcast = cidr.broadcast().unwrap();
        prop_assert!(cidr.contains(broadcast));
        prop_assert_eq!(cidr.host_bits(), 32 - prefix);
        if prefix < 32 {
            prop_assert!(cidr.contains(cidr.first_ip()));
        }
    }

    #[test]
    fn prop_cidr_rejects_oversized_prefix(octets in any::<[u8; 4]>(), prefix in 33u16..1000) {
        let address = Ipv4Addr::from(octets);
        let raw = format!("{}/{}", address, prefix);
        prop_assert!(parse_cidr(&raw).is_none());
    }

    #[test]
    fn prop_strong_passwords_accepted(
        upper in "[A-Z]{1,4}",
        lower in "[a-z]{1,4}",
        digits in "[0-9]{1,4}",
        special in "[!@#%&*_+=?]{1,4}",
    ) {
        let password = format!("{}{}{}{}", upper, lower, digits, special);
        prop_assert!(password_complexity("azureuser", &password));
        prop_assert!(!password_complexity(&password, &password));
        prop_assert!(!password_complexity(&password.to_lowercase(), &password));
    }

    #[test]
    fn prop_two_class_passwords_rejected(lower in "[a-z]{1,8}", digits in "[0-9]{1,8}") {
        let password = format!("{}{}", lower, digits);
        prop_assert!(!password_complexity("azureuser", &password));
    }

    #[test]
    fn prop_label_values(value in "[a-zA-Z0-9]([-a-zA-Z0-9_.]{0,61}[a-zA-Z0-9])?") {
        prop_assert!(validate_label_value(&value).is_ok());
        let leading_dash = format!("-{}", value);
        prop_assert!(validate_label_value(&leading_dash).is_err());
    }

    #[test]
    fn prop_pool_names(name in "[a-z][a-z0-9]{0,11}") {
        prop_assert!(validate_pool_name(&name).is_ok());
        prop_assert!(validate_pool_name(&name.to_uppercase()).is_err());
    }

    #[test]
    fn prop_zones_are_all_or_nothing(master_zones in any::<bool>(), pool_zones in prop::collection::vec(any::<bool>(), 1..4)) {
        let mut spec = spec_with_pools(pool_zones.len());
        if master_zones {
            spec.master_profile.availability_zones = vec!["1".into(), "2".into()];
        }
        for (pool, zoned) in spec.agent_pool_profiles.iter_mut().zip(&pool_zones) {
            if *zoned {
                pool.availability_zones = vec!["1".into()];
            }
        }

        let any = master_zones || pool_zones.iter().any(|z| *z);
        let all = master_zones && pool_zones.iter().all(|z| *z);
        let result = Validator::new().validate(&spec, false);
        if any && !all {
            let err = result.unwrap_err();
            prop_assert!(err.to_string().starts_with("Availability Zones need to be defined"));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn prop_validation_is_idempotent(
        dns_prefix in "[a-z0-9-]{0,8}",
        pool_name in "[a-zA-Z0-9]{0,6}",
        count in -1i32..6,
        version in prop::sample::select(vec!["", "1.18.19", "1.14.8", "1.2.3", "v1.17.17"]),
        is_update in any::<bool>(),
    ) {
        let mut spec = spec_with_pools(1);
        spec.master_profile.dns_prefix = dns_prefix;
        spec.master_profile.count = count;
        spec.agent_pool_profiles[0].name = pool_name;
        spec.orchestrator_profile.version = version.to_string();

        let validator = Validator::new();
        let first = validator.validate(&spec, is_update);
        let second = validator.validate(&spec, is_update);
        prop_assert_eq!(first, second);
    }
}
