//! Rule framework for cluster specification validation
//!
//! A rule inspects the whole specification and either passes or returns
//! the single violation it found. The engine walks rules in registration
//! order and stops at the first failure, so the order of
//! [`default_rules`] is part of the validator's contract.

pub mod addons;
pub mod agent_pools;
pub mod cloud;
pub mod components;
pub mod extensions;
pub mod identity;
pub mod linux;
pub mod master;
pub mod orchestrator;
pub mod vnet;
pub mod windows;
pub mod zones;

use std::fmt;
use std::sync::Arc;

use clusterspec_core::{ClusterSpec, KubernetesConfig, OrchestratorKind, VersionCatalog};
use serde::{Deserialize, Serialize};

use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::version::Rationalizer;

/// Categories of validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Cloud environment and location
    Cloud,
    /// Entity-local required fields and ranges
    Structure,
    /// Orchestrator version and configuration
    Orchestrator,
    /// Master and agent pool layout, zones, networks
    Topology,
    /// Credentials and identities
    Access,
    /// Addons and VM extensions
    Addons,
    /// Custom component images and registries
    Components,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Cloud => write!(f, "cloud"),
            RuleCategory::Structure => write!(f, "structure"),
            RuleCategory::Orchestrator => write!(f, "orchestrator"),
            RuleCategory::Topology => write!(f, "topology"),
            RuleCategory::Access => write!(f, "access"),
            RuleCategory::Addons => write!(f, "addons"),
            RuleCategory::Components => write!(f, "components"),
        }
    }
}

/// Context provided to rules during evaluation
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// The specification being validated
    pub spec: &'a ClusterSpec,
    /// Whether the specification describes an upgrade or scale of an existing cluster
    pub is_update: bool,
    /// Supported orchestrator versions
    pub catalog: &'a dyn VersionCatalog,
    pub config: &'a ValidatorConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        spec: &'a ClusterSpec,
        is_update: bool,
        catalog: &'a dyn VersionCatalog,
        config: &'a ValidatorConfig,
    ) -> Self {
        Self {
            spec,
            is_update,
            catalog,
            config,
        }
    }

    pub fn rationalizer(&self) -> Rationalizer<'a> {
        Rationalizer::new(self.catalog)
    }

    /// Whether advisory warnings should be logged
    pub fn warnings_enabled(&self) -> bool {
        self.config.emit_warnings
    }

    pub fn kind(&self) -> OrchestratorKind {
        self.spec.orchestrator_profile.kind
    }

    pub fn is_kubernetes(&self) -> bool {
        self.kind().is_kubernetes()
    }

    pub fn kubernetes_config(&self) -> Option<&'a KubernetesConfig> {
        self.spec.orchestrator_profile.kubernetes_config.as_ref()
    }

    /// The version exactly as supplied by the user
    pub fn raw_version(&self) -> &'a str {
        &self.spec.orchestrator_profile.version
    }

    /// The release exactly as supplied by the user
    pub fn raw_release(&self) -> &'a str {
        &self.spec.orchestrator_profile.release
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("kind", &self.kind())
            .field("is_update", &self.is_update)
            .field("config", self.config)
            .finish()
    }
}

/// Trait for implementing validation rules
///
/// Rules are deterministic and never modify the specification. Each rule
/// covers one validation stage and reports at most one violation.
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &str;

    /// Human-readable name for this rule
    fn name(&self) -> &str;

    /// Description of what this rule validates
    fn description(&self) -> &str;

    fn category(&self) -> RuleCategory;

    /// Check if this rule is applicable to the given context
    fn is_applicable(&self, _context: &RuleContext<'_>) -> bool {
        true
    }

    /// Check the specification, returning the first violation found
    fn check(&self, context: &RuleContext<'_>) -> Result<()>;
}

/// A boxed rule for dynamic dispatch
pub type BoxedRule = Box<dyn Rule>;

type CheckFn = fn(&RuleContext<'_>) -> Result<()>;
type ApplicableFn = fn(&RuleContext<'_>) -> bool;

/// A rule backed by a plain function
pub struct PredicateRule {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: RuleCategory,
    applies: Option<ApplicableFn>,
    check: CheckFn,
}

impl PredicateRule {
    pub fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: RuleCategory,
        check: CheckFn,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            applies: None,
            check,
        }
    }

    /// Restrict the rule to contexts accepted by `applies`
    pub fn applies_when(mut self, applies: ApplicableFn) -> Self {
        self.applies = Some(applies);
        self
    }
}

impl Rule for PredicateRule {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn category(&self) -> RuleCategory {
        self.category
    }

    fn is_applicable(&self, context: &RuleContext<'_>) -> bool {
        self.applies.map(|applies| applies(context)).unwrap_or(true)
    }

    fn check(&self, context: &RuleContext<'_>) -> Result<()> {
        (self.check)(context)
    }
}

fn kubernetes_only(context: &RuleContext<'_>) -> bool {
    context.is_kubernetes()
}

fn field_shape(context: &RuleContext<'_>) -> Result<()> {
    crate::fields::validate_fields(context.spec)
}

/// Rule identifiers in pipeline order
pub mod ids {
    pub const LOCATION: &str = "location";
    pub const CUSTOM_CLOUD_PROFILE: &str = "custom-cloud-profile";
    pub const FIELD_SHAPE: &str = "field-shape";
    pub const ORCHESTRATOR_PROFILE: &str = "orchestrator-profile";
    pub const MASTER_PROFILE: &str = "master-profile";
    pub const AGENT_POOL_PROFILES: &str = "agent-pool-profiles";
    pub const ZONES: &str = "zones";
    pub const LINUX_PROFILE: &str = "linux-profile";
    pub const ADDONS: &str = "addons";
    pub const EXTENSIONS: &str = "extensions";
    pub const VNET: &str = "vnet";
    pub const SERVICE_PRINCIPAL: &str = "service-principal";
    pub const MANAGED_IDENTITY: &str = "managed-identity";
    pub const AAD_PROFILE: &str = "aad-profile";
    pub const CUSTOM_KUBE_COMPONENTS: &str = "custom-kube-components";
    pub const PRIVATE_REGISTRY: &str = "private-registry";
    pub const AZURE_STACK: &str = "azure-stack";
    pub const WINDOWS_PROFILE: &str = "windows-profile";

    /// Every stage of the default pipeline, in evaluation order
    pub const PIPELINE: &[&str] = &[
        LOCATION,
        CUSTOM_CLOUD_PROFILE,
        FIELD_SHAPE,
        ORCHESTRATOR_PROFILE,
        MASTER_PROFILE,
        AGENT_POOL_PROFILES,
        ZONES,
        LINUX_PROFILE,
        ADDONS,
        EXTENSIONS,
        VNET,
        SERVICE_PRINCIPAL,
        MANAGED_IDENTITY,
        AAD_PROFILE,
        CUSTOM_KUBE_COMPONENTS,
        PRIVATE_REGISTRY,
        AZURE_STACK,
        WINDOWS_PROFILE,
    ];
}

/// The fixed validation pipeline
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    use RuleCategory::*;

    vec![
        Arc::new(PredicateRule::new(
            ids::LOCATION,
            "Location",
            "Azure Stack clouds require a location",
            Cloud,
            cloud::check_location,
        )),
        Arc::new(PredicateRule::new(
            ids::CUSTOM_CLOUD_PROFILE,
            "Custom cloud profile",
            "Portal URL, authentication, identity system and dependencies location of a custom cloud",
            Cloud,
            cloud::check_custom_cloud_profile,
        )),
        Arc::new(PredicateRule::new(
            ids::FIELD_SHAPE,
            "Field shape",
            "Required fields, ranges and enumerations of each profile",
            Structure,
            field_shape,
        )),
        Arc::new(PredicateRule::new(
            ids::ORCHESTRATOR_PROFILE,
            "Orchestrator profile",
            "Orchestrator version support, KubernetesConfig and container runtime",
            Orchestrator,
            orchestrator::check_orchestrator_profile,
        )),
        Arc::new(PredicateRule::new(
            ids::MASTER_PROFILE,
            "Master profile",
            "Master topology, image, distro and DNS prefix",
            Topology,
            master::check_master_profile,
        )),
        Arc::new(PredicateRule::new(
            ids::AGENT_POOL_PROFILES,
            "Agent pool profiles",
            "Per-pool names, OS, networking, storage and availability",
            Topology,
            agent_pools::check_agent_pool_profiles,
        )),
        Arc::new(
            PredicateRule::new(
                ids::ZONES,
                "Availability zones",
                "Zones are declared by all profiles or none",
                Topology,
                zones::check_zones,
            )
            .applies_when(kubernetes_only),
        ),
        Arc::new(PredicateRule::new(
            ids::LINUX_PROFILE,
            "Linux profile",
            "SSH public keys and keyvault secrets",
            Access,
            linux::check_linux_profile,
        )),
        Arc::new(PredicateRule::new(
            ids::ADDONS,
            "Addons",
            "Addon data, modes and per-addon preconditions",
            Addons,
            addons::check_addons,
        )),
        Arc::new(PredicateRule::new(
            ids::EXTENSIONS,
            "Extensions",
            "Agent pool VM extensions and extension keyvault references",
            Addons,
            extensions::check_extensions,
        )),
        Arc::new(PredicateRule::new(
            ids::VNET,
            "Custom VNET",
            "Custom subnets are homogeneous and reference one VNET",
            Topology,
            vnet::check_vnet,
        )),
        Arc::new(
            PredicateRule::new(
                ids::SERVICE_PRINCIPAL,
                "Service principal",
                "Kubernetes without managed identity needs a service principal",
                Access,
                identity::check_service_principal,
            )
            .applies_when(kubernetes_only),
        ),
        Arc::new(
            PredicateRule::new(
                ids::MANAGED_IDENTITY,
                "Managed identity",
                "Managed identity version requirements",
                Access,
                identity::check_managed_identity,
            )
            .applies_when(kubernetes_only),
        ),
        Arc::new(PredicateRule::new(
            ids::AAD_PROFILE,
            "AAD profile",
            "AAD integration identifiers",
            Access,
            identity::check_aad_profile,
        )),
        Arc::new(PredicateRule::new(
            ids::CUSTOM_KUBE_COMPONENTS,
            "Custom kube components",
            "Custom component images match the Kubernetes version",
            Components,
            components::check_custom_kube_components,
        )),
        Arc::new(PredicateRule::new(
            ids::PRIVATE_REGISTRY,
            "Private registry",
            "A private registry needs custom component images",
            Components,
            components::check_private_registry,
        )),
        Arc::new(
            PredicateRule::new(
                ids::AZURE_STACK,
                "Azure Stack support",
                "Network plugin and availability profiles supported on Azure Stack",
                Cloud,
                cloud::check_azure_stack_support,
            )
            .applies_when(kubernetes_only),
        ),
        Arc::new(PredicateRule::new(
            ids::WINDOWS_PROFILE,
            "Windows profile",
            "Windows version support, credentials, secrets and CSI proxy",
            Access,
            windows::check_windows_profile,
        )),
    ]
}
