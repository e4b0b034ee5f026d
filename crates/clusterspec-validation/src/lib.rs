//! Cluster Specification Validation
//!
//! A fail-fast validator for container orchestration cluster
//! specifications. Given a decoded [`ClusterSpec`] and whether it describes
//! an update of an existing cluster, the validator either accepts it or
//! returns the single first violation as a [`ValidationError`].
//!
//! ## Pipeline
//!
//! Checks run in a fixed order (see [`engine::rules::ids::PIPELINE`]):
//! cloud location and custom cloud, entity-local field shape, orchestrator
//! version and configuration, master and agent pools, availability zones,
//! Linux profile, addons, extensions, custom VNET, identities, custom
//! component images, Azure Stack support and the Windows profile. The first
//! failing check wins, so the order is observable.
//!
//! Supported orchestrator versions come from a
//! [`VersionCatalog`](clusterspec_core::VersionCatalog); the built-in
//! [`StaticCatalog`](clusterspec_core::StaticCatalog) can be replaced.
//!
//! ## Example
//!
//! ```rust
//! use clusterspec_core::{
//!     AgentPoolProfile, ClusterSpec, MasterProfile, OrchestratorKind, OrchestratorProfile, ServicePrincipalProfile,
//! };
//! use clusterspec_validation::Validator;
//!
//! let mut master = MasterProfile::default();
//! master.count = 1;
//! master.dns_prefix = "mycluster".into();
//! master.vm_size = "Standard_D2_v2".into();
//! let mut spec = ClusterSpec::new(OrchestratorProfile::new(OrchestratorKind::Kubernetes), master);
//! spec.agent_pool_profiles = vec![AgentPoolProfile::new("agentpool1", 3, "Standard_D2_v2")];
//! spec.service_principal_profile = Some(ServicePrincipalProfile {
//!     client_id: "client".into(),
//!     secret: "secret".into(),
//!     ..Default::default()
//! });
//!
//! let validator = Validator::new();
//! assert!(validator.validate(&spec, false).is_ok());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod fields;
pub mod kubernetes_config;
pub mod network;
pub mod primitives;
pub mod version;

pub use config::{ValidatorConfig, ValidatorConfigBuilder};
pub use engine::rules::{PredicateRule, Rule, RuleCategory, RuleContext};
pub use engine::Validator;
pub use error::{ErrorKind, Result, ValidationError};

use clusterspec_core::ClusterSpec;

/// Validate `spec` with the default pipeline and built-in catalog
pub fn validate(spec: &ClusterSpec, is_update: bool) -> Result<()> {
    Validator::new().validate(spec, is_update)
}
