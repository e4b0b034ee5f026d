//! Validation engine
//!
//! The [`Validator`] owns the ordered rule pipeline, the version catalog and
//! the validator configuration. Validation walks the pipeline and returns
//! the first violation; the specification is never modified.

pub mod rules;

use std::sync::Arc;

use clusterspec_core::{CatalogError, ClusterSpec, OrchestratorKind, StaticCatalog, VersionCatalog};
use tracing::{debug, trace};

use crate::config::ValidatorConfig;
use crate::error::Result;
use rules::{BoxedRule, Rule, RuleCategory, RuleContext};

/// Fail-fast validator for cluster specifications
pub struct Validator {
    /// Rules in evaluation order
    rules: Vec<Arc<dyn Rule>>,
    catalog: Arc<dyn VersionCatalog>,
    config: ValidatorConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a validator with the default pipeline and the built-in catalog
    pub fn new() -> Self {
        Self {
            rules: rules::default_rules(),
            catalog: Arc::new(StaticCatalog::new()),
            config: ValidatorConfig::default(),
        }
    }

    /// Create a validator with the default pipeline and custom configuration
    ///
    /// Default release overrides are applied to the built-in catalog and
    /// rejected when they are not a `major.minor` pair.
    pub fn with_config(config: ValidatorConfig) -> std::result::Result<Self, CatalogError> {
        let mut catalog = StaticCatalog::new();
        if let Some(release) = &config.kubernetes_default_release {
            catalog = catalog.with_default_release(OrchestratorKind::Kubernetes, release.as_str())?;
        }
        if let Some(release) = &config.dcos_default_release {
            catalog = catalog.with_default_release(OrchestratorKind::Dcos, release.as_str())?;
        }
        Ok(Self {
            rules: rules::default_rules(),
            catalog: Arc::new(catalog),
            config,
        })
    }

    /// Create a validator with no rules
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            catalog: Arc::new(StaticCatalog::new()),
            config: ValidatorConfig::default(),
        }
    }

    /// Replace the version catalog
    pub fn with_catalog(mut self, catalog: Arc<dyn VersionCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Append a rule to the end of the pipeline
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn register_boxed(&mut self, rule: BoxedRule) {
        self.rules.push(Arc::from(rule));
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Get rules by category
    pub fn rules_by_category(&self, category: RuleCategory) -> Vec<Arc<dyn Rule>> {
        self.rules
            .iter()
            .filter(|r| r.category() == category)
            .cloned()
            .collect()
    }

    pub fn catalog(&self) -> &dyn VersionCatalog {
        self.catalog.as_ref()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a specification
    ///
    /// `is_update` relaxes version checks for upgrades and scale operations
    /// of an existing cluster. The same input always produces the same
    /// result.
    pub fn validate(&self, spec: &ClusterSpec, is_update: bool) -> Result<()> {
        let context = RuleContext::new(spec, is_update, self.catalog.as_ref(), &self.config);
        debug!(
            orchestrator = %context.kind(),
            is_update,
            rules = self.rules.len(),
            "Validating cluster specification"
        );

        for rule in &self.rules {
            if !rule.is_applicable(&context) {
                trace!(rule = rule.id(), "Skipping inapplicable rule");
                continue;
            }
            trace!(rule = rule.id(), category = %rule.category(), "Evaluating rule");
            if let Err(err) = rule.check(&context) {
                debug!(rule = rule.id(), kind = %err.kind(), error = %err, "Validation failed");
                return Err(err);
            }
        }

        debug!("Cluster specification is valid");
        Ok(())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.iter().map(|r| r.id()).collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use clusterspec_core::{
        AgentPoolProfile, MasterProfile, OrchestratorProfile, ServicePrincipalProfile,
    };
    use rules::PredicateRule;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn minimal_spec() -> ClusterSpec {
        let mut master = MasterProfile::default();
        master.count = 1;
        master.dns_prefix = "mycluster".into();
        master.vm_size = "Standard_D2_v2".into();
        let mut spec = ClusterSpec::new(OrchestratorProfile::new(OrchestratorKind::Kubernetes), master);
        spec.agent_pool_profiles = vec![AgentPoolProfile::new("agentpool1", 3, "Standard_D2_v2")];
        spec.service_principal_profile = Some(ServicePrincipalProfile {
            client_id: "client".into(),
            secret: "secret".into(),
            ..Default::default()
        });
        spec
    }

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn always_fails(_: &RuleContext<'_>) -> Result<()> {
        Err(ValidationError::structural("first"))
    }

    fn counts_calls(_: &RuleContext<'_>) -> Result<()> {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[test]
    fn test_empty_validator() {
        let validator = Validator::empty();
        assert!(validator.rules().is_empty());
        assert!(validator.validate(&minimal_spec(), false).is_ok());
    }

    #[test]
    fn test_default_validator_has_pipeline() {
        let validator = Validator::new();
        assert_eq!(validator.rules().len(), rules::ids::PIPELINE.len());
        assert_eq!(validator.rules_by_category(RuleCategory::Components).len(), 2);
    }

    #[test]
    fn test_minimal_spec_is_valid() {
        let validator = Validator::new();
        assert!(validator.validate(&minimal_spec(), false).is_ok());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let validator = Validator::new();
        let mut spec = minimal_spec();
        spec.master_profile.dns_prefix = "1-bad".into();

        let first = validator.validate(&spec, false);
        let second = validator.validate(&spec, false);
        assert!(first.is_err());
        assert_eq!(first, second);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let mut validator = Validator::empty();
        validator.register(Arc::new(PredicateRule::new(
            "fails",
            "Fails",
            "Always fails",
            RuleCategory::Structure,
            always_fails,
        )));
        validator.register_boxed(Box::new(PredicateRule::new(
            "counts",
            "Counts",
            "Counts invocations",
            RuleCategory::Structure,
            counts_calls,
        )));

        let before = CALLS.load(Ordering::SeqCst);
        let err = validator.validate(&minimal_spec(), false).unwrap_err();
        assert_eq!(err.to_string(), "first");
        assert_eq!(CALLS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_with_config_overrides_default_release() {
        let config = ValidatorConfig::builder().kubernetes_default_release("1.17").build();
        let validator = Validator::with_config(config).unwrap();
        assert_eq!(
            validator.catalog().default_version(OrchestratorKind::Kubernetes, false).as_deref(),
            Some("1.17.17")
        );

        let config = ValidatorConfig::builder().kubernetes_default_release("latest").build();
        assert!(Validator::with_config(config).is_err());
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }
}
