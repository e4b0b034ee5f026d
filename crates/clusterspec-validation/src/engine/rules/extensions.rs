//! VM extension rule

use clusterspec_core::constants::availability;

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::primitives::is_keyvault_id;

const PROMETHEUS_GRAFANA: &str = "prometheus-grafana-k8s";

pub fn check_extensions(context: &RuleContext<'_>) -> Result<()> {
    let spec = context.spec;

    for pool in &spec.agent_pool_profiles {
        if pool.extensions.is_empty() {
            continue;
        }
        if pool.availability_profile.is_empty() || pool.is_vmss() {
            return Err(ValidationError::unsupported(format!(
                "Extensions are currently not supported with VirtualMachineScaleSets. Please specify \"availabilityProfile\": \"{}\"",
                availability::AVAILABILITY_SET
            )));
        }
        if pool.is_windows() && pool.extensions.iter().any(|e| e.name == PROMETHEUS_GRAFANA) {
            return Err(ValidationError::unsupported(
                "prometheus-grafana-k8s extension is currently not supported for Windows agents",
            ));
        }
    }

    for extension in &spec.extension_profiles {
        let Some(secret_ref) = &extension.extension_parameters_key_vault_ref else {
            continue;
        };
        if secret_ref.vault_id.is_empty() {
            return Err(ValidationError::structural(format!(
                "the Keyvault ID must be specified for Extension {}",
                extension.name
            )));
        }
        if secret_ref.secret_name.is_empty() {
            return Err(ValidationError::structural(format!(
                "the Keyvault Secret must be specified for Extension {}",
                extension.name
            )));
        }
        if !is_keyvault_id(&secret_ref.vault_id) {
            return Err(ValidationError::structural(format!(
                "Extension {}'s keyvault secret reference is of incorrect format",
                extension.name
            )));
        }
    }
    Ok(())
}
