//! Custom component image rules
//!
//! Kubernetes 1.17 replaced the single hyperkube image with per-component
//! images; a document may only use the form its requested version consumes.

use super::RuleContext;
use crate::error::{Result, ValidationError};
use crate::version::is_version_ge;

const PER_COMPONENT_MIN: &str = "1.17.0";

pub fn check_custom_kube_components(context: &RuleContext<'_>) -> Result<()> {
    let Some(config) = context.kubernetes_config() else {
        return Ok(());
    };

    if is_version_ge(context.raw_version(), PER_COMPONENT_MIN) {
        if !config.custom_hyperkube_image.is_empty() {
            return Err(ValidationError::version(
                "customHyperkubeImage has no effect in Kubernetes version 1.17.0 or above",
            ));
        }
    } else if config.is_using_custom_kube_components() {
        return Err(ValidationError::version(
            "customKubeAPIServerImage, customKubeControllerManagerImage, customKubeProxyImage, customKubeSchedulerImage or customKubeBinaryURL have no effect in Kubernetes version 1.16 or earlier",
        ));
    }
    Ok(())
}

pub fn check_private_registry(context: &RuleContext<'_>) -> Result<()> {
    let Some(config) = context.kubernetes_config() else {
        return Ok(());
    };
    if config.private_azure_registry_server.is_empty() {
        return Ok(());
    }

    if is_version_ge(context.raw_version(), PER_COMPONENT_MIN) {
        if !config.is_using_custom_kube_components() {
            return Err(ValidationError::structural(
                "customKubeAPIServerImage, customKubeControllerManagerImage, customKubeProxyImage or customKubeSchedulerImage must be provided when privateAzureRegistryServer is provided",
            ));
        }
    } else if config.custom_hyperkube_image.is_empty() {
        return Err(ValidationError::structural(
            "customHyperkubeImage must be provided when privateAzureRegistryServer is provided",
        ));
    }
    Ok(())
}
