//! Cloud target, feature flags and cluster extensions

use serde::{Deserialize, Serialize};

use crate::constants::cloud;

/// A non-public cloud target, such as Azure Stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomCloudProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<CloudEnvironment>,
    pub identity_system: String,
    pub authentication_method: String,
    pub dependencies_location: String,
    #[serde(rename = "portalURL")]
    pub portal_url: String,
    pub custom_cloud_root_certificates: String,
    pub custom_cloud_sources_list: String,
}

impl CustomCloudProfile {
    /// Absent or empty environment names count as Azure Stack
    pub fn is_azure_stack(&self) -> bool {
        match &self.environment {
            None => true,
            Some(env) => env.name.is_empty() || env.name.eq_ignore_ascii_case(cloud::AZURE_STACK_CLOUD),
        }
    }
}

/// Endpoints of a cloud environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudEnvironment {
    pub name: String,
    #[serde(rename = "managementPortalURL")]
    pub management_portal_url: String,
    pub resource_manager_endpoint: String,
    pub active_directory_endpoint: String,
    pub service_management_endpoint: String,
}

/// Preview features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    #[serde(rename = "enableCSERunInBackground")]
    pub enable_cse_run_in_background: bool,
    pub block_outbound_internet: bool,
    #[serde(rename = "enableIPv6DualStack")]
    pub enable_ipv6_dual_stack: bool,
    pub enable_telemetry: bool,
    #[serde(rename = "enableIPv6Only")]
    pub enable_ipv6_only: bool,
}

/// A cluster extension that node profiles may reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionProfile {
    pub name: String,
    pub version: String,
    pub extension_parameters: String,
    #[serde(rename = "parametersKeyvaultSecretRef", skip_serializing_if = "Option::is_none")]
    pub extension_parameters_key_vault_ref: Option<super::KeyvaultSecretRef>,
    #[serde(rename = "rootURL")]
    pub root_url: String,
    pub script: String,
    #[serde(rename = "urlQuery")]
    pub url_query: String,
}
