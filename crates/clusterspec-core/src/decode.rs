//! Decoding of in-memory specification documents

use tracing::debug;

use crate::error::Result;
use crate::model::ClusterSpec;

/// Decode a JSON document
pub fn from_json_str(document: &str) -> Result<ClusterSpec> {
    let spec: ClusterSpec = serde_json::from_str(document)?;
    debug!(
        orchestrator = %spec.orchestrator_profile.kind,
        agent_pools = spec.agent_pool_profiles.len(),
        "Decoded JSON cluster specification"
    );
    Ok(spec)
}

/// Decode a YAML document
pub fn from_yaml_str(document: &str) -> Result<ClusterSpec> {
    let spec: ClusterSpec = serde_yaml::from_str(document)?;
    debug!(
        orchestrator = %spec.orchestrator_profile.kind,
        agent_pools = spec.agent_pool_profiles.len(),
        "Decoded YAML cluster specification"
    );
    Ok(spec)
}
