//! Orchestrator version rationalization
//!
//! Resolves a user supplied (release, version) pair against a
//! [`VersionCatalog`] to one concrete supported version.

use clusterspec_core::{catalog::latest_patch, OrchestratorKind, VersionCatalog};
use semver::Version;
use tracing::trace;

use crate::error::{Result, ValidationError};

/// Parse a version, treating anything unparsable as 0.0.0
pub fn parse_or_zero(raw: &str) -> Version {
    Version::parse(raw).unwrap_or_else(|_| Version::new(0, 0, 0))
}

/// `actual >= min` in semver order, pre-releases included
pub fn is_version_ge(actual: &str, min: &str) -> bool {
    parse_or_zero(actual) >= parse_or_zero(min)
}

fn strip_v(raw: &str) -> &str {
    raw.strip_prefix('v').unwrap_or(raw)
}

/// Version resolution against a catalog
#[derive(Clone, Copy)]
pub struct Rationalizer<'a> {
    catalog: &'a dyn VersionCatalog,
}

impl<'a> Rationalizer<'a> {
    pub fn new(catalog: &'a dyn VersionCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve to a supported version; `None` means unsupported
    pub fn resolve(
        &self,
        kind: OrchestratorKind,
        release: &str,
        version: &str,
        is_update: bool,
        windows: bool,
    ) -> Option<String> {
        let release = strip_v(release);
        let version = strip_v(version);
        let supported = self.catalog.supported_versions(kind, is_update, windows);
        if supported.is_empty() {
            return None;
        }

        let resolved = match (release.is_empty(), version.is_empty()) {
            (true, true) => self.catalog.default_version(kind, windows),
            (false, true) => latest_patch(release, &supported),
            (true, false) => supported.iter().find(|v| *v == version).cloned(),
            (false, false) => supported
                .iter()
                .find(|v| {
                    *v == version
                        && Version::parse(v)
                            .map(|sv| format!("{}.{}", sv.major, sv.minor) == release)
                            .unwrap_or(false)
                })
                .cloned(),
        };
        trace!(%kind, release, version, is_update, windows, resolved = ?resolved, "Rationalized version");
        resolved
    }

    /// Accept an exact version or, failing that, the latest patch of its minor
    pub fn valid_patch_version(
        &self,
        kind: OrchestratorKind,
        version: &str,
        is_update: bool,
        windows: bool,
    ) -> Option<String> {
        if version.is_empty() {
            return self.resolve(kind, "", "", is_update, windows);
        }
        if let Some(exact) = self.resolve(kind, "", version, is_update, windows) {
            return Some(exact);
        }
        let parsed = Version::parse(strip_v(version)).ok()?;
        let release = format!("{}.{}", parsed.major, parsed.minor);
        self.resolve(kind, &release, "", is_update, windows)
    }

    /// Whether the resolved creatable version is at least `min`
    pub fn is_valid_min_version(
        &self,
        kind: OrchestratorKind,
        release: &str,
        version: &str,
        min: &str,
    ) -> Result<bool> {
        let resolved = self.resolve(kind, release, version, false, false).ok_or_else(|| {
            ValidationError::version(format!(
                "the following user supplied OrchestratorProfile configuration is not supported: OrchestratorType: {}, OrchestratorRelease: {}, OrchestratorVersion: {}. Please check supported Release or Version for this build of aks-engine",
                kind, release, version
            ))
        })?;
        let resolved = Version::parse(&resolved)
            .map_err(|_| ValidationError::version(format!("could not validate version {}", resolved)))?;
        Ok(resolved >= parse_or_zero(min))
    }
}
