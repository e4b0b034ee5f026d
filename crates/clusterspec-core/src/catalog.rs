//! Supported orchestrator versions
//!
//! The validation engine never hard-codes versions; it asks a
//! [`VersionCatalog`]. [`StaticCatalog`] ships the built-in table and can be
//! replaced wholesale from a TOML document:
//!
//! ```toml
//! [kubernetes]
//! default_release = "1.18"
//!
//! [[kubernetes.versions]]
//! version = "1.18.19"
//! windows = true
//!
//! [[kubernetes.versions]]
//! version = "1.17.16"
//! creatable = false
//! ```
//!
//! There is a single table per orchestrator kind. Azure Stack clouds resolve
//! against the same table; a deployment with a different Azure Stack version
//! set supplies its own catalog through `Validator::with_catalog`.

use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::model::OrchestratorKind;

/// Source of supported versions per orchestrator kind
pub trait VersionCatalog: Send + Sync {
    /// Versions accepted for the kind, ascending by semver.
    ///
    /// Outside update mode only creatable entries are returned. With
    /// `windows` the list is restricted to Windows-capable entries.
    fn supported_versions(&self, kind: OrchestratorKind, is_update: bool, windows: bool) -> Vec<String>;

    /// The major.minor release used when a document names neither release nor version
    fn default_release(&self, kind: OrchestratorKind) -> Option<String>;

    /// Highest supported patch of `release`
    fn latest_patch_for_minor(
        &self,
        kind: OrchestratorKind,
        release: &str,
        is_update: bool,
        windows: bool,
    ) -> Option<String> {
        latest_patch(release, &self.supported_versions(kind, is_update, windows))
    }

    /// Latest creatable patch of the default release
    fn default_version(&self, kind: OrchestratorKind, windows: bool) -> Option<String> {
        let release = self.default_release(kind)?;
        self.latest_patch_for_minor(kind, &release, false, windows)
    }
}

/// Highest version in `versions` whose major.minor equals `release`
pub fn latest_patch(release: &str, versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter_map(|raw| Version::parse(raw).ok().map(|parsed| (parsed, raw)))
        .filter(|(parsed, _)| format!("{}.{}", parsed.major, parsed.minor) == release)
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.clone())
}

fn default_creatable() -> bool {
    true
}

/// One catalog version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub version: String,
    /// New clusters may be created at this version
    #[serde(default = "default_creatable")]
    pub creatable: bool,
    /// Windows agent pools are supported at this version
    #[serde(default)]
    pub windows: bool,
}

impl CatalogEntry {
    pub fn new(version: impl Into<String>, creatable: bool, windows: bool) -> Self {
        Self {
            version: version.into(),
            creatable,
            windows,
        }
    }
}

/// Default release and known versions of one orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorReleases {
    #[serde(default)]
    pub default_release: String,
    #[serde(default)]
    pub versions: Vec<CatalogEntry>,
}

impl OrchestratorReleases {
    fn check(&self, kind: OrchestratorKind) -> Result<(), CatalogError> {
        for entry in &self.versions {
            Version::parse(&entry.version).map_err(|_| CatalogError::invalid_version(kind.as_str(), &entry.version))?;
        }
        if !self.versions.is_empty() && !is_major_minor(&self.default_release) {
            return Err(CatalogError::invalid_release(kind.as_str(), &self.default_release));
        }
        Ok(())
    }
}

fn is_major_minor(release: &str) -> bool {
    let mut parts = release.split('.');
    let numeric = |part: Option<&str>| part.map(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit())).unwrap_or(false);
    numeric(parts.next()) && numeric(parts.next()) && parts.next().is_none()
}

/// In-memory catalog for Kubernetes and DCOS; Swarm kinds have no versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    pub kubernetes: OrchestratorReleases,
    #[serde(default)]
    pub dcos: OrchestratorReleases,
}

// (version, creatable)
const KUBERNETES_VERSIONS: &[(&str, bool)] = &[
    ("1.6.9", false),
    ("1.7.16", false),
    ("1.8.15", false),
    ("1.9.11", false),
    ("1.10.13", false),
    ("1.11.10", false),
    ("1.12.8", false),
    ("1.13.12", false),
    ("1.14.8", false),
    ("1.15.11", false),
    ("1.15.12", true),
    ("1.16.14", false),
    ("1.16.15", true),
    ("1.17.16", false),
    ("1.17.17", true),
    ("1.18.0-beta.1", false),
    ("1.18.18", false),
    ("1.18.19", true),
    ("1.19.15", false),
    ("1.19.16", true),
    ("1.20.15", true),
    ("1.21.14", true),
];

const KUBERNETES_DEFAULT_RELEASE: &str = "1.18";

/// First minor with Windows node support in the built-in table
const KUBERNETES_WINDOWS_MIN: (u64, u64) = (1, 15);

const DCOS_VERSIONS: &[&str] = &["1.8.8", "1.9.0", "1.9.8", "1.10.0", "1.11.0", "1.11.2"];

const DCOS_DEFAULT_RELEASE: &str = "1.11";

impl Default for StaticCatalog {
    fn default() -> Self {
        let kubernetes = KUBERNETES_VERSIONS
            .iter()
            .map(|(version, creatable)| {
                let windows = Version::parse(version)
                    .map(|v| (v.major, v.minor) >= KUBERNETES_WINDOWS_MIN)
                    .unwrap_or(false);
                CatalogEntry::new(*version, *creatable, windows)
            })
            .collect();
        let dcos = DCOS_VERSIONS
            .iter()
            .map(|version| CatalogEntry::new(*version, true, false))
            .collect();

        Self {
            kubernetes: OrchestratorReleases {
                default_release: KUBERNETES_DEFAULT_RELEASE.to_string(),
                versions: kubernetes,
            },
            dcos: OrchestratorReleases {
                default_release: DCOS_DEFAULT_RELEASE.to_string(),
                versions: dcos,
            },
        }
    }
}

impl StaticCatalog {
    /// The built-in table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from TOML text
    pub fn from_toml_str(document: &str) -> Result<Self, CatalogError> {
        let catalog: StaticCatalog = toml::from_str(document)?;
        catalog.kubernetes.check(OrchestratorKind::Kubernetes)?;
        catalog.dcos.check(OrchestratorKind::Dcos)?;
        debug!(
            kubernetes_versions = catalog.kubernetes.versions.len(),
            dcos_versions = catalog.dcos.versions.len(),
            "Loaded version catalog"
        );
        Ok(catalog)
    }

    /// Replace the default release for a kind
    pub fn with_default_release(mut self, kind: OrchestratorKind, release: impl Into<String>) -> Result<Self, CatalogError> {
        let release = release.into();
        if !is_major_minor(&release) {
            return Err(CatalogError::invalid_release(kind.as_str(), release));
        }
        if let Some(releases) = self.releases_mut(kind) {
            releases.default_release = release;
        }
        Ok(self)
    }

    pub fn releases(&self, kind: OrchestratorKind) -> Option<&OrchestratorReleases> {
        match kind {
            OrchestratorKind::Kubernetes => Some(&self.kubernetes),
            OrchestratorKind::Dcos => Some(&self.dcos),
            OrchestratorKind::Swarm | OrchestratorKind::SwarmMode => None,
        }
    }

    fn releases_mut(&mut self, kind: OrchestratorKind) -> Option<&mut OrchestratorReleases> {
        match kind {
            OrchestratorKind::Kubernetes => Some(&mut self.kubernetes),
            OrchestratorKind::Dcos => Some(&mut self.dcos),
            OrchestratorKind::Swarm | OrchestratorKind::SwarmMode => None,
        }
    }
}

impl VersionCatalog for StaticCatalog {
    fn supported_versions(&self, kind: OrchestratorKind, is_update: bool, windows: bool) -> Vec<String> {
        let Some(releases) = self.releases(kind) else {
            return Vec::new();
        };
        let mut versions: Vec<(Version, String)> = releases
            .versions
            .iter()
            .filter(|entry| is_update || entry.creatable)
            .filter(|entry| !windows || entry.windows)
            .filter_map(|entry| Version::parse(&entry.version).ok().map(|v| (v, entry.version.clone())))
            .collect();
        versions.sort_by(|(a, _), (b, _)| a.cmp(b));
        versions.into_iter().map(|(_, raw)| raw).collect()
    }

    fn default_release(&self, kind: OrchestratorKind) -> Option<String> {
        self.releases(kind)
            .map(|releases| releases.default_release.clone())
            .filter(|release| !release.is_empty())
    }
}
