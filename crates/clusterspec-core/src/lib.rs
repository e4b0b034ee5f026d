//! Cluster specification model
//!
//! This crate holds the in-memory graph that describes a container
//! orchestration cluster, together with the collaborators the validation
//! engine consumes:
//!
//! - [`model`] - the specification entities (orchestrator, master, agent pools, identities)
//! - [`decode`] - JSON/YAML decoding of an already-loaded document
//! - [`catalog`] - the supported orchestrator version table
//! - [`constants`] - literal values shared by the model and the validators
//! - [`skus`] - VM size capability tables

pub mod catalog;
pub mod constants;
pub mod decode;
pub mod error;
pub mod model;
pub mod skus;
pub mod toggle;

pub use catalog::{CatalogEntry, OrchestratorReleases, StaticCatalog, VersionCatalog};
pub use error::{CatalogError, DecodeError};
pub use model::*;
pub use toggle::Toggle;
