//! Data model shared by the regkit build and install engines.
//!
//! A registry author declares items in a [`RegistryConfig`]; the build
//! engine turns those declarations into [`ResolvedItem`]s and serializes
//! them as a [`Manifest`], which the install engine later reads back.

pub mod config;
pub mod dependency;
pub mod error;
pub mod import;
pub mod item;
pub mod manifest;
pub mod name;

/// The canonical filename of a built registry manifest.
pub const MANIFEST_FILENAME: &str = "registry.json";

/// The file stem of a registry author configuration (`registry.config.toml`,
/// `registry.config.json`, ...).
pub const REGISTRY_CONFIG_STEM: &str = "registry.config";

pub use config::{RegistryConfig, RuleLevel, RuleSetting};
pub use dependency::{RemoteDependency, merge_dependencies};
pub use error::{Error, Result};
pub use import::UnresolvedImport;
pub use item::{AddPolicy, FileDeclaration, FileRole, RegistryItem, ResolutionMode};
pub use manifest::{Manifest, PluginRequirement, ResolvedFile, ResolvedItem};
pub use name::validate_item_name;
