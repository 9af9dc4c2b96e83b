//! The regkit install engine.
//!
//! Requested names are bound to registries and expanded into a flat item
//! graph ([`resolve_graph`]). Each file of the graph gets a project
//! location ([`PathResolver`]), has its import templates rendered for that
//! location ([`rewrite_imports`]) and is compared with what is already
//! there ([`FileChange`]). Fetching is concurrent; writing is sequential
//! and every overwrite goes through the [`Prompter`] unless the
//! [`OverwriteMode`] decides.

pub mod diff;
pub mod error;
pub mod graph;
pub mod install;
pub mod paths;
pub mod prompt;
pub mod transform;

pub use diff::{FileChange, unified_diff};
pub use error::{Error, Result};
pub use graph::{GraphItem, ItemGraph, RegistryManifest, WantedItem, resolve_graph};
pub use install::{InstallPlan, InstallReport, Installer, PlannedFile};
pub use paths::{ANY_TYPE, PathResolver, ResolvedPath, import_path};
pub use prompt::{NonInteractive, OverwriteMode, OverwriteRequest, Prompter};
pub use transform::{ImportRewrite, rewrite_imports};
