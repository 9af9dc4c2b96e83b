//! Shared test fixtures for the regkit workspace.
//!
//! A dev-dependency only, never published.
//!
//! - [`registry`]: [`TestRegistry`], a registry source tree
//! - [`project`]: [`TestProject`], a consumer project

pub mod project;
pub mod registry;

pub use project::TestProject;
pub use registry::TestRegistry;

use std::fs;
use std::path::Path;

/// Write `content` at `root/rel`, creating parent directories.
pub(crate) fn write_under(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap_or_else(|e| panic!("writing {}: {e}", path.display()));
}
