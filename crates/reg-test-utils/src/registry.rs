//! [`TestRegistry`]: a registry source tree in a temporary directory.

use std::path::Path;

use reg_fs::NormalizedPath;
use reg_manifest::{MANIFEST_FILENAME, Manifest};
use tempfile::TempDir;

/// A registry root with source files and a `registry.config.toml`.
///
/// # Example
///
/// ```rust,no_run
/// use reg_test_utils::TestRegistry;
///
/// let registry = TestRegistry::new()
///     .file("src/math/add.ts", "export const add = (a: number, b: number) => a + b;\n")
///     .config(r#"
/// name = "std"
///
/// [[items]]
/// name = "math"
/// type = "util"
/// files = ["src/math"]
/// "#);
/// assert!(registry.spec().starts_with("fs:"));
/// ```
pub struct TestRegistry {
    temp_dir: TempDir,
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRegistry {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn root(&self) -> NormalizedPath {
        NormalizedPath::new(self.path())
    }

    /// Add a source file.
    pub fn file(self, rel: &str, content: &str) -> Self {
        crate::write_under(self.path(), rel, content);
        self
    }

    /// Write `registry.config.toml`.
    pub fn config(self, toml: &str) -> Self {
        crate::write_under(self.path(), "registry.config.toml", toml);
        self
    }

    /// Provider specifier for serving this directory.
    pub fn spec(&self) -> String {
        format!("fs:{}", self.root())
    }

    /// The built manifest, once `registry.json` has been written.
    ///
    /// # Panics
    /// Panics if the manifest is missing or invalid.
    pub fn manifest(&self) -> Manifest {
        Manifest::load(&self.root().join(MANIFEST_FILENAME))
            .unwrap_or_else(|e| panic!("loading manifest of {}: {e}", self.root()))
    }
}
