//! [`TestProject`]: a consumer project in a temporary directory.

use std::fs;
use std::path::Path;

use reg_fs::NormalizedPath;
use tempfile::TempDir;

pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
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

    /// Write `regkit.toml`.
    pub fn config(self, toml: &str) -> Self {
        crate::write_under(self.path(), "regkit.toml", toml);
        self
    }

    /// Add a project file, e.g. `tsconfig.json` or a locally edited copy.
    pub fn file(self, rel: &str, content: &str) -> Self {
        crate::write_under(self.path(), rel, content);
        self
    }

    /// Content of a project file.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let path = self.path().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Overwrite a project file after setup.
    pub fn edit(&self, rel: &str, content: &str) {
        crate::write_under(self.path(), rel, content);
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path().join(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path().join(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}
