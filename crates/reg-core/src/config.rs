//! Consumer project configuration (`regkit.toml`).
//!
//! # Example TOML
//!
//! ```toml
//! registries = ["github/ieedan/std"]
//! overwrite = "prompt"
//!
//! [paths]
//! "*" = "src/blocks"
//! util = "@/lib/utils"
//! "ui/button" = "src/components/button"
//!
//! [aliases]
//! "@/*" = ["./src/*"]
//!
//! [include]
//! tests = true
//! ```

use std::collections::BTreeMap;

use reg_fs::{ConfigStore, NormalizedPath};
use reg_install::OverwriteMode;
use reg_lang::PathAliasMatcher;
use reg_manifest::FileRole;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File stem of the project configuration.
pub const PROJECT_CONFIG_STEM: &str = "regkit";

/// Optional file roles to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeRoles {
    pub examples: bool,
    pub docs: bool,
    pub tests: bool,
}

impl IncludeRoles {
    pub fn roles(&self) -> Vec<FileRole> {
        [
            (self.examples, FileRole::Example),
            (self.docs, FileRole::Doc),
            (self.tests, FileRole::Test),
        ]
        .into_iter()
        .filter_map(|(enabled, role)| enabled.then_some(role))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Registries searched for unqualified item names, in order.
    pub registries: Vec<String>,
    pub overwrite: OverwriteMode,
    /// `"*"`, `"<type>"` or `"<type>/<item>"` to a project path or alias.
    pub paths: BTreeMap<String, String>,
    /// tsconfig `paths` semantics, relative to the project root.
    pub aliases: BTreeMap<String, Vec<String>>,
    pub include: IncludeRoles,
}

impl ProjectConfig {
    /// Load `regkit.{toml,json,yaml}` from `root`.
    ///
    /// A project without a configuration file gets the defaults.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let store = ConfigStore::new();
        match store.locate(root, PROJECT_CONFIG_STEM) {
            Some(path) => {
                tracing::debug!(path = %path, "loading project configuration");
                Ok(store.load(&path)?)
            }
            None => {
                tracing::debug!(root = %root, "no project configuration, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Save as `regkit.toml`, or over the existing file in its own format.
    pub fn save(&self, root: &NormalizedPath) -> Result<NormalizedPath> {
        let store = ConfigStore::new();
        let path = store
            .locate(root, PROJECT_CONFIG_STEM)
            .unwrap_or_else(|| root.join(&format!("{PROJECT_CONFIG_STEM}.toml")));
        store.save(&path, self)?;
        Ok(path)
    }

    /// Alias matcher for the project: configured aliases, else the
    /// project's `tsconfig.json` paths.
    pub fn alias_matcher(&self, root: &NormalizedPath) -> Result<PathAliasMatcher> {
        if !self.aliases.is_empty() {
            return Ok(PathAliasMatcher::new(root.clone(), &self.aliases));
        }
        Ok(PathAliasMatcher::from_tsconfig(root)?
            .unwrap_or_else(|| PathAliasMatcher::empty(root.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(&NormalizedPath::new(dir.path())).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.overwrite, OverwriteMode::Prompt);
        assert!(config.include.roles().is_empty());
    }

    #[test]
    fn loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("regkit.toml"),
            r#"
registries = ["github/ieedan/std"]
overwrite = "always"

[paths]
"*" = "src/blocks"

[include]
tests = true
docs = true
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(&NormalizedPath::new(dir.path())).unwrap();
        assert_eq!(config.registries, vec!["github/ieedan/std"]);
        assert_eq!(config.overwrite, OverwriteMode::Always);
        assert_eq!(config.paths.get("*").map(String::as_str), Some("src/blocks"));
        assert_eq!(config.include.roles(), vec![FileRole::Doc, FileRole::Test]);
    }

    #[test]
    fn loads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig {
            registries: vec!["https://example.com/r".into()],
            overwrite: OverwriteMode::Never,
            ..ProjectConfig::default()
        };
        std::fs::write(
            dir.path().join("regkit.yaml"),
            serde_yaml::to_string(&config).unwrap(),
        )
        .unwrap();
        assert_eq!(
            ProjectConfig::load(&NormalizedPath::new(dir.path())).unwrap(),
            config
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let root = NormalizedPath::new(dir.path());
        let mut config = ProjectConfig::default();
        config.paths.insert("util".into(), "src/utils".into());
        config
            .aliases
            .insert("@/*".into(), vec!["./src/*".into()]);

        let path = config.save(&root).unwrap();
        assert_eq!(path, root.join("regkit.toml"));
        assert_eq!(ProjectConfig::load(&root).unwrap(), config);

        let matcher = config.alias_matcher(&root).unwrap();
        assert!(matcher.matches("@/lib/utils"));
    }
}
