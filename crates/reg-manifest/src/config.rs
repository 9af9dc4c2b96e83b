//! Registry author configuration (`registry.config.toml`).
//!
//! # Example TOML
//!
//! ```toml
//! name = "std"
//! version = "1.0.0"
//! output_dir = "dist"
//!
//! [aliases]
//! "@/*" = ["./src/*"]
//!
//! [default_paths]
//! util = "src/utils"
//!
//! [rules]
//! no-unpinned-dependency = "off"
//! max-local-dependencies = { level = "error", max = 5 }
//!
//! [[items]]
//! name = "math"
//! type = "util"
//! files = ["src/math"]
//! ```

use std::collections::{BTreeMap, HashSet};

use reg_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::REGISTRY_CONFIG_STEM;
use crate::error::{Error, Result};
use crate::item::RegistryItem;
use crate::manifest::PluginRequirement;
use crate::name::validate_item_name;

/// Severity of a manifest rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Off,
    Warn,
    Error,
}

/// Per-rule configuration: a bare level or a level plus rule options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    Level(RuleLevel),
    Configured {
        level: RuleLevel,
        #[serde(flatten)]
        options: Map<String, Value>,
    },
}

impl RuleSetting {
    pub fn level(&self) -> RuleLevel {
        match self {
            Self::Level(level) | Self::Configured { level, .. } => *level,
        }
    }

    pub fn options(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Level(_) => None,
            Self::Configured { options, .. } => Some(options),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Complete registry declaration loaded from the registry root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Registry-wide strict mode; items may override it.
    #[serde(default = "default_true")]
    pub strict: bool,
    /// Remove unused items from the manifest.
    #[serde(default = "default_true")]
    pub prune_unused: bool,
    /// Where to write `registry.json` and the referenced files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Path aliases (tsconfig `paths` semantics), relative to the root.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub default_paths: BTreeMap<String, String>,
    #[serde(default)]
    pub plugins: Vec<PluginRequirement>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSetting>,
    #[serde(default)]
    pub items: Vec<RegistryItem>,
}

impl RegistryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            homepage: None,
            strict: true,
            prune_unused: true,
            output_dir: None,
            aliases: BTreeMap::new(),
            default_paths: BTreeMap::new(),
            plugins: Vec::new(),
            rules: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: RegistryItem) -> Self {
        self.items.push(item);
        self
    }

    /// Load the configuration file found in `root`.
    pub fn load_from_dir(root: &NormalizedPath) -> Result<Self> {
        let store = ConfigStore::new();
        let path = store
            .locate(root, REGISTRY_CONFIG_STEM)
            .ok_or_else(|| Error::ConfigNotFound(root.to_native()))?;
        tracing::debug!(path = %path, "loading registry configuration");
        Ok(store.load(&path)?)
    }

    /// Structural validation that must pass before any file is read.
    ///
    /// Checks the version, item names, name uniqueness and direct
    /// self-references.
    pub fn validate(&self) -> Result<()> {
        if let Some(version) = &self.version {
            semver::Version::parse(version).map_err(|source| Error::InvalidVersion {
                version: version.clone(),
                source,
            })?;
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            validate_item_name(&item.name)?;
            if !seen.insert(item.name.as_str()) {
                return Err(Error::DuplicateItem(item.name.clone()));
            }
            if item.registry_dependencies.iter().any(|d| d == &item.name) {
                return Err(Error::SelfReference {
                    item: item.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get_item(&self, name: &str) -> Option<&RegistryItem> {
        self.items.iter().find(|item| item.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rule_settings() {
        let config: RegistryConfig = toml::from_str(
            r#"
name = "std"

[rules]
no-unpinned-dependency = "off"
max-local-dependencies = { level = "error", max = 5 }
"#,
        )
        .unwrap();

        let simple = &config.rules["no-unpinned-dependency"];
        assert_eq!(simple.level(), RuleLevel::Off);
        assert!(simple.options().is_none());

        let detailed = &config.rules["max-local-dependencies"];
        assert_eq!(detailed.level(), RuleLevel::Error);
        assert_eq!(detailed.options().unwrap()["max"], Value::from(5));
    }

    #[test]
    fn defaults_are_strict_and_pruning() {
        let config: RegistryConfig = toml::from_str("name = \"std\"").unwrap();
        assert!(config.strict);
        assert!(config.prune_unused);
        assert!(config.items.is_empty());
    }

    #[test]
    fn validate_rejects_duplicates_and_self_reference() {
        let dup = RegistryConfig::new("r")
            .with_item(RegistryItem::new("a", "util"))
            .with_item(RegistryItem::new("a", "util"));
        assert!(matches!(dup.validate(), Err(Error::DuplicateItem(name)) if name == "a"));

        let selfish = RegistryConfig::new("r")
            .with_item(RegistryItem::new("a", "util").with_registry_dependency("a"));
        assert!(matches!(selfish.validate(), Err(Error::SelfReference { .. })));
    }

    #[test]
    fn validate_rejects_bad_version_and_name() {
        let mut config = RegistryConfig::new("r");
        config.version = Some("latest".into());
        assert!(matches!(config.validate(), Err(Error::InvalidVersion { .. })));

        let config = RegistryConfig::new("r").with_item(RegistryItem::new("ui/button", "ui"));
        assert!(matches!(config.validate(), Err(Error::InvalidName { .. })));
    }
}
