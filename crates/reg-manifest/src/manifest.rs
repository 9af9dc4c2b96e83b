//! The serialized registry manifest (`registry.json`).
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "name": "std",
//!   "version": "1.0.0",
//!   "items": [
//!     {
//!       "name": "stdout",
//!       "type": "util",
//!       "add": "when-added",
//!       "files": [
//!         {
//!           "path": "stdout.ts",
//!           "source": "src/stdout.ts",
//!           "type": "util",
//!           "role": "file",
//!           "registryDependencies": [],
//!           "dependencies": [],
//!           "devDependencies": [],
//!           "_imports_": [
//!             { "import": "./math/add", "item": "math", "file": "math/add.ts", "resolver": "js" }
//!           ]
//!         }
//!       ],
//!       "registryDependencies": ["math"],
//!       "dependencies": [],
//!       "devDependencies": []
//!     }
//!   ],
//!   "defaultPaths": { "util": "src/utils" }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use reg_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::dependency::RemoteDependency;
use crate::error::{Error, Result};
use crate::import::UnresolvedImport;
use crate::item::{AddPolicy, FileRole};

/// A plugin the consumer needs to interpret this registry's files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRequirement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// One file of a built item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    /// Item-relative install path.
    pub path: String,
    /// Registry-root-relative path used to fetch the content.
    pub source: String,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub role: FileRole,
    /// Project-relative install location overriding the item directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Dependencies that belong to this file only (optional roles).
    #[serde(default)]
    pub registry_dependencies: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<RemoteDependency>,
    #[serde(default)]
    pub dev_dependencies: Vec<RemoteDependency>,
    #[serde(default, rename = "_imports_")]
    pub imports: Vec<UnresolvedImport>,
}

impl ResolvedFile {
    pub fn new(
        path: impl Into<String>,
        source: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            file_type: file_type.into(),
            role: FileRole::File,
            target: None,
            registry_dependencies: Vec::new(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            imports: Vec::new(),
        }
    }
}

/// Build output for one declared item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub add: AddPolicy,
    pub files: Vec<ResolvedFile>,
    #[serde(default)]
    pub registry_dependencies: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<RemoteDependency>,
    #[serde(default)]
    pub dev_dependencies: Vec<RemoteDependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl ResolvedItem {
    /// Files whose role is required or explicitly included.
    pub fn files_for<'a>(
        &'a self,
        include: &'a [FileRole],
    ) -> impl Iterator<Item = &'a ResolvedFile> + 'a {
        self.files
            .iter()
            .filter(move |f| !f.role.is_optional() || include.contains(&f.role))
    }

    /// Registry dependencies of the item plus those of included
    /// optional-role files, sorted and deduplicated.
    pub fn registry_dependencies_for(&self, include: &[FileRole]) -> Vec<String> {
        let mut deps: BTreeSet<String> = self.registry_dependencies.iter().cloned().collect();
        for file in self.files_for(include) {
            deps.extend(file.registry_dependencies.iter().cloned());
        }
        deps.into_iter().collect()
    }
}

/// Serialized registry output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub items: Vec<ResolvedItem>,
    /// Suggested install paths keyed by type (or `"*"`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_paths: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginRequirement>,
}

impl Manifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            homepage: None,
            items: Vec::new(),
            default_paths: BTreeMap::new(),
            plugins: Vec::new(),
        }
    }

    /// Parse a manifest from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(content)?;
        manifest.validate_version()?;
        Ok(manifest)
    }

    /// Parse a manifest from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes)?;
        manifest.validate_version()?;
        Ok(manifest)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a manifest file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = io::read_text(path)?;
        Self::from_json(&content)
    }

    /// Write the manifest atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        let mut content = self.to_json_pretty()?;
        content.push('\n');
        io::write_text(path, &content)?;
        Ok(())
    }

    /// Check that `version`, when present, is valid semver.
    pub fn validate_version(&self) -> Result<()> {
        if let Some(version) = &self.version {
            semver::Version::parse(version).map_err(|source| Error::InvalidVersion {
                version: version.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Look up an item by name.
    pub fn get_item(&self, name: &str) -> Option<&ResolvedItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_item(name).is_some()
    }

    /// Item names in manifest order.
    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let mut file = ResolvedFile::new("stdout.ts", "src/stdout.ts", "util");
        file.imports
            .push(UnresolvedImport::new("./math/add", "math", "math/add.ts", "js"));

        let mut manifest = Manifest::new("std");
        manifest.version = Some("1.0.0".into());
        manifest.items.push(ResolvedItem {
            name: "stdout".into(),
            title: None,
            description: None,
            item_type: "util".into(),
            add: AddPolicy::WhenAdded,
            files: vec![file],
            registry_dependencies: vec!["math".into()],
            dependencies: vec![],
            dev_dependencies: vec![],
            categories: vec![],
        });
        manifest
    }

    #[test]
    fn serializes_wire_field_names() {
        let json = sample().to_json_pretty().unwrap();
        assert!(json.contains("\"registryDependencies\""));
        assert!(json.contains("\"devDependencies\""));
        assert!(json.contains("\"_imports_\""));
        assert!(!json.contains("defaultPaths"));
    }

    #[test]
    fn json_roundtrip() {
        let manifest = sample();
        let parsed = Manifest::from_json(&manifest.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn rejects_invalid_version() {
        let err = Manifest::from_json(r#"{"name": "x", "version": "one", "items": []}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    #[test]
    fn optional_file_dependencies_only_when_included() {
        let mut manifest = sample();
        let mut test_file = ResolvedFile::new("stdout.test.ts", "src/stdout.test.ts", "util");
        test_file.role = FileRole::Test;
        test_file.registry_dependencies.push("test-helpers".into());
        manifest.items[0].files.push(test_file);

        let item = &manifest.items[0];
        assert_eq!(item.registry_dependencies_for(&[]), vec!["math"]);
        assert_eq!(
            item.registry_dependencies_for(&[FileRole::Test]),
            vec!["math", "test-helpers"]
        );
        assert_eq!(item.files_for(&[]).count(), 1);
    }
}
