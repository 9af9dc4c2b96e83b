//! Remote (externally installable) package dependencies.
//!
//! Versions are pass-through strings; nothing here solves version ranges.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ecosystem used when a declaration does not name one.
pub const DEFAULT_ECOSYSTEM: &str = "js";

/// A reference to a package installed by the consumer's package manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RemoteDependencyRepr")]
pub struct RemoteDependency {
    pub ecosystem: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RemoteDependency {
    pub fn new(ecosystem: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ecosystem: ecosystem.into(),
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Deduplication key.
    pub fn key(&self) -> (&str, &str) {
        (&self.ecosystem, &self.name)
    }

    pub fn is_pinned(&self) -> bool {
        self.version.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

impl FromStr for RemoteDependency {
    type Err = Error;

    /// Parse `[ecosystem:]name[@version]`.
    ///
    /// The version separator is the last `@` that is not the first
    /// character, so scoped names such as `@scope/pkg@1.0.0` work.
    fn from_str(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidDependency {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let spec_trimmed = spec.trim();
        let (ecosystem, rest) = match spec_trimmed.split_once(':') {
            Some((eco, rest))
                if !eco.is_empty()
                    && eco
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
            {
                (eco, rest)
            }
            _ => (DEFAULT_ECOSYSTEM, spec_trimmed),
        };

        let (name, version) = match rest.rfind('@') {
            Some(idx) if idx > 0 => (&rest[..idx], Some(&rest[idx + 1..])),
            _ => (rest, None),
        };

        if name.is_empty() {
            return Err(invalid("package name is empty"));
        }
        if version.is_some_and(str::is_empty) {
            return Err(invalid("version after '@' is empty"));
        }

        Ok(Self {
            ecosystem: ecosystem.to_string(),
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl std::fmt::Display for RemoteDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ecosystem, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteDependencyRepr {
    Spec(String),
    Table {
        #[serde(default)]
        ecosystem: Option<String>,
        name: String,
        #[serde(default)]
        version: Option<String>,
    },
}

impl TryFrom<RemoteDependencyRepr> for RemoteDependency {
    type Error = Error;

    fn try_from(repr: RemoteDependencyRepr) -> Result<Self> {
        match repr {
            RemoteDependencyRepr::Spec(spec) => spec.parse(),
            RemoteDependencyRepr::Table {
                ecosystem,
                name,
                version,
            } => Ok(Self {
                ecosystem: ecosystem.unwrap_or_else(|| DEFAULT_ECOSYSTEM.to_string()),
                name,
                version,
            }),
        }
    }
}

/// Deduplicate dependencies by `(ecosystem, name)`.
///
/// The first pinned version seen wins; an unpinned entry is upgraded when
/// a pinned duplicate follows. Output is sorted by key so repeated builds
/// produce identical manifests.
pub fn merge_dependencies(
    deps: impl IntoIterator<Item = RemoteDependency>,
) -> Vec<RemoteDependency> {
    let mut merged: BTreeMap<(String, String), Option<String>> = BTreeMap::new();

    for dep in deps {
        let entry = merged.entry((dep.ecosystem, dep.name)).or_insert(None);
        if entry.is_none() {
            *entry = dep.version;
        }
    }

    merged
        .into_iter()
        .map(|((ecosystem, name), version)| RemoteDependency {
            ecosystem,
            name,
            version,
        })
        .collect()
}
