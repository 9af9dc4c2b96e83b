//! Author-side item declarations.
//!
//! # Example TOML
//!
//! ```toml
//! [[items]]
//! name = "button"
//! type = "ui"
//! registry_dependencies = ["utils"]
//! dependencies = ["js:clsx@^2.1.0"]
//!
//! [[items.files]]
//! path = "src/ui/button"
//!
//! [[items.files.files]]
//! path = "button.test.ts"
//! role = "test"
//! ```

use serde::{Deserialize, Serialize};

use crate::dependency::RemoteDependency;

/// Classification of a file inside an item.
///
/// Only [`FileRole::File`] is required; the other roles are optional and
/// their dependencies never become mandatory for the owning item.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    #[default]
    File,
    Example,
    Doc,
    Test,
}

impl FileRole {
    /// Whether files of this role are optional for consumers.
    pub fn is_optional(self) -> bool {
        !matches!(self, Self::File)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Example => "example",
            Self::Doc => "doc",
            Self::Test => "test",
        }
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a file's dependencies are discovered at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Run the matching language resolver over the file content.
    #[default]
    Auto,
    /// Use only the dependencies declared by hand.
    Manual,
}

/// When an item gets added to a consumer project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddPolicy {
    /// Listed; installed when the user selects it.
    #[default]
    WhenAdded,
    /// Unlisted; installed only when another item needs it.
    WhenNeeded,
    /// Installed when a project is initialized.
    OnInit,
    /// Offered when a project is initialized.
    OptionallyOnInit,
    /// Installed with every add.
    Always,
}

impl AddPolicy {
    /// Whether the item is added without being selected or needed.
    pub fn is_always(self) -> bool {
        matches!(self, Self::Always | Self::OnInit | Self::OptionallyOnInit)
    }

    /// Whether the item can be installed on its own, i.e. it is a root for
    /// reachability purposes.
    pub fn is_root(self) -> bool {
        !matches!(self, Self::WhenNeeded)
    }
}

/// One declared file or folder entry of an item.
///
/// In configuration files an entry may be written as a bare path string
/// or as a table. Unset fields are inherited from the nearest declaring
/// ancestor during collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FileDeclarationRepr")]
pub struct FileDeclaration {
    /// Path relative to the declaring parent (the registry root for
    /// top-level entries).
    pub path: String,
    /// File type; defaults to the item type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<FileRole>,
    /// Project-relative install location overriding the item directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_resolution: Option<ResolutionMode>,
    /// Explicit children of a folder entry. Takes precedence over listing
    /// the directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileDeclaration>>,
}

impl FileDeclaration {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: FileRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_resolution(mut self, mode: ResolutionMode) -> Self {
        self.dependency_resolution = Some(mode);
        self
    }

    pub fn with_files(mut self, files: Vec<FileDeclaration>) -> Self {
        self.files = Some(files);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileDeclarationRepr {
    Path(String),
    Table {
        path: String,
        #[serde(rename = "type", default)]
        file_type: Option<String>,
        #[serde(default)]
        role: Option<FileRole>,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        dependency_resolution: Option<ResolutionMode>,
        #[serde(default)]
        files: Option<Vec<FileDeclaration>>,
    },
}

impl From<FileDeclarationRepr> for FileDeclaration {
    fn from(repr: FileDeclarationRepr) -> Self {
        match repr {
            FileDeclarationRepr::Path(path) => Self::new(path),
            FileDeclarationRepr::Table {
                path,
                file_type,
                role,
                target,
                dependency_resolution,
                files,
            } => Self {
                path,
                file_type,
                role,
                target,
                dependency_resolution,
                files,
            },
        }
    }
}

/// An author-declared, independently installable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub add: AddPolicy,
    pub files: Vec<FileDeclaration>,
    /// Items of the same registry this item needs, declared by hand.
    #[serde(default)]
    pub registry_dependencies: Vec<String>,
    /// Remote packages declared by hand.
    #[serde(default)]
    pub dependencies: Vec<RemoteDependency>,
    #[serde(default)]
    pub dev_dependencies: Vec<RemoteDependency>,
    /// Overrides the registry-wide strict setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl RegistryItem {
    pub fn new(name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            item_type: item_type.into(),
            add: AddPolicy::default(),
            files: Vec::new(),
            registry_dependencies: Vec::new(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            strict: None,
            categories: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: FileDeclaration) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_registry_dependency(mut self, name: impl Into<String>) -> Self {
        self.registry_dependencies.push(name.into());
        self
    }

    pub fn with_add(mut self, add: AddPolicy) -> Self {
        self.add = add;
        self
    }

    /// Effective strict mode given the registry-wide default.
    pub fn is_strict(&self, default: bool) -> bool {
        self.strict.unwrap_or(default)
    }
}
