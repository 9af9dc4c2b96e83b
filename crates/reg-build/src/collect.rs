//! Expansion of declared item files into a flat file list.

use std::collections::HashMap;

use reg_fs::{NormalizedPath, io};
use reg_manifest::{FileDeclaration, FileRole, RegistryItem, ResolutionMode};

use crate::error::{Error, Result};

/// One file claimed by an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// Location on disk.
    pub absolute: NormalizedPath,
    /// Registry-root-relative path.
    pub source: String,
    /// Item-relative install path.
    pub path: String,
    pub file_type: String,
    pub role: FileRole,
    pub target: Option<String>,
    pub mode: ResolutionMode,
}

/// An item declaration with its expanded files.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedItem {
    pub item: RegistryItem,
    pub files: Vec<CollectedFile>,
}

/// Settings inherited from the nearest declaring ancestor.
#[derive(Debug, Clone)]
struct InheritContext {
    file_type: String,
    role: FileRole,
    target: Option<NormalizedPath>,
    mode: ResolutionMode,
    /// Item-relative directory of the parent folder (`.` at the top).
    item_dir: NormalizedPath,
}

impl InheritContext {
    fn root(item: &RegistryItem) -> Self {
        Self {
            file_type: item.item_type.clone(),
            role: FileRole::File,
            target: None,
            mode: ResolutionMode::Auto,
            item_dir: NormalizedPath::new("."),
        }
    }

    /// Context for `decl`, declared under `self`.
    fn child(&self, decl: &FileDeclaration, name: &str) -> Self {
        let target = match &decl.target {
            Some(target) => Some(NormalizedPath::new(target)),
            None => self.target.as_ref().map(|t| t.join(name)),
        };
        Self {
            file_type: decl
                .file_type
                .clone()
                .unwrap_or_else(|| self.file_type.clone()),
            role: decl.role.unwrap_or(self.role),
            target,
            mode: decl.dependency_resolution.unwrap_or(self.mode),
            item_dir: self.item_dir.join(name),
        }
    }
}

struct Collector<'a> {
    root: &'a NormalizedPath,
    /// Absolute path → owning item.
    owners: HashMap<NormalizedPath, String>,
}

/// Expand every item's declared files, in declaration order.
///
/// Folders are expanded recursively; an explicit `files` list on a folder
/// replaces the directory listing. Fails on the first missing path or on
/// a file claimed twice.
pub fn collect(root: &NormalizedPath, items: &[RegistryItem]) -> Result<Vec<CollectedItem>> {
    let mut collector = Collector {
        root,
        owners: HashMap::new(),
    };
    let mut collected = Vec::with_capacity(items.len());

    for item in items {
        let ctx = InheritContext::root(item);
        let mut files = Vec::new();
        for decl in &item.files {
            collector.visit(item, decl, root, &ctx, true, &mut files)?;
        }
        tracing::debug!(item = %item.name, files = files.len(), "collected item");
        collected.push(CollectedItem {
            item: item.clone(),
            files,
        });
    }

    Ok(collected)
}

impl Collector<'_> {
    fn visit(
        &mut self,
        item: &RegistryItem,
        decl: &FileDeclaration,
        parent_dir: &NormalizedPath,
        parent: &InheritContext,
        top_level: bool,
        out: &mut Vec<CollectedFile>,
    ) -> Result<()> {
        let absolute = parent_dir.join(&decl.path);
        if !absolute.exists() {
            return Err(Error::FileNotFound {
                item: item.name.clone(),
                path: self.relative(&absolute),
            });
        }

        // Top-level entries live under the item by basename only; nested
        // entries keep their path below the declaring folder.
        let name = if top_level {
            absolute.file_name().unwrap_or(decl.path.as_str()).to_string()
        } else {
            NormalizedPath::new(&decl.path).to_string()
        };
        let ctx = parent.child(decl, &name);

        if absolute.is_dir() {
            let children = match &decl.files {
                Some(explicit) => explicit.clone(),
                None => io::list_dir(&absolute)?
                    .into_iter()
                    .filter_map(|child| child.file_name().map(str::to_string))
                    .filter(|child| !child.starts_with('.'))
                    .map(FileDeclaration::new)
                    .collect(),
            };
            for child in &children {
                self.visit(item, child, &absolute, &ctx, false, out)?;
            }
            return Ok(());
        }

        if let Some(first) = self.owners.insert(absolute.clone(), item.name.clone()) {
            return Err(Error::DuplicateFileReference {
                path: self.relative(&absolute),
                first,
                second: item.name.clone(),
            });
        }

        out.push(CollectedFile {
            source: self.relative(&absolute),
            path: ctx.item_dir.to_string(),
            absolute,
            file_type: ctx.file_type,
            role: ctx.role,
            target: ctx.target.map(|t| t.to_string()),
            mode: ctx.mode,
        });
        Ok(())
    }

    fn relative(&self, path: &NormalizedPath) -> String {
        path.strip_prefix(self.root)
            .unwrap_or_else(|| path.clone())
            .to_string()
    }
}
