//! Dependency discovery over collected files.
//!
//! Every `auto` file is handed to its language resolver. Each reference it
//! reports ends up as one of:
//!
//! - nothing: builtins, and relative imports between files of the same item
//!   (they stay valid after install),
//! - an import template: same-item imports through an alias, and every
//!   import of another item's file (which also adds a registry dependency),
//! - a remote dependency: valid package specifiers not found locally,
//! - an unresolved import: fatal in strict mode, a warning otherwise.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use reg_fs::{NormalizedPath, io};
use reg_lang::{
    LanguageResolver, LocalMatch, PathAliasMatcher, ReferenceKind, Resolvers, resolve_local,
};
use reg_manifest::{
    RemoteDependency, ResolutionMode, ResolvedFile, ResolvedItem, UnresolvedImport,
    merge_dependencies,
};

use crate::collect::{CollectedFile, CollectedItem};
use crate::error::{Error, Result};

/// What one file contributes.
#[derive(Debug, Default)]
struct FileDependencies {
    registry: BTreeSet<String>,
    remote: Vec<RemoteDependency>,
    imports: Vec<UnresolvedImport>,
}

/// Where a collected file lives in the build output.
#[derive(Debug, Clone)]
struct Owner {
    item: String,
    path: String,
}

pub struct DependencyResolver<'a> {
    root: &'a NormalizedPath,
    resolvers: &'a Resolvers,
    aliases: &'a PathAliasMatcher,
    strict: bool,
    owners: HashMap<NormalizedPath, Owner>,
    /// Parsed dependency manifests by path; `None` when absent or invalid.
    versions: HashMap<NormalizedPath, Option<BTreeMap<String, String>>>,
    warnings: Vec<String>,
}

impl<'a> DependencyResolver<'a> {
    /// `strict` is the registry-wide default; items may override it.
    pub fn new(
        root: &'a NormalizedPath,
        resolvers: &'a Resolvers,
        aliases: &'a PathAliasMatcher,
        strict: bool,
        collected: &[CollectedItem],
    ) -> Self {
        let owners = collected
            .iter()
            .flat_map(|c| {
                c.files.iter().map(|f| {
                    (
                        f.absolute.clone(),
                        Owner {
                            item: c.item.name.clone(),
                            path: f.path.clone(),
                        },
                    )
                })
            })
            .collect();
        Self {
            root,
            resolvers,
            aliases,
            strict,
            owners,
            versions: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Non-fatal problems seen so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    pub fn resolve_all(&mut self, collected: &[CollectedItem]) -> Result<Vec<ResolvedItem>> {
        collected.iter().map(|c| self.resolve_item(c)).collect()
    }

    /// Resolve one item and fold its file dependencies.
    ///
    /// Dependencies of `example`, `doc` and `test` files stay on the file;
    /// only `file`-role dependencies become required item dependencies.
    pub fn resolve_item(&mut self, collected: &CollectedItem) -> Result<ResolvedItem> {
        let item = &collected.item;
        let strict = item.is_strict(self.strict);

        let mut registry: BTreeSet<String> = item.registry_dependencies.iter().cloned().collect();
        let mut remote = item.dependencies.clone();
        let mut files = Vec::with_capacity(collected.files.len());

        for file in &collected.files {
            let deps = self.resolve_file(&item.name, file, strict)?;

            let mut resolved = ResolvedFile::new(&file.path, &file.source, &file.file_type);
            resolved.role = file.role;
            resolved.target = file.target.clone();
            resolved.imports = deps.imports;

            if file.role.is_optional() {
                resolved.registry_dependencies = deps.registry.into_iter().collect();
                resolved.dependencies = merge_dependencies(deps.remote);
            } else {
                registry.extend(deps.registry);
                remote.extend(deps.remote);
            }
            files.push(resolved);
        }

        Ok(ResolvedItem {
            name: item.name.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            item_type: item.item_type.clone(),
            add: item.add,
            files,
            registry_dependencies: registry.into_iter().collect(),
            dependencies: merge_dependencies(remote),
            dev_dependencies: merge_dependencies(item.dev_dependencies.clone()),
            categories: item.categories.clone(),
        })
    }

    fn resolve_file(
        &mut self,
        item: &str,
        file: &CollectedFile,
        strict: bool,
    ) -> Result<FileDependencies> {
        let mut deps = FileDependencies::default();
        if file.mode == ResolutionMode::Manual {
            return Ok(deps);
        }
        let resolvers = self.resolvers;
        let file_name = file.absolute.file_name().unwrap_or_default();
        let Some(plugin) = resolvers.for_file(file_name) else {
            self.warnings.push(format!(
                "{}: no language resolver handles this file, its dependencies were not resolved",
                file.source
            ));
            return Ok(deps);
        };

        let content = io::read_text(&file.absolute)?;
        let references = plugin.extract_references(&content, &file.source);
        self.warnings.extend(references.warnings);

        let file_dir = file
            .absolute
            .parent()
            .unwrap_or_else(|| self.root.clone());

        for reference in references.references {
            let specifier = reference.specifier.as_str();

            if reference.kind == ReferenceKind::Relative {
                match resolve_local(&file_dir.join(specifier), plugin) {
                    Some(found) => {
                        self.local(item, file, plugin, specifier, &found, true, strict, &mut deps)?
                    }
                    None => self.unresolved(item, file, specifier, strict)?,
                }
                continue;
            }

            if plugin.is_builtin(specifier) {
                continue;
            }

            let aliased = self
                .aliases
                .candidates(specifier)
                .iter()
                .find_map(|candidate| resolve_local(candidate, plugin));
            if let Some(found) = aliased {
                self.local(item, file, plugin, specifier, &found, false, strict, &mut deps)?;
                continue;
            }

            match plugin.package_name(specifier) {
                Some(package) if reference.kind == ReferenceKind::Bare => {
                    let version = self.version_of(plugin, &file_dir, &package);
                    let mut dep = RemoteDependency::new(plugin.ecosystem(), package);
                    dep.version = version;
                    deps.remote.push(dep);
                }
                _ => self.unresolved(item, file, specifier, strict)?,
            }
        }

        Ok(deps)
    }

    #[allow(clippy::too_many_arguments)]
    fn local(
        &mut self,
        item: &str,
        file: &CollectedFile,
        plugin: &dyn LanguageResolver,
        specifier: &str,
        found: &LocalMatch,
        relative: bool,
        strict: bool,
        deps: &mut FileDependencies,
    ) -> Result<()> {
        let Some(owner) = self.owners.get(&found.path) else {
            tracing::debug!(
                file = %file.source,
                import = specifier,
                "import target belongs to no item"
            );
            return self.unresolved(item, file, specifier, strict);
        };

        if owner.item == item && relative {
            return Ok(());
        }
        if owner.item != item {
            deps.registry.insert(owner.item.clone());
        }
        let template = UnresolvedImport::new(specifier, &owner.item, &owner.path, plugin.name())
            .with_meta(plugin.template_meta(specifier, found));
        deps.imports.push(template);
        Ok(())
    }

    fn unresolved(
        &mut self,
        item: &str,
        file: &CollectedFile,
        specifier: &str,
        strict: bool,
    ) -> Result<()> {
        if strict {
            return Err(Error::ImportedFileNotResolved {
                item: item.to_string(),
                file: file.source.clone(),
                import: specifier.to_string(),
            });
        }
        let message = format!(
            "{}: could not resolve import `{}`; it was skipped",
            file.source, specifier
        );
        tracing::warn!(item, "{}", message);
        self.warnings.push(message);
        Ok(())
    }

    /// Version of `package` in the nearest dependency manifest between the
    /// file's directory and the registry root.
    fn version_of(
        &mut self,
        plugin: &dyn LanguageResolver,
        from: &NormalizedPath,
        package: &str,
    ) -> Option<String> {
        let manifest_name = plugin.dependency_manifest()?;
        let mut dir = Some(from.clone());

        while let Some(current) = dir {
            let candidate = current.join(manifest_name);
            let versions = self
                .versions
                .entry(candidate.clone())
                .or_insert_with(|| load_versions(plugin, &candidate));
            if let Some(versions) = versions {
                return versions.get(package).cloned();
            }
            if current == *self.root || !current.starts_with(self.root) {
                break;
            }
            dir = current.parent();
        }
        None
    }
}

fn load_versions(
    plugin: &dyn LanguageResolver,
    path: &NormalizedPath,
) -> Option<BTreeMap<String, String>> {
    let content = match io::read_text_if_exists(path) {
        Ok(content) => content?,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "could not read dependency manifest");
            return None;
        }
    };
    let versions = plugin.read_dependency_versions(&content);
    if versions.is_none() {
        tracing::warn!(path = %path, "ignoring unparsable dependency manifest");
    }
    versions
}
