//! Planning and applying an install.
//!
//! [`Installer::plan`] resolves the item graph, fetches every file
//! concurrently, rewrites import templates and diffs the result against the
//! project. A file whose destination an earlier file of the same plan
//! already claims is diffed against that earlier content instead, so the
//! second write is an update like any other. [`Installer::apply`] then
//! writes files one at a time, asking before any existing file is changed.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::future::try_join_all;
use reg_fs::{NormalizedPath, io};
use reg_lang::{PathAliasMatcher, Resolvers};
use reg_manifest::{FileRole, Manifest, RemoteDependency, ResolvedFile, merge_dependencies};
use reg_provider::Registry;

use crate::diff::FileChange;
use crate::error::{Error, Result};
use crate::graph::{ItemGraph, RegistryManifest, WantedItem, resolve_graph};
use crate::paths::{PathResolver, ResolvedPath, import_path};
use crate::prompt::{NonInteractive, OverwriteMode, OverwriteRequest, Prompter};
use crate::transform::{ImportRewrite, rewrite_imports};

/// One file ready to be written.
#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub registry: String,
    pub item: String,
    /// Registry-relative source path.
    pub source: String,
    pub destination: NormalizedPath,
    /// Project-relative destination for messages.
    pub display: String,
    pub content: String,
    pub existing: Option<String>,
    pub change: FileChange,
}

/// Everything an install would do.
#[derive(Debug, Clone, Default)]
pub struct InstallPlan {
    /// `(registry, item)` in graph order.
    pub items: Vec<(String, String)>,
    pub files: Vec<PlannedFile>,
    pub dependencies: Vec<RemoteDependency>,
    pub dev_dependencies: Vec<RemoteDependency>,
    pub warnings: Vec<String>,
}

/// Outcome of [`Installer::apply`]. Paths are project-relative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub items: Vec<String>,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<String>,
    /// Packages the consumer still has to install.
    pub dependencies: Vec<RemoteDependency>,
    pub dev_dependencies: Vec<RemoteDependency>,
    pub warnings: Vec<String>,
}

pub struct Installer {
    paths: PathResolver,
    resolvers: Resolvers,
    overwrite: OverwriteMode,
    include: Vec<FileRole>,
    prompter: Arc<dyn Prompter>,
}

impl Installer {
    pub fn new(project_root: NormalizedPath) -> Self {
        let aliases = PathAliasMatcher::empty(project_root.clone());
        Self {
            paths: PathResolver::new(project_root, BTreeMap::new(), aliases),
            resolvers: Resolvers::with_builtins(),
            overwrite: OverwriteMode::default(),
            include: Vec::new(),
            prompter: Arc::new(NonInteractive),
        }
    }

    /// Install paths plus the aliases they may refer to.
    pub fn with_paths(
        mut self,
        paths: BTreeMap<String, String>,
        aliases: PathAliasMatcher,
    ) -> Self {
        self.paths = PathResolver::new(self.paths.project_root().clone(), paths, aliases);
        self
    }

    pub fn with_resolvers(mut self, resolvers: Resolvers) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn with_overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Optional roles to install alongside required files.
    pub fn with_include(mut self, include: Vec<FileRole>) -> Self {
        self.include = include;
        self
    }

    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Resolve and fetch everything, writing nothing.
    ///
    /// `manifests[i]` must belong to `registries[i]`.
    pub async fn plan(
        &self,
        registries: &[Registry],
        manifests: &[Manifest],
        wanted: &[WantedItem],
    ) -> Result<InstallPlan> {
        let sources: Vec<RegistryManifest<'_>> = registries
            .iter()
            .zip(manifests)
            .map(|(registry, manifest)| RegistryManifest {
                url: registry.url(),
                manifest,
            })
            .collect();
        let graph = resolve_graph(&sources, wanted, &self.include, self.prompter.as_ref())?;

        let mut layout = Layout {
            paths: &self.paths,
            prompter: self.prompter.as_ref(),
            sources: &sources,
            dirs: HashMap::new(),
        };
        for node in graph.items() {
            layout.item_dir(node.registry, &node.item.name)?;
        }

        let jobs: Vec<(usize, &str, &ResolvedFile)> = graph
            .items()
            .iter()
            .flat_map(|node| {
                node.item
                    .files_for(&self.include)
                    .map(move |file| (node.registry, node.item.name.as_str(), file))
            })
            .collect();

        let contents = try_join_all(
            jobs.iter()
                .map(|(index, _, file)| registries[*index].fetch_text(&file.source)),
        )
        .await?;
        tracing::debug!(files = contents.len(), "fetched item files");

        let mut plan = InstallPlan {
            items: graph
                .items()
                .iter()
                .map(|node| (node.url.to_string(), node.item.name.clone()))
                .collect(),
            ..InstallPlan::default()
        };

        // Destinations already claimed by an earlier file of this plan.
        let mut claimed: HashMap<NormalizedPath, usize> = HashMap::new();

        for ((index, item, file), content) in jobs.into_iter().zip(contents) {
            let dir = layout.item_dir(index, item)?;
            let destination = self.paths.file_destination(&dir, file)?;
            let rewrites =
                self.rewrites_for(&mut layout, index, file, &destination, &mut plan.warnings)?;
            let content = rewrite_imports(&content, &rewrites);

            let display = self.paths.display(&destination.fs);
            let existing = match claimed.get(&destination.fs) {
                Some(&earlier) => {
                    let earlier = &plan.files[earlier];
                    let message = format!(
                        "{}: planned by both {}/{} and {}/{}",
                        display, earlier.registry, earlier.item, sources[index].url, item
                    );
                    let planned = earlier.content.clone();
                    warn(&mut plan.warnings, message);
                    Some(planned)
                }
                None => io::read_text_if_exists(&destination.fs)?,
            };
            let incoming = format!("{}/{}", sources[index].url, file.source);
            let change = FileChange::compute(existing.as_deref(), &content, &display, &incoming);

            claimed.insert(destination.fs.clone(), plan.files.len());
            plan.files.push(PlannedFile {
                registry: sources[index].url.to_string(),
                item: item.to_string(),
                source: file.source.clone(),
                destination: destination.fs,
                display,
                content,
                existing,
                change,
            });
        }

        let (dependencies, dev_dependencies) = self.remote_dependencies(&graph);
        plan.dependencies = dependencies;
        plan.dev_dependencies = dev_dependencies;
        Ok(plan)
    }

    /// Write the plan. Files are written sequentially in plan order.
    pub fn apply(&self, plan: &InstallPlan) -> Result<InstallReport> {
        let mut report = InstallReport {
            items: plan
                .items
                .iter()
                .map(|(registry, item)| format!("{registry}/{item}"))
                .collect(),
            dependencies: plan.dependencies.clone(),
            dev_dependencies: plan.dev_dependencies.clone(),
            warnings: plan.warnings.clone(),
            ..InstallReport::default()
        };

        for file in &plan.files {
            match &file.change {
                FileChange::Unchanged => report.unchanged.push(file.display.clone()),
                FileChange::Create => {
                    io::write_text(&file.destination, &file.content)?;
                    tracing::info!(path = %file.display, item = %file.item, "created");
                    report.created.push(file.display.clone());
                }
                FileChange::Update { diff } => {
                    if self.accepts_overwrite(file, diff) {
                        io::write_text(&file.destination, &file.content)?;
                        tracing::info!(path = %file.display, item = %file.item, "updated");
                        report.updated.push(file.display.clone());
                    } else {
                        tracing::info!(path = %file.display, "skipped");
                        report.skipped.push(file.display.clone());
                    }
                }
            }
        }

        Ok(report)
    }

    pub async fn install(
        &self,
        registries: &[Registry],
        manifests: &[Manifest],
        wanted: &[WantedItem],
    ) -> Result<InstallReport> {
        let plan = self.plan(registries, manifests, wanted).await?;
        self.apply(&plan)
    }

    fn accepts_overwrite(&self, file: &PlannedFile, diff: &str) -> bool {
        match self.overwrite {
            OverwriteMode::Always => true,
            OverwriteMode::Never => false,
            OverwriteMode::Prompt => {
                let incoming = format!("{}/{}", file.registry, file.source);
                self.prompter.confirm_overwrite(&OverwriteRequest {
                    old_content: file.existing.as_deref().unwrap_or_default(),
                    new_content: &file.content,
                    from_label: &file.display,
                    to_label: &incoming,
                    diff,
                })
            }
        }
    }

    fn rewrites_for(
        &self,
        layout: &mut Layout<'_>,
        index: usize,
        file: &ResolvedFile,
        destination: &ResolvedPath,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<ImportRewrite>> {
        let mut rewrites = Vec::with_capacity(file.imports.len());
        for template in &file.imports {
            let Some(plugin) = self.resolvers.by_name(&template.resolver) else {
                warn(
                    warnings,
                    format!(
                        "{}: no `{}` resolver to rewrite `{}`",
                        file.source, template.resolver, template.import
                    ),
                );
                continue;
            };
            let source = layout.sources[index];
            let target_file = source
                .manifest
                .get_item(&template.item)
                .and_then(|item| item.files.iter().find(|f| f.path == template.file));
            let Some(target_file) = target_file else {
                warn(
                    warnings,
                    format!(
                        "{}: `{}` points at {}/{}, which the registry does not list",
                        file.source, template.import, template.item, template.file
                    ),
                );
                continue;
            };

            let target_dir = layout.item_dir(index, &template.item)?;
            let target = self.paths.file_destination(&target_dir, target_file)?;
            let path = import_path(&destination.fs, &target);
            rewrites.push(ImportRewrite::new(
                &template.import,
                plugin.render_import(template, &path),
            ));
        }
        Ok(rewrites)
    }

    /// Remote dependencies of every installed item and included file.
    fn remote_dependencies(
        &self,
        graph: &ItemGraph<'_>,
    ) -> (Vec<RemoteDependency>, Vec<RemoteDependency>) {
        let mut deps = Vec::new();
        let mut dev = Vec::new();
        for node in graph.items() {
            deps.extend(node.item.dependencies.iter().cloned());
            dev.extend(node.item.dev_dependencies.iter().cloned());
            for file in node.item.files_for(&self.include) {
                if file.role.is_optional() {
                    deps.extend(file.dependencies.iter().cloned());
                    dev.extend(file.dev_dependencies.iter().cloned());
                }
            }
        }
        (merge_dependencies(deps), merge_dependencies(dev))
    }
}

impl std::fmt::Debug for Installer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Installer")
            .field("paths", &self.paths)
            .field("resolvers", &self.resolvers)
            .field("overwrite", &self.overwrite)
            .field("include", &self.include)
            .finish()
    }
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("{}", message);
    warnings.push(message);
}

/// Item directories, computed once per `(registry, item)`.
struct Layout<'a> {
    paths: &'a PathResolver,
    prompter: &'a dyn Prompter,
    sources: &'a [RegistryManifest<'a>],
    dirs: HashMap<(usize, String), ResolvedPath>,
}

impl Layout<'_> {
    fn item_dir(&mut self, index: usize, name: &str) -> Result<ResolvedPath> {
        let key = (index, name.to_string());
        if let Some(dir) = self.dirs.get(&key) {
            return Ok(dir.clone());
        }
        let source = self.sources[index];
        let item = source
            .manifest
            .get_item(name)
            .ok_or_else(|| Error::NotFound {
                item: name.to_string(),
                registries: vec![source.url.to_string()],
            })?;
        let dir = self
            .paths
            .item_dir(item, &source.manifest.default_paths, self.prompter)?;
        tracing::debug!(item = name, path = %dir.fs, "install directory");
        self.dirs.insert(key, dir.clone());
        Ok(dir)
    }
}
