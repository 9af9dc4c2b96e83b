//! Registry build orchestration.

use reg_fs::{NormalizedPath, io};
use reg_lang::{PathAliasMatcher, Resolvers};
use reg_manifest::{MANIFEST_FILENAME, Manifest, RegistryConfig};

use crate::collect::collect;
use crate::error::Result;
use crate::resolve::DependencyResolver;
use crate::rules::{RuleEngine, RuleMessage, unused_items};

/// A finished build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub manifest: Manifest,
    /// Non-fatal resolution problems (lenient unresolved imports, plugin
    /// warnings).
    pub warnings: Vec<String>,
    pub rule_warnings: Vec<RuleMessage>,
    /// Items dropped because nothing adds or needs them.
    pub pruned: Vec<String>,
}

/// Builds a [`Manifest`] from a registry root and its configuration.
#[derive(Debug)]
pub struct RegistryBuilder {
    root: NormalizedPath,
    config: RegistryConfig,
    resolvers: Resolvers,
    rules: RuleEngine,
}

impl RegistryBuilder {
    pub fn new(root: NormalizedPath, config: RegistryConfig) -> Self {
        Self {
            root,
            config,
            resolvers: Resolvers::with_builtins(),
            rules: RuleEngine::builtin(),
        }
    }

    /// Builder for the configuration file found in `root`.
    pub fn load(root: NormalizedPath) -> Result<Self> {
        let config = RegistryConfig::load_from_dir(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn with_resolvers(mut self, resolvers: Resolvers) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Run the whole pipeline. Nothing is written.
    pub fn build(&self) -> Result<BuildOutput> {
        self.config.validate()?;
        tracing::info!(registry = %self.config.name, items = self.config.items.len(), "building registry");

        let collected = collect(&self.root, &self.config.items)?;

        let aliases = self.aliases()?;
        let mut resolver = DependencyResolver::new(
            &self.root,
            &self.resolvers,
            &aliases,
            self.config.strict,
            &collected,
        );
        let items = resolver.resolve_all(&collected)?;
        let warnings = resolver.into_warnings();

        let mut manifest = Manifest::new(&self.config.name);
        manifest.version = self.config.version.clone();
        manifest.description = self.config.description.clone();
        manifest.homepage = self.config.homepage.clone();
        manifest.default_paths = self.config.default_paths.clone();
        manifest.plugins = self.config.plugins.clone();
        manifest.items = items;

        let rule_warnings = self.rules.run(&manifest, &self.config.rules).into_result()?;

        let pruned = if self.config.prune_unused {
            let unused = unused_items(&manifest);
            manifest.items.retain(|item| !unused.contains(&item.name));
            for name in &unused {
                tracing::info!(item = %name, "pruned unused item");
            }
            unused
        } else {
            Vec::new()
        };

        tracing::info!(
            registry = %manifest.name,
            items = manifest.items.len(),
            warnings = warnings.len() + rule_warnings.len(),
            "registry built"
        );
        Ok(BuildOutput {
            manifest,
            warnings,
            rule_warnings,
            pruned,
        })
    }

    /// Where [`write`](Self::write) puts the manifest.
    pub fn output_dir(&self) -> NormalizedPath {
        match &self.config.output_dir {
            Some(dir) => {
                let dir = NormalizedPath::new(dir);
                if dir.is_absolute() {
                    dir
                } else {
                    self.root.join(dir.as_str())
                }
            }
            None => self.root.clone(),
        }
    }

    /// Write `registry.json`, plus every referenced file when an output
    /// directory is configured. Returns the manifest path.
    pub fn write(&self, output: &BuildOutput) -> Result<NormalizedPath> {
        let out_dir = self.output_dir();

        if self.config.output_dir.is_some() {
            for item in &output.manifest.items {
                for file in &item.files {
                    let content = io::read_bytes(&self.root.join(&file.source))?;
                    io::write_atomic(&out_dir.join(&file.source), &content)?;
                }
            }
        }

        let path = out_dir.join(MANIFEST_FILENAME);
        output.manifest.save(&path)?;
        tracing::info!(path = %path, "wrote manifest");
        Ok(path)
    }

    fn aliases(&self) -> Result<PathAliasMatcher> {
        if !self.config.aliases.is_empty() {
            return Ok(PathAliasMatcher::new(self.root.clone(), &self.config.aliases));
        }
        Ok(PathAliasMatcher::from_tsconfig(&self.root)?
            .unwrap_or_else(|| PathAliasMatcher::empty(self.root.clone())))
    }
}
