//! `add`: fetch items from registries into a project.

use std::sync::Arc;

use reg_fs::NormalizedPath;
use reg_install::{InstallReport, Installer, NonInteractive, Prompter, WantedItem};
use reg_lang::Resolvers;
use reg_provider::{
    CredentialStore, EnvCredentialStore, Providers, ReqwestClient, connect_all, fetch_manifests,
};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};

/// A consumer project plus the collaborators an install needs.
pub struct Project {
    root: NormalizedPath,
    config: ProjectConfig,
    providers: Providers,
    credentials: Arc<dyn CredentialStore>,
    prompter: Arc<dyn Prompter>,
    resolvers: Resolvers,
}

impl Project {
    /// Project with built-in providers over `reqwest`, environment
    /// credentials and no interaction.
    pub fn new(root: NormalizedPath, config: ProjectConfig) -> Self {
        Self {
            root,
            config,
            providers: Providers::builtin(Arc::new(ReqwestClient::new())),
            credentials: Arc::new(EnvCredentialStore::new()),
            prompter: Arc::new(NonInteractive),
            resolvers: Resolvers::with_builtins(),
        }
    }

    /// Project configured by the `regkit` file in `root`.
    pub fn load(root: NormalizedPath) -> Result<Self> {
        let config = ProjectConfig::load(&root)?;
        Ok(Self::new(root, config))
    }

    pub fn with_providers(mut self, providers: Providers) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_resolvers(mut self, resolvers: Resolvers) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Add (or update) items given as `name` or `<registry>/<name>`.
    ///
    /// Registries named in qualified items are searched in addition to the
    /// configured ones.
    pub async fn add_items(&self, specs: &[String]) -> Result<InstallReport> {
        if specs.is_empty() {
            return Err(Error::NothingRequested);
        }

        let mut wanted = specs
            .iter()
            .map(|spec| spec.parse::<WantedItem>())
            .collect::<reg_install::Result<Vec<_>>>()?;

        let mut registry_specs: Vec<String> = Vec::new();
        let mut urls: Vec<String> = Vec::new();
        let configured = self.config.registries.iter().cloned();
        let qualifiers: Vec<String> = wanted.iter().filter_map(|w| w.registry.clone()).collect();
        for spec in configured.chain(qualifiers) {
            let url = self.providers.select(&spec)?.parse(&spec)?;
            if !urls.contains(&url) {
                urls.push(url);
                registry_specs.push(spec);
            }
        }
        if registry_specs.is_empty() {
            return Err(Error::NoRegistries);
        }

        // Qualifiers are compared by normalized URL.
        for item in &mut wanted {
            if let Some(spec) = &item.registry {
                item.registry = Some(self.providers.select(spec)?.parse(spec)?);
            }
        }

        let registries =
            connect_all(&self.providers, &registry_specs, self.credentials.as_ref()).await?;
        let manifests = fetch_manifests(&registries).await?;

        let installer = Installer::new(self.root.clone())
            .with_paths(self.config.paths.clone(), self.config.alias_matcher(&self.root)?)
            .with_resolvers(self.resolvers.clone())
            .with_overwrite(self.config.overwrite)
            .with_include(self.config.include.roles())
            .with_prompter(self.prompter.clone());
        let report = installer.install(&registries, &manifests, &wanted).await?;

        tracing::info!(
            items = report.items.len(),
            created = report.created.len(),
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            skipped = report.skipped.len(),
            "add finished"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("providers", &self.providers)
            .finish()
    }
}
