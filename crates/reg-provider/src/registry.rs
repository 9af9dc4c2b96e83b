//! Connected registries and concurrent, order-preserving fetches.

use std::sync::Arc;

use futures::future::try_join_all;
use reg_manifest::Manifest;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::provider::{Provider, RegistryState};
use crate::providers::Providers;

/// A registry state paired with the provider that serves it.
#[derive(Clone)]
pub struct Registry {
    state: RegistryState,
    provider: Arc<dyn Provider>,
}

impl Registry {
    /// Select a provider for `spec` and resolve its state.
    pub async fn connect(
        providers: &Providers,
        spec: &str,
        credentials: &dyn CredentialStore,
    ) -> Result<Self> {
        let provider = providers.select(spec)?;
        let state = provider.resolve_state(spec, credentials).await?;
        tracing::debug!(registry = %state.url, provider = provider.name(), "connected");
        Ok(Self { state, provider })
    }

    pub fn from_parts(state: RegistryState, provider: Arc<dyn Provider>) -> Self {
        Self { state, provider }
    }

    /// Normalized URL identifying this registry.
    pub fn url(&self) -> &str {
        &self.state.url
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    pub async fn fetch_raw(&self, path: &str) -> Result<Vec<u8>> {
        self.provider.fetch_raw(&self.state, path).await
    }

    /// Fetch a file and decode it as UTF-8.
    pub async fn fetch_text(&self, path: &str) -> Result<String> {
        let bytes = self.fetch_raw(path).await?;
        String::from_utf8(bytes).map_err(|e| Error::fetch(&self.state.url, path, e))
    }

    pub async fn fetch_manifest(&self) -> Result<Manifest> {
        self.provider.fetch_manifest(&self.state).await
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("state", &self.state)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Connect to every registry concurrently.
///
/// Results come back in `specs` order; the first failure aborts the batch.
pub async fn connect_all(
    providers: &Providers,
    specs: &[String],
    credentials: &dyn CredentialStore,
) -> Result<Vec<Registry>> {
    try_join_all(
        specs
            .iter()
            .map(|spec| Registry::connect(providers, spec, credentials)),
    )
    .await
}

/// Fetch every registry's manifest concurrently, in registry order.
pub async fn fetch_manifests(registries: &[Registry]) -> Result<Vec<Manifest>> {
    let manifests = try_join_all(registries.iter().map(Registry::fetch_manifest)).await?;
    tracing::debug!(count = manifests.len(), "fetched manifests");
    Ok(manifests)
}
