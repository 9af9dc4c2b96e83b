//! Built-in providers and provider selection.

mod fs;
mod github;
mod gitlab;
mod http;

use std::sync::Arc;

pub use fs::FsProvider;
pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use http::HttpProvider;

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::provider::Provider;

/// Ordered provider list; the first provider matching a specifier wins.
#[derive(Clone, Default)]
pub struct Providers {
    providers: Vec<Arc<dyn Provider>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    /// GitHub, GitLab, plain HTTP and the local filesystem, sharing one
    /// HTTP client.
    pub fn builtin(client: Arc<dyn HttpClient>) -> Self {
        Self::new()
            .with(GitHubProvider::new(client.clone()))
            .with(GitLabProvider::new(client.clone()))
            .with(HttpProvider::new(client))
            .with(FsProvider::new())
    }

    pub fn with(mut self, provider: impl Provider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn select(&self, spec: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|p| p.matches(spec))
            .cloned()
            .ok_or_else(|| Error::UnsupportedRegistry(spec.to_string()))
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("Providers").field("providers", &names).finish()
    }
}

/// GET `url` and turn non-2xx statuses into errors naming the resource.
pub(crate) async fn get_checked(
    client: &dyn HttpClient,
    registry: &str,
    resource: &str,
    url: &str,
    headers: &[(String, String)],
) -> Result<Vec<u8>> {
    tracing::debug!(registry, resource, url, "fetching");
    let response = client
        .get(url, headers)
        .await
        .map_err(|message| Error::fetch(registry, resource, message))?;
    if !response.is_success() {
        return Err(Error::Status {
            registry: registry.to_string(),
            resource: resource.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

/// Whether `url` exists on the host: `true` on success, `false` on 404.
/// Transport failures and any other status are errors.
pub(crate) async fn resource_exists(
    client: &dyn HttpClient,
    registry: &str,
    resource: &str,
    url: &str,
    headers: &[(String, String)],
) -> Result<bool> {
    tracing::debug!(registry, resource, url, "checking");
    let response = client
        .get(url, headers)
        .await
        .map_err(|message| Error::fetch(registry, resource, message))?;
    match response.status {
        _ if response.is_success() => Ok(true),
        404 => Ok(false),
        status => Err(Error::Status {
            registry: registry.to_string(),
            resource: resource.to_string(),
            status,
        }),
    }
}

/// Split a trailing `@ref` off a git-host specifier.
///
/// Only an `@` after the first `/` counts, so `@scope`-like owners are not
/// mistaken for refs.
pub(crate) fn split_ref_suffix(rest: &str) -> (&str, Option<&str>) {
    match (rest.find('/'), rest.rfind('@')) {
        (Some(slash), Some(at)) if at > slash && at + 1 < rest.len() => {
            (&rest[..at], Some(&rest[at + 1..]))
        }
        _ => (rest, None),
    }
}
