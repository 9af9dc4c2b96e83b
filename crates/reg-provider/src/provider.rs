//! The provider contract and the per-registry state it produces.

use async_trait::async_trait;
use reg_fs::NormalizedPath;
use reg_manifest::{MANIFEST_FILENAME, Manifest};

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};

/// A git reference, classified so raw URLs can be built correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRef {
    Branch(String),
    Tag(String),
}

impl GitRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Tag(name) => name,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

/// Where a registry lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Fs {
        root: NormalizedPath,
    },
    Http {
        base: String,
    },
    GitHub {
        owner: String,
        repo: String,
        reference: GitRef,
    },
    GitLab {
        /// Scheme and host, e.g. `https://gitlab.com`.
        host: String,
        /// Full project path, e.g. `group/subgroup/project`.
        project: String,
        reference: GitRef,
    },
}

/// Everything needed to fetch from one registry, built once and reused for
/// every request against it.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryState {
    /// Normalized registry specifier; also the registry's identity.
    pub url: String,
    /// Name of the provider that produced this state.
    pub provider: String,
    pub location: Location,
    pub token: Option<String>,
}

impl std::fmt::Debug for RegistryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryState")
            .field("url", &self.url)
            .field("provider", &self.provider)
            .field("location", &self.location)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One registry transport.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this provider understands `spec`.
    fn matches(&self, spec: &str) -> bool;

    /// Normalize `spec` into the registry's canonical URL.
    fn parse(&self, spec: &str) -> Result<String>;

    /// Resolve everything needed for fetching: default branch, tag versus
    /// branch, credentials.
    async fn resolve_state(
        &self,
        spec: &str,
        credentials: &dyn CredentialStore,
    ) -> Result<RegistryState>;

    /// Fetch one file by its registry-relative path.
    async fn fetch_raw(&self, state: &RegistryState, path: &str) -> Result<Vec<u8>>;

    /// Fetch and parse the registry manifest.
    async fn fetch_manifest(&self, state: &RegistryState) -> Result<Manifest> {
        let bytes = self.fetch_raw(state, MANIFEST_FILENAME).await?;
        Manifest::from_slice(&bytes).map_err(|e| Error::ManifestParse {
            registry: state.url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Reject registry-relative paths that climb out of the registry.
pub(crate) fn checked_resource(state: &RegistryState, path: &str) -> Result<String> {
    let normalized = NormalizedPath::new(path);
    if normalized.is_absolute() || normalized.as_str().starts_with("..") {
        return Err(Error::PathEscape {
            registry: state.url.clone(),
            path: path.to_string(),
        });
    }
    Ok(normalized.as_str().to_string())
}
