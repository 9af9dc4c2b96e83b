//! Registries on the local filesystem (`fs:<path>`, `./dist`, `/abs/path`).

use async_trait::async_trait;
use reg_fs::NormalizedPath;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::provider::{Location, Provider, RegistryState, checked_resource};

const PREFIX: &str = "fs:";

#[derive(Debug, Clone, Copy, Default)]
pub struct FsProvider;

impl FsProvider {
    pub fn new() -> Self {
        Self
    }

    fn path_of(spec: &str) -> &str {
        spec.strip_prefix(PREFIX).unwrap_or(spec)
    }
}

#[async_trait]
impl Provider for FsProvider {
    fn name(&self) -> &str {
        "fs"
    }

    fn matches(&self, spec: &str) -> bool {
        spec.starts_with(PREFIX) || spec.starts_with('.') || spec.starts_with('/')
    }

    fn parse(&self, spec: &str) -> Result<String> {
        let path = Self::path_of(spec);
        if path.trim().is_empty() {
            return Err(Error::InvalidUrl {
                url: spec.to_string(),
                reason: "empty path".into(),
            });
        }
        Ok(format!("{}{}", PREFIX, NormalizedPath::new(path)))
    }

    async fn resolve_state(
        &self,
        spec: &str,
        _credentials: &dyn CredentialStore,
    ) -> Result<RegistryState> {
        let url = self.parse(spec)?;
        let root = NormalizedPath::new(Self::path_of(spec));
        if !root.is_dir() {
            return Err(Error::InvalidUrl {
                url,
                reason: "directory does not exist".into(),
            });
        }
        Ok(RegistryState {
            url,
            provider: self.name().to_string(),
            location: Location::Fs { root },
            token: None,
        })
    }

    async fn fetch_raw(&self, state: &RegistryState, path: &str) -> Result<Vec<u8>> {
        let Location::Fs { root } = &state.location else {
            return Err(Error::fetch(&state.url, path, "not a filesystem registry"));
        };
        let resource = checked_resource(state, path)?;
        let full = root.join(&resource);
        tracing::debug!(registry = %state.url, path = %full, "reading");
        tokio::fs::read(full.to_native())
            .await
            .map_err(|e| Error::fetch(&state.url, resource, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCredentialStore;

    #[tokio::test]
    async fn reads_files_under_root_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export {}").unwrap();
        let spec = format!("fs:{}", dir.path().display());

        let provider = FsProvider::new();
        let state = provider
            .resolve_state(&spec, &MemoryCredentialStore::new())
            .await
            .unwrap();
        assert_eq!(provider.fetch_raw(&state, "a.ts").await.unwrap(), b"export {}");

        let missing = provider.fetch_raw(&state, "b.ts").await.unwrap_err();
        assert!(matches!(missing, Error::Fetch { ref resource, .. } if resource == "b.ts"));

        let escape = provider.fetch_raw(&state, "../secret").await.unwrap_err();
        assert!(matches!(escape, Error::PathEscape { .. }));
    }

    #[tokio::test]
    async fn missing_directory_is_rejected() {
        let err = FsProvider::new()
            .resolve_state("fs:/definitely/not/here", &MemoryCredentialStore::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }
}
