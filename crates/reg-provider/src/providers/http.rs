//! Registries served from a plain HTTP(S) base URL.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::provider::{Location, Provider, RegistryState, checked_resource};
use crate::providers::get_checked;

pub struct HttpProvider {
    client: Arc<dyn HttpClient>,
}

impl HttpProvider {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn matches(&self, spec: &str) -> bool {
        spec.starts_with("https://") || spec.starts_with("http://")
    }

    fn parse(&self, spec: &str) -> Result<String> {
        let url = Url::parse(spec).map_err(|e| Error::InvalidUrl {
            url: spec.to_string(),
            reason: e.to_string(),
        })?;
        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    async fn resolve_state(
        &self,
        spec: &str,
        credentials: &dyn CredentialStore,
    ) -> Result<RegistryState> {
        let base = self.parse(spec)?;
        let token = Url::parse(&base)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .and_then(|host| credentials.token(&host));
        Ok(RegistryState {
            url: base.clone(),
            provider: self.name().to_string(),
            location: Location::Http { base },
            token,
        })
    }

    async fn fetch_raw(&self, state: &RegistryState, path: &str) -> Result<Vec<u8>> {
        let Location::Http { base } = &state.location else {
            return Err(Error::fetch(&state.url, path, "not an HTTP registry"));
        };
        let resource = checked_resource(state, path)?;
        let url = format!("{}/{}", base, resource);
        let headers: Vec<(String, String)> = state
            .token
            .iter()
            .map(|token| ("Authorization".to_string(), format!("Bearer {}", token)))
            .collect();
        get_checked(self.client.as_ref(), &state.url, &resource, &url, &headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryCredentialStore, MemoryHttpClient};

    #[tokio::test]
    async fn fetches_relative_to_base_with_auth() {
        let client = Arc::new(
            MemoryHttpClient::new().with_text("https://cdn.example.com/r/src/a.ts", "a"),
        );
        let provider = HttpProvider::new(client.clone());
        let creds = MemoryCredentialStore::new().with("cdn.example.com", "secret");
        let state = provider
            .resolve_state("https://cdn.example.com/r/", &creds)
            .await
            .unwrap();
        assert_eq!(state.url, "https://cdn.example.com/r");

        let body = provider.fetch_raw(&state, "src/a.ts").await.unwrap();
        assert_eq!(body, b"a");
        let headers = client
            .headers_for("https://cdn.example.com/r/src/a.ts")
            .unwrap();
        assert_eq!(
            headers,
            vec![("Authorization".to_string(), "Bearer secret".to_string())]
        );
    }

    #[tokio::test]
    async fn status_errors_name_the_resource() {
        let provider = HttpProvider::new(Arc::new(MemoryHttpClient::new()));
        let state = provider
            .resolve_state("https://cdn.example.com/r", &MemoryCredentialStore::new())
            .await
            .unwrap();
        let err = provider.fetch_manifest(&state).await.unwrap_err();
        match err {
            Error::Status {
                registry,
                resource,
                status,
            } => {
                assert_eq!(registry, "https://cdn.example.com/r");
                assert_eq!(resource, "registry.json");
                assert_eq!(status, 404);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
