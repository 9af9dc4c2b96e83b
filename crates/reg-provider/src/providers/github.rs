//! GitHub repositories.
//!
//! Accepted forms: `github/owner/repo`, `github:owner/repo`,
//! `https://github.com/owner/repo`, each optionally followed by
//! `/tree/<ref>` or `@<ref>`. Files are read from
//! `raw.githubusercontent.com`; the API is only used to find the default
//! branch and to tell tags from branches.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::provider::{GitRef, Location, Provider, RegistryState, checked_resource};
use crate::providers::{get_checked, resource_exists, split_ref_suffix};

const HOST: &str = "github.com";
const PREFIXES: &[&str] = &["https://github.com/", "github/", "github:"];

/// Parsed `owner/repo[@ref]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RepoSpec {
    owner: String,
    repo: String,
    reference: Option<String>,
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

pub struct GitHubProvider {
    client: Arc<dyn HttpClient>,
    api_base: String,
    raw_base: String,
}

impl GitHubProvider {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
        }
    }

    /// Point at a GitHub Enterprise or mock server.
    pub fn with_bases(mut self, api_base: impl Into<String>, raw_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.raw_base = raw_base.into();
        self
    }

    fn parse_spec(spec: &str) -> Result<RepoSpec> {
        let invalid = |reason: &str| Error::InvalidUrl {
            url: spec.to_string(),
            reason: reason.to_string(),
        };
        let rest = PREFIXES
            .iter()
            .find_map(|prefix| spec.strip_prefix(prefix))
            .ok_or_else(|| invalid("not a GitHub registry"))?;
        let (rest, at_ref) = split_ref_suffix(rest.trim_end_matches('/'));

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let (owner, repo) = match segments.as_slice() {
            [owner, repo, ..] => (*owner, repo.trim_end_matches(".git")),
            _ => return Err(invalid("expected owner/repo")),
        };
        let tree_ref = match &segments[2..] {
            [] => None,
            ["tree", reference @ ..] if !reference.is_empty() => Some(reference.join("/")),
            _ => return Err(invalid("expected /tree/<ref> after owner/repo")),
        };

        Ok(RepoSpec {
            owner: owner.to_string(),
            repo: repo.to_string(),
            reference: at_ref.map(str::to_string).or(tree_ref),
        })
    }

    fn auth_headers(token: Option<&str>) -> Vec<(String, String)> {
        token
            .map(|t| vec![("Authorization".to_string(), format!("Bearer {}", t))])
            .unwrap_or_default()
    }

    async fn default_branch(
        &self,
        url: &str,
        spec: &RepoSpec,
        token: Option<&str>,
    ) -> Result<String> {
        let api = format!("{}/repos/{}/{}", self.api_base, spec.owner, spec.repo);
        let body = get_checked(
            self.client.as_ref(),
            url,
            "repository metadata",
            &api,
            &Self::auth_headers(token),
        )
        .await?;
        let info: RepoInfo = serde_json::from_slice(&body)
            .map_err(|e| Error::fetch(url, "repository metadata", e))?;
        Ok(info.default_branch)
    }

    async fn is_tag(
        &self,
        url: &str,
        spec: &RepoSpec,
        reference: &str,
        token: Option<&str>,
    ) -> Result<bool> {
        let api = format!(
            "{}/repos/{}/{}/git/ref/tags/{}",
            self.api_base, spec.owner, spec.repo, reference
        );
        resource_exists(
            self.client.as_ref(),
            url,
            "tag lookup",
            &api,
            &Self::auth_headers(token),
        )
        .await
    }
}

#[async_trait]
impl Provider for GitHubProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn matches(&self, spec: &str) -> bool {
        PREFIXES.iter().any(|prefix| spec.starts_with(prefix))
    }

    fn parse(&self, spec: &str) -> Result<String> {
        let parsed = Self::parse_spec(spec)?;
        let mut url = format!("github/{}/{}", parsed.owner, parsed.repo);
        if let Some(reference) = &parsed.reference {
            url.push_str("/tree/");
            url.push_str(reference);
        }
        Ok(url)
    }

    async fn resolve_state(
        &self,
        spec: &str,
        credentials: &dyn CredentialStore,
    ) -> Result<RegistryState> {
        let parsed = Self::parse_spec(spec)?;
        let url = self.parse(spec)?;
        let token = credentials.token(HOST);

        let reference = match &parsed.reference {
            None => GitRef::Branch(self.default_branch(&url, &parsed, token.as_deref()).await?),
            Some(reference) => {
                if self.is_tag(&url, &parsed, reference, token.as_deref()).await? {
                    GitRef::Tag(reference.clone())
                } else {
                    GitRef::Branch(reference.clone())
                }
            }
        };
        tracing::debug!(
            registry = %url,
            reference = reference.as_str(),
            tag = reference.is_tag(),
            "resolved GitHub ref"
        );

        Ok(RegistryState {
            url,
            provider: self.name().to_string(),
            location: Location::GitHub {
                owner: parsed.owner,
                repo: parsed.repo,
                reference,
            },
            token,
        })
    }

    async fn fetch_raw(&self, state: &RegistryState, path: &str) -> Result<Vec<u8>> {
        let Location::GitHub {
            owner,
            repo,
            reference,
        } = &state.location
        else {
            return Err(Error::fetch(&state.url, path, "not a GitHub registry"));
        };
        let resource = checked_resource(state, path)?;
        let kind = if reference.is_tag() { "tags" } else { "heads" };
        let url = format!(
            "{}/{}/{}/refs/{}/{}/{}",
            self.raw_base,
            owner,
            repo,
            kind,
            reference.as_str(),
            resource
        );
        get_checked(
            self.client.as_ref(),
            &state.url,
            &resource,
            &url,
            &Self::auth_headers(state.token.as_deref()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryCredentialStore, MemoryHttpClient};
    use rstest::rstest;

    #[rstest]
    #[case("github/ieedan/std", "github/ieedan/std")]
    #[case("github:ieedan/std", "github/ieedan/std")]
    #[case("https://github.com/ieedan/std.git", "github/ieedan/std")]
    #[case("github/ieedan/std/tree/next", "github/ieedan/std/tree/next")]
    #[case("github/ieedan/std@v1.2.0", "github/ieedan/std/tree/v1.2.0")]
    #[case("https://github.com/ieedan/std/tree/feat/x", "github/ieedan/std/tree/feat/x")]
    fn normalizes(#[case] spec: &str, #[case] expected: &str) {
        let provider = GitHubProvider::new(Arc::new(MemoryHttpClient::new()));
        assert_eq!(provider.parse(spec).unwrap(), expected);
    }

    #[test]
    fn rejects_incomplete_specs() {
        assert!(GitHubProvider::parse_spec("github/only-owner").is_err());
        assert!(GitHubProvider::parse_spec("github/o/r/blob/main").is_err());
    }

    #[tokio::test]
    async fn default_branch_and_raw_url() {
        let client = Arc::new(
            MemoryHttpClient::new()
                .with_text(
                    "https://api.github.com/repos/o/r",
                    r#"{"default_branch": "trunk"}"#,
                )
                .with_text(
                    "https://raw.githubusercontent.com/o/r/refs/heads/trunk/registry.json",
                    r#"{"name": "r", "items": []}"#,
                ),
        );
        let provider = GitHubProvider::new(client.clone());
        let creds = MemoryCredentialStore::new().with("github.com", "tok");
        let state = provider.resolve_state("github/o/r", &creds).await.unwrap();
        assert_eq!(
            state.location,
            Location::GitHub {
                owner: "o".into(),
                repo: "r".into(),
                reference: GitRef::Branch("trunk".into()),
            }
        );

        let manifest = provider.fetch_manifest(&state).await.unwrap();
        assert_eq!(manifest.name, "r");
        let headers = client
            .headers_for("https://api.github.com/repos/o/r")
            .unwrap();
        assert_eq!(headers[0].1, "Bearer tok");
    }

    #[tokio::test]
    async fn detects_tags() {
        let client = Arc::new(
            MemoryHttpClient::new()
                .with_text("https://api.github.com/repos/o/r/git/ref/tags/v1", "{}")
                .with_text(
                    "https://raw.githubusercontent.com/o/r/refs/tags/v1/a.ts",
                    "a",
                ),
        );
        let provider = GitHubProvider::new(client);
        let state = provider
            .resolve_state("github/o/r@v1", &MemoryCredentialStore::new())
            .await
            .unwrap();
        assert_eq!(provider.fetch_raw(&state, "a.ts").await.unwrap(), b"a");

        let branch = provider
            .resolve_state("github/o/r/tree/dev", &MemoryCredentialStore::new())
            .await
            .unwrap();
        assert!(matches!(
            branch.location,
            Location::GitHub { reference: GitRef::Branch(ref b), .. } if b == "dev"
        ));
    }

    struct Unreachable;

    #[async_trait]
    impl HttpClient for Unreachable {
        async fn get(
            &self,
            _url: &str,
            _headers: &[(String, String)],
        ) -> std::result::Result<crate::http::HttpResponse, String> {
            Err("connection refused".into())
        }
    }

    #[tokio::test]
    async fn tag_lookup_failures_are_fatal() {
        let creds = MemoryCredentialStore::new();

        let offline = GitHubProvider::new(Arc::new(Unreachable));
        let err = offline
            .resolve_state("github/o/r@v1", &creds)
            .await
            .unwrap_err();
        match err {
            Error::Fetch { registry, resource, message } => {
                assert_eq!(registry, "github/o/r/tree/v1");
                assert_eq!(resource, "tag lookup");
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let limited = GitHubProvider::new(Arc::new(MemoryHttpClient::new().with(
            "https://api.github.com/repos/o/r/git/ref/tags/v1",
            403,
            "rate limited",
        )));
        let err = limited
            .resolve_state("github/o/r@v1", &creds)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 403, .. }), "{err}");
    }
}
