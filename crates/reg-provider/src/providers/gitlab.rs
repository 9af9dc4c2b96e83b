//! GitLab projects, including self-hosted instances.
//!
//! Accepted forms: `gitlab/group/project`, `gitlab:group/project`,
//! `https://gitlab.com/group/project`, and `gitlab:https://host/group/project`
//! for other hosts. Nested groups are supported; a ref is given as
//! `/-/tree/<ref>` or `@<ref>`. All reads go through the v4 API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::provider::{GitRef, Location, Provider, RegistryState, checked_resource};
use crate::providers::{get_checked, resource_exists, split_ref_suffix};

const DEFAULT_HOST: &str = "https://gitlab.com";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProjectSpec {
    host: String,
    project: String,
    reference: Option<String>,
}

#[derive(Deserialize)]
struct ProjectInfo {
    default_branch: String,
}

pub struct GitLabProvider {
    client: Arc<dyn HttpClient>,
}

impl GitLabProvider {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    fn parse_spec(spec: &str) -> Result<ProjectSpec> {
        let invalid = |reason: &str| Error::InvalidUrl {
            url: spec.to_string(),
            reason: reason.to_string(),
        };

        let (host, rest) = if let Some(rest) = spec.strip_prefix("https://gitlab.com/") {
            (DEFAULT_HOST.to_string(), rest.to_string())
        } else if let Some(rest) = spec
            .strip_prefix("gitlab/")
            .or_else(|| spec.strip_prefix("gitlab:"))
        {
            if rest.starts_with("https://") || rest.starts_with("http://") {
                let url = Url::parse(rest).map_err(|e| invalid(&e.to_string()))?;
                let host = url
                    .host_str()
                    .ok_or_else(|| invalid("missing host"))?
                    .to_string();
                let origin = match url.port() {
                    Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                    None => format!("{}://{}", url.scheme(), host),
                };
                (origin, url.path().trim_start_matches('/').to_string())
            } else {
                (DEFAULT_HOST.to_string(), rest.to_string())
            }
        } else {
            return Err(invalid("not a GitLab registry"));
        };

        let (rest, at_ref) = split_ref_suffix(rest.trim_end_matches('/'));
        let (project, tree_ref) = match rest.split_once("/-/") {
            Some((project, tail)) => {
                let reference = tail
                    .strip_prefix("tree/")
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| invalid("expected /-/tree/<ref>"))?;
                (project, Some(reference.to_string()))
            }
            None => (rest, None),
        };

        let project = project.trim_end_matches(".git");
        if project.split('/').filter(|s| !s.is_empty()).count() < 2 {
            return Err(invalid("expected group/project"));
        }

        Ok(ProjectSpec {
            host,
            project: project.to_string(),
            reference: at_ref.map(str::to_string).or(tree_ref),
        })
    }

    fn host_name(host: &str) -> String {
        Url::parse(host)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| host.to_string())
    }

    /// `{host}/api/v4/projects/{project}/...` with every segment escaped,
    /// so `group/project` becomes `group%2Fproject`.
    fn api_url(host: &str, project: &str, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(host).map_err(|e| Error::InvalidUrl {
            url: host.to_string(),
            reason: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                url: host.to_string(),
                reason: "host cannot be a base URL".into(),
            })?
            .pop_if_empty()
            .extend(["api", "v4", "projects", project])
            .extend(tail);
        Ok(url)
    }

    fn auth_headers(token: Option<&str>) -> Vec<(String, String)> {
        token
            .map(|t| vec![("PRIVATE-TOKEN".to_string(), t.to_string())])
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for GitLabProvider {
    fn name(&self) -> &str {
        "gitlab"
    }

    fn matches(&self, spec: &str) -> bool {
        spec.starts_with("gitlab/")
            || spec.starts_with("gitlab:")
            || spec.starts_with("https://gitlab.com/")
    }

    fn parse(&self, spec: &str) -> Result<String> {
        let parsed = Self::parse_spec(spec)?;
        let mut url = if parsed.host == DEFAULT_HOST {
            format!("gitlab/{}", parsed.project)
        } else {
            format!("gitlab:{}/{}", parsed.host, parsed.project)
        };
        if let Some(reference) = &parsed.reference {
            url.push_str("/-/tree/");
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
        let token = credentials.token(&Self::host_name(&parsed.host));
        let headers = Self::auth_headers(token.as_deref());

        let reference = match &parsed.reference {
            None => {
                let api = Self::api_url(&parsed.host, &parsed.project, &[])?;
                let body = get_checked(
                    self.client.as_ref(),
                    &url,
                    "project metadata",
                    api.as_str(),
                    &headers,
                )
                .await?;
                let info: ProjectInfo = serde_json::from_slice(&body)
                    .map_err(|e| Error::fetch(&url, "project metadata", e))?;
                GitRef::Branch(info.default_branch)
            }
            Some(reference) => {
                let api = Self::api_url(
                    &parsed.host,
                    &parsed.project,
                    &["repository", "tags", reference.as_str()],
                )?;
                let tagged = resource_exists(
                    self.client.as_ref(),
                    &url,
                    "tag lookup",
                    api.as_str(),
                    &headers,
                )
                .await?;
                if tagged {
                    GitRef::Tag(reference.clone())
                } else {
                    GitRef::Branch(reference.clone())
                }
            }
        };
        tracing::debug!(registry = %url, reference = reference.as_str(), "resolved GitLab ref");

        Ok(RegistryState {
            url,
            provider: self.name().to_string(),
            location: Location::GitLab {
                host: parsed.host,
                project: parsed.project,
                reference,
            },
            token,
        })
    }

    async fn fetch_raw(&self, state: &RegistryState, path: &str) -> Result<Vec<u8>> {
        let Location::GitLab {
            host,
            project,
            reference,
        } = &state.location
        else {
            return Err(Error::fetch(&state.url, path, "not a GitLab registry"));
        };
        let resource = checked_resource(state, path)?;
        let mut api = Self::api_url(
            host,
            project,
            &["repository", "files", resource.as_str(), "raw"],
        )?;
        api.query_pairs_mut().append_pair("ref", reference.as_str());
        get_checked(
            self.client.as_ref(),
            &state.url,
            &resource,
            api.as_str(),
            &Self::auth_headers(state.token.as_deref()),
        )
        .await
    }
}
