//! HTTP transport used by the network providers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET-only client. Errors are transport failures described as
/// text; HTTP error statuses are returned as responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<HttpResponse, String>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("regkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<HttpResponse, String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {}", e))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Canned responses keyed by URL. Unknown URLs answer 404.
///
/// Every request is recorded with its headers so callers can assert on
/// authentication and ordering.
#[derive(Debug, Default)]
pub struct MemoryHttpClient {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MemoryHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(
            url.into(),
            HttpResponse {
                status,
                body: body.into(),
            },
        );
        self
    }

    pub fn with_text(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        let body: String = body.into();
        self.with(url, 200, body.into_bytes())
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.iter().map(|(url, _)| url.clone()).collect())
            .unwrap_or_default()
    }

    /// Headers sent with the first request to `url`.
    pub fn headers_for(&self, url: &str) -> Option<Vec<(String, String)>> {
        self.requests.lock().ok().and_then(|requests| {
            requests
                .iter()
                .find(|(u, _)| u == url)
                .map(|(_, headers)| headers.clone())
        })
    }
}

#[async_trait]
impl HttpClient for MemoryHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> std::result::Result<HttpResponse, String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((url.to_string(), headers.to_vec()));
        }
        Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            body: Vec::new(),
        }))
    }
}
