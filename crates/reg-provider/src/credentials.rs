//! Access tokens for registry hosts.
//!
//! Providers receive a [`CredentialStore`] explicitly; nothing here reads
//! or writes persistent global state.

use std::collections::HashMap;

pub trait CredentialStore: Send + Sync {
    /// Token for `host` (e.g. `github.com`), if any.
    fn token(&self, host: &str) -> Option<String>;
}

/// Reads tokens from environment variables.
///
/// `REGKIT_TOKEN_<HOST>` (host upper-cased, non-alphanumerics replaced by
/// `_`) is checked first, then `GITHUB_TOKEN` / `GITLAB_TOKEN` for hosts
/// of those services.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self
    }

    /// Variables consulted for `host`, in order.
    pub fn variables_for(host: &str) -> Vec<String> {
        let sanitized: String = host
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        let mut vars = vec![format!("REGKIT_TOKEN_{sanitized}")];
        if host == "github.com" || host.ends_with(".github.com") {
            vars.push("GITHUB_TOKEN".to_string());
        }
        if host.contains("gitlab") {
            vars.push("GITLAB_TOKEN".to_string());
        }
        vars
    }
}

impl CredentialStore for EnvCredentialStore {
    fn token(&self, host: &str) -> Option<String> {
        Self::variables_for(host)
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
    }
}

/// An explicit host → token map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    tokens: HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: impl Into<String>, token: impl Into<String>) -> Self {
        self.tokens.insert(host.into(), token.into());
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self, host: &str) -> Option<String> {
        self.tokens.get(host).cloned()
    }
}
