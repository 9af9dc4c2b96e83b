//! Registry providers for regkit.
//!
//! A [`Provider`] knows how to talk to one kind of registry location. It
//! turns a user-supplied registry specifier into a [`RegistryState`] and
//! fetches raw files and the manifest for that state. [`Registry`] bundles
//! a state with its provider so callers never match on provider kinds.

pub mod credentials;
pub mod error;
pub mod http;
pub mod provider;
pub mod providers;
pub mod registry;

pub use credentials::{CredentialStore, EnvCredentialStore, MemoryCredentialStore};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpResponse, MemoryHttpClient, ReqwestClient};
pub use provider::{GitRef, Location, Provider, RegistryState};
pub use providers::{FsProvider, GitHubProvider, GitLabProvider, HttpProvider, Providers};
pub use registry::{Registry, connect_all, fetch_manifests};
