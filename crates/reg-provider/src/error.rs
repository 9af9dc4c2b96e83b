//! Error types for reg-provider

/// Result type for reg-provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving or fetching from a registry.
///
/// Every fetch error names the registry and the resource so a failure in
/// a concurrent batch can be traced back to its origin.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No provider supports registry `{0}`")]
    UnsupportedRegistry(String),

    #[error("Invalid registry `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {resource} from {registry}: {message}")]
    Fetch {
        registry: String,
        resource: String,
        message: String,
    },

    #[error("Fetching {resource} from {registry} returned HTTP {status}")]
    Status {
        registry: String,
        resource: String,
        status: u16,
    },

    #[error("Invalid manifest from {registry}: {reason}")]
    ManifestParse { registry: String, reason: String },

    #[error("Path `{path}` escapes registry {registry}")]
    PathEscape { registry: String, path: String },
}

impl Error {
    pub fn fetch(
        registry: impl Into<String>,
        resource: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Fetch {
            registry: registry.into(),
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// The registry the failing request targeted, when known.
    pub fn registry(&self) -> Option<&str> {
        match self {
            Self::Fetch { registry, .. }
            | Self::Status { registry, .. }
            | Self::ManifestParse { registry, .. }
            | Self::PathEscape { registry, .. } => Some(registry),
            Self::InvalidUrl { url, .. } => Some(url),
            Self::UnsupportedRegistry(url) => Some(url),
        }
    }
}
