use std::path::PathBuf;

/// Errors raised while reading, validating or writing registry data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Item name does not satisfy the naming rules.
    #[error("invalid item name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Two items share a name.
    #[error("duplicate item name '{0}'")]
    DuplicateItem(String),

    /// An item lists itself as a registry dependency.
    #[error("item '{item}' depends on itself")]
    SelfReference { item: String },

    /// Invalid semver version string for the registry.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    /// A remote dependency declaration could not be parsed.
    #[error("invalid dependency '{spec}': {reason}")]
    InvalidDependency { spec: String, reason: String },

    /// Failed to parse a manifest document.
    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    /// Registry configuration file not found at the expected location.
    #[error("registry configuration not found in {0}")]
    ConfigNotFound(PathBuf),

    /// Filesystem or config-format error.
    #[error(transparent)]
    Fs(#[from] reg_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
