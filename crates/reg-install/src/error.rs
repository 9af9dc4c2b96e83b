//! Error types for reg-install

/// Result type for reg-install operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an install
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid item specifier `{0}`")]
    InvalidSpecifier(String),

    #[error("Item `{item}` was not found in {}", registries.join(", "))]
    NotFound {
        item: String,
        registries: Vec<String>,
    },

    #[error("Item `{item}` exists in several registries ({}); qualify it as <registry>/{item}", registries.join(", "))]
    Ambiguous {
        item: String,
        registries: Vec<String>,
    },

    #[error("Registry `{0}` is not among the configured registries")]
    UnknownRegistry(String),

    #[error("Item `{item}` in {registry} depends on `{dependency}`, which that registry does not contain")]
    UnknownDependency {
        registry: String,
        item: String,
        dependency: String,
    },

    #[error("No install path configured for `{item_type}` (item `{item}`)")]
    NoInstallPath { item: String, item_type: String },

    #[error("Path `{path}` matches alias `{alias}` but the alias has no target")]
    EmptyAlias { path: String, alias: String },

    #[error(transparent)]
    Provider(#[from] reg_provider::Error),

    #[error(transparent)]
    Manifest(#[from] reg_manifest::Error),

    #[error(transparent)]
    Fs(#[from] reg_fs::Error),
}
