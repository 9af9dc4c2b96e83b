//! Error types for reg-core

/// Result type for reg-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every error a command can end with
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registry was configured or named on an item
    #[error("No registries to search; add `registries` to regkit.toml or qualify the item")]
    NoRegistries,

    #[error("Nothing to add")]
    NothingRequested,

    #[error(transparent)]
    Fs(#[from] reg_fs::Error),

    #[error(transparent)]
    Manifest(#[from] reg_manifest::Error),

    #[error(transparent)]
    Lang(#[from] reg_lang::Error),

    #[error(transparent)]
    Provider(#[from] reg_provider::Error),

    #[error(transparent)]
    Build(#[from] reg_build::Error),

    #[error(transparent)]
    Install(#[from] reg_install::Error),
}
