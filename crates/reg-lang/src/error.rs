//! Error types for reg-lang

/// Result type for reg-lang operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading resolver inputs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid tsconfig at {path}: {reason}")]
    Tsconfig { path: String, reason: String },

    #[error("Invalid dependency manifest at {path}: {reason}")]
    DependencyManifest { path: String, reason: String },

    #[error(transparent)]
    Fs(#[from] reg_fs::Error),
}
