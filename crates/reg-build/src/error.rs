//! Error types for reg-build

/// Result type for reg-build operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a registry build
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {path} (declared by item `{item}`)")]
    FileNotFound { item: String, path: String },

    #[error("File {path} is claimed by both `{first}` and `{second}`")]
    DuplicateFileReference {
        path: String,
        first: String,
        second: String,
    },

    #[error("Could not resolve import `{import}` in {file} (item `{item}`)")]
    ImportedFileNotResolved {
        item: String,
        file: String,
        import: String,
    },

    #[error("Registry validation failed with {} error(s): {}", errors.len(), errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error(transparent)]
    Manifest(#[from] reg_manifest::Error),

    #[error(transparent)]
    Lang(#[from] reg_lang::Error),

    #[error(transparent)]
    Fs(#[from] reg_fs::Error),
}
