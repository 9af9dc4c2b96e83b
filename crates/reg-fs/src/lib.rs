//! Filesystem abstraction for regkit
//!
//! Provides forward-slash normalized paths, relative path computation,
//! atomic I/O and format-agnostic configuration loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
