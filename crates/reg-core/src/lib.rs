//! regkit orchestration.
//!
//! The entry points a command line or editor integration calls:
//! [`build_registry`] for registry authors and [`Project::add_items`] for
//! consumers. Both return reports and leave presentation, prompting and
//! process exit to the caller.

pub mod add;
pub mod build;
pub mod config;
pub mod error;
pub mod logging;

pub use add::Project;
pub use build::{BuildSummary, build_registry, build_with};
pub use config::{IncludeRoles, PROJECT_CONFIG_STEM, ProjectConfig};
pub use error::{Error, Result};
