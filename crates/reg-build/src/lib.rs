//! The regkit build engine.
//!
//! Turns a registry source tree plus its [`RegistryConfig`] into a
//! validated [`Manifest`]:
//!
//! 1. [`collect`] expands declared files and folders,
//! 2. [`DependencyResolver`] discovers item and package dependencies and
//!    records import templates,
//! 3. the [`RuleEngine`] lints the assembled manifest,
//! 4. unused items are pruned and the result is written out.
//!
//! [`RegistryConfig`]: reg_manifest::RegistryConfig
//! [`Manifest`]: reg_manifest::Manifest

pub mod build;
pub mod collect;
pub mod error;
pub mod resolve;
pub mod rules;

pub use build::{BuildOutput, RegistryBuilder};
pub use collect::{CollectedFile, CollectedItem, collect};
pub use error::{Error, Result};
pub use resolve::DependencyResolver;
pub use rules::{Rule, RuleEngine, RuleMessage, RuleOptions, RuleReport, RuleScope};
