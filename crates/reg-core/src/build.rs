//! `build`: registry source tree to `registry.json`.

use reg_build::{BuildOutput, RegistryBuilder};
use reg_fs::NormalizedPath;

use crate::error::Result;

/// A written build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub output: BuildOutput,
    pub manifest_path: NormalizedPath,
}

/// Build the registry at `root` from its `registry.config` file and write
/// the manifest.
pub fn build_registry(root: &NormalizedPath) -> Result<BuildSummary> {
    let builder = RegistryBuilder::load(root.clone())?;
    build_with(&builder)
}

/// Build and write with a prepared builder (custom resolvers or rules).
pub fn build_with(builder: &RegistryBuilder) -> Result<BuildSummary> {
    let output = builder.build()?;
    let manifest_path = builder.write(&output)?;
    for warning in &output.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        path = %manifest_path,
        items = output.manifest.items.len(),
        pruned = output.pruned.len(),
        "build finished"
    );
    Ok(BuildSummary {
        output,
        manifest_path,
    })
}
