//! Deferred import rewrites persisted in the manifest.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An import whose target item is known at build time but whose final
/// install path is only known once the consumer's layout is.
///
/// `meta` is opaque to everything except the language resolver named by
/// `resolver`, which alone interprets it when rendering the replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedImport {
    /// The literal import text as it appears in the source file.
    pub import: String,
    /// Name of the item that owns the imported file.
    pub item: String,
    /// Item-relative path of the imported file.
    pub file: String,
    /// Name of the language resolver that produced this template.
    pub resolver: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl UnresolvedImport {
    pub fn new(
        import: impl Into<String>,
        item: impl Into<String>,
        file: impl Into<String>,
        resolver: impl Into<String>,
    ) -> Self {
        Self {
            import: import.into(),
            item: item.into(),
            file: file.into(),
            resolver: resolver.into(),
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = meta;
        self
    }
}
