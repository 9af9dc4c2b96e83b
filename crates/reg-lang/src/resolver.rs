//! The language resolver contract and the plugin list.

use std::collections::BTreeMap;
use std::sync::Arc;

use reg_manifest::UnresolvedImport;
use serde_json::{Map, Value};

use crate::js::JsResolver;
use crate::search::LocalMatch;

/// How a literal reference is written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `./x`, `../x`: resolved against the importing file's directory.
    Relative,
    /// Not relative and not a valid package name (`@/lib/utils`, `~/x`).
    /// Only a path alias can make sense of it.
    AliasCandidate,
    /// Syntactically a package specifier. May still be an alias when the
    /// project maps it (`components/button` under a `baseUrl`).
    Bare,
}

/// One literal reference found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub specifier: String,
    pub kind: ReferenceKind,
}

impl Reference {
    pub fn new(specifier: impl Into<String>, kind: ReferenceKind) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
        }
    }
}

/// References in first-seen order plus non-fatal extraction warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceList {
    pub references: Vec<Reference>,
    pub warnings: Vec<String>,
}

impl ReferenceList {
    /// Add a reference unless the same specifier was already recorded.
    pub fn push(&mut self, reference: Reference) {
        if !self
            .references
            .iter()
            .any(|r| r.specifier == reference.specifier)
        {
            self.references.push(reference);
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn specifiers(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.specifier.as_str()).collect()
    }
}

/// A per-language plugin.
///
/// Implementations keep every syntax detail to themselves. The build core
/// only sees literal specifiers, and the install engine only hands back the
/// opaque metadata the plugin attached to a template.
pub trait LanguageResolver: Send + Sync {
    /// Unique plugin name, persisted in import templates.
    fn name(&self) -> &str;

    /// Ecosystem tag given to the remote dependencies this plugin finds.
    fn ecosystem(&self) -> &str;

    fn can_handle(&self, file_name: &str) -> bool;

    /// Extract literal references from `content`.
    ///
    /// Non-literal dynamic references are reported as warnings.
    fn extract_references(&self, content: &str, file_name: &str) -> ReferenceList;

    /// Extensions appended to an extensionless specifier, in priority order.
    fn resolution_extensions(&self) -> &[&'static str] {
        &[]
    }

    /// Source extensions a compiled extension may stand for.
    fn source_extensions_for(&self, _compiled: &str) -> &[&'static str] {
        &[]
    }

    /// Runtime-internal modules that never become dependencies.
    fn is_builtin(&self, _specifier: &str) -> bool {
        false
    }

    /// The installable package a bare specifier refers to, or `None` when
    /// the specifier is not a valid package name for this ecosystem.
    fn package_name(&self, specifier: &str) -> Option<String>;

    /// File name of the ecosystem's project dependency manifest.
    fn dependency_manifest(&self) -> Option<&str> {
        None
    }

    /// Package → version pairs declared in a dependency manifest.
    fn read_dependency_versions(&self, _content: &str) -> Option<BTreeMap<String, String>> {
        None
    }

    /// Metadata stored with a template so the import can be re-rendered in
    /// the same style once the target location is known.
    fn template_meta(&self, _specifier: &str, _found: &LocalMatch) -> Map<String, Value> {
        Map::new()
    }

    /// Render the replacement import text.
    ///
    /// `path` points at the installed target file, either relative to the
    /// importing file (`./x.ts`, `../lib/x.ts`) or alias-qualified
    /// (`@/lib/x.ts`).
    fn render_import(&self, _template: &UnresolvedImport, path: &str) -> String {
        path.to_string()
    }
}

/// The set of available language plugins.
#[derive(Clone, Default)]
pub struct Resolvers {
    plugins: Vec<Arc<dyn LanguageResolver>>,
}

impl Resolvers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plugins shipped with regkit.
    pub fn with_builtins() -> Self {
        Self::new().with(JsResolver::new())
    }

    pub fn with(mut self, plugin: impl LanguageResolver + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// The plugin handling `file_name`.
    ///
    /// No match is not an error; the file simply has no discoverable
    /// dependencies. When several plugins match, the first registered wins.
    pub fn for_file(&self, file_name: &str) -> Option<&dyn LanguageResolver> {
        let mut matching = self.plugins.iter().filter(|p| p.can_handle(file_name));
        let first = matching.next();
        match first {
            None => {
                tracing::warn!(file = file_name, "no language resolver handles this file");
                None
            }
            Some(plugin) => {
                let others: Vec<&str> = matching.map(|p| p.name()).collect();
                if !others.is_empty() {
                    tracing::warn!(
                        file = file_name,
                        chosen = plugin.name(),
                        ignored = ?others,
                        "multiple language resolvers match"
                    );
                }
                Some(plugin.as_ref())
            }
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn LanguageResolver> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }
}

impl std::fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolvers")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Markdown;

    impl LanguageResolver for Markdown {
        fn name(&self) -> &str {
            "md"
        }
        fn ecosystem(&self) -> &str {
            "none"
        }
        fn can_handle(&self, file_name: &str) -> bool {
            file_name.ends_with(".md")
        }
        fn extract_references(&self, _content: &str, _file_name: &str) -> ReferenceList {
            ReferenceList::default()
        }
        fn package_name(&self, _specifier: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn selects_by_file_name() {
        let resolvers = Resolvers::with_builtins().with(Markdown);
        assert_eq!(resolvers.for_file("a.ts").unwrap().name(), "js");
        assert_eq!(resolvers.for_file("README.md").unwrap().name(), "md");
        assert!(resolvers.for_file("logo.png").is_none());
        assert!(resolvers.by_name("md").is_some());
        assert!(resolvers.by_name("py").is_none());
    }

    #[test]
    fn reference_list_dedupes() {
        let mut list = ReferenceList::default();
        list.push(Reference::new("./a", ReferenceKind::Relative));
        list.push(Reference::new("./a", ReferenceKind::Relative));
        list.push(Reference::new("react", ReferenceKind::Bare));
        assert_eq!(list.specifiers(), vec!["./a", "react"]);
    }
}
