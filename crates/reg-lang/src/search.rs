//! Filesystem lookup of local references.

use reg_fs::NormalizedPath;

use crate::resolver::LanguageResolver;

/// Which fallback located a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The specifier named the file exactly.
    Exact,
    /// The specifier used a compiled extension (`.js`) for a source file
    /// (`.ts`).
    CompiledExtension,
    /// The specifier omitted the extension.
    Extensionless,
    /// The specifier named a directory containing an index file.
    DirectoryIndex,
}

/// A file found for a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMatch {
    pub path: NormalizedPath,
    pub kind: MatchKind,
}

/// Find the file a local specifier refers to.
///
/// `candidate` is the specifier already joined onto its base directory.
/// Tried in order: the exact path, source files for a compiled extension,
/// the resolver's extensions appended, then `index.<ext>` inside a
/// directory.
pub fn resolve_local(
    candidate: &NormalizedPath,
    resolver: &dyn LanguageResolver,
) -> Option<LocalMatch> {
    if candidate.is_file() {
        return Some(LocalMatch {
            path: candidate.clone(),
            kind: MatchKind::Exact,
        });
    }

    if let Some(ext) = candidate.extension() {
        for source_ext in resolver.source_extensions_for(ext) {
            let path = candidate.with_extension(source_ext);
            if path.is_file() {
                return Some(LocalMatch {
                    path,
                    kind: MatchKind::CompiledExtension,
                });
            }
        }
    }

    for ext in resolver.resolution_extensions() {
        // Appended, not replaced: `./add.test` means `add.test.ts`.
        let path = NormalizedPath::new(format!("{}.{}", candidate, ext));
        if path.is_file() {
            return Some(LocalMatch {
                path,
                kind: MatchKind::Extensionless,
            });
        }
    }

    if candidate.is_dir() {
        for ext in resolver.resolution_extensions() {
            let path = candidate.join(&format!("index.{}", ext));
            if path.is_file() {
                return Some(LocalMatch {
                    path,
                    kind: MatchKind::DirectoryIndex,
                });
            }
        }
    }

    None
}
