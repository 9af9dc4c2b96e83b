//! tsconfig-style path aliases.
//!
//! A pattern is either exact (`"$lib"`) or contains a single `*`
//! (`"@/*"`). When several wildcard patterns match, the one with the
//! longest literal prefix wins; an exact pattern beats any wildcard.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use reg_fs::{NormalizedPath, io};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::js::strip_comments;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid trailing comma pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasPattern {
    pattern: String,
    prefix: String,
    /// `None` for exact patterns.
    suffix: Option<String>,
    targets: Vec<String>,
}

impl AliasPattern {
    fn parse(pattern: &str, targets: &[String]) -> Self {
        let (prefix, suffix) = match pattern.split_once('*') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (pattern.to_string(), None),
        };
        Self {
            pattern: pattern.to_string(),
            prefix,
            suffix,
            targets: targets.to_vec(),
        }
    }

    /// The text matched by `*`, or `""` for an exact match.
    fn capture<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        match &self.suffix {
            None => (specifier == self.prefix).then_some(""),
            Some(suffix) => {
                let rest = specifier.strip_prefix(&self.prefix)?;
                if rest.len() < suffix.len() {
                    return None;
                }
                rest.strip_suffix(suffix.as_str())
            }
        }
    }
}

/// Maps alias specifiers to candidate filesystem paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAliasMatcher {
    base: NormalizedPath,
    patterns: Vec<AliasPattern>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    #[serde(default)]
    compiler_options: Option<TsCompilerOptions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsCompilerOptions {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    paths: BTreeMap<String, Vec<String>>,
}

impl PathAliasMatcher {
    /// Build a matcher whose targets are relative to `base`.
    pub fn new(base: NormalizedPath, aliases: &BTreeMap<String, Vec<String>>) -> Self {
        let mut patterns: Vec<AliasPattern> = aliases
            .iter()
            .map(|(pattern, targets)| AliasPattern::parse(pattern, targets))
            .collect();
        // Exact first, then longest prefix.
        patterns.sort_by(|a, b| {
            a.suffix
                .is_some()
                .cmp(&b.suffix.is_some())
                .then(b.prefix.len().cmp(&a.prefix.len()))
        });
        Self { base, patterns }
    }

    pub fn empty(base: NormalizedPath) -> Self {
        Self {
            base,
            patterns: Vec::new(),
        }
    }

    /// Load `compilerOptions.paths` from `dir/tsconfig.json`.
    ///
    /// Returns `None` when there is no tsconfig or it declares no paths.
    pub fn from_tsconfig(dir: &NormalizedPath) -> Result<Option<Self>> {
        let path = dir.join("tsconfig.json");
        let Some(content) = io::read_text_if_exists(&path)? else {
            return Ok(None);
        };
        let cleaned = strip_comments(&content);
        let cleaned = TRAILING_COMMA.replace_all(&cleaned, "$1");
        let config: TsConfig = serde_json::from_str(&cleaned).map_err(|e| Error::Tsconfig {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let Some(options) = config.compiler_options else {
            return Ok(None);
        };
        if options.paths.is_empty() {
            return Ok(None);
        }
        let base = dir.join(options.base_url.as_deref().unwrap_or("."));
        tracing::debug!(tsconfig = %path, aliases = options.paths.len(), "loaded path aliases");
        Ok(Some(Self::new(base, &options.paths)))
    }

    pub fn base(&self) -> &NormalizedPath {
        &self.base
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn best_match<'a>(&self, specifier: &'a str) -> Option<(&AliasPattern, &'a str)> {
        self.patterns
            .iter()
            .find_map(|p| p.capture(specifier).map(|captured| (p, captured)))
    }

    pub fn matches(&self, specifier: &str) -> bool {
        self.best_match(specifier).is_some()
    }

    /// The pattern that would handle `specifier`, e.g. `"@/*"`.
    pub fn matched_pattern(&self, specifier: &str) -> Option<&str> {
        self.best_match(specifier).map(|(p, _)| p.pattern.as_str())
    }

    /// Candidate paths for `specifier`, in target order. Empty when no
    /// pattern matches.
    pub fn candidates(&self, specifier: &str) -> Vec<NormalizedPath> {
        let Some((pattern, captured)) = self.best_match(specifier) else {
            return Vec::new();
        };
        pattern
            .targets
            .iter()
            .map(|target| self.base.join(&target.replacen('*', captured, 1)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aliases(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn longest_prefix_wins() {
        let matcher = PathAliasMatcher::new(
            NormalizedPath::new("."),
            &aliases(&[("@/*", &["./src/*"]), ("@/ui/*", &["./components/ui/*"])]),
        );
        assert_eq!(
            matcher.candidates("@/ui/button"),
            vec![NormalizedPath::new("components/ui/button")]
        );
        assert_eq!(
            matcher.candidates("@/lib/utils"),
            vec![NormalizedPath::new("src/lib/utils")]
        );
        assert_eq!(matcher.matched_pattern("@/ui/x"), Some("@/ui/*"));
        assert!(matcher.candidates("react").is_empty());
    }

    #[test]
    fn exact_patterns_and_suffixes() {
        let matcher = PathAliasMatcher::new(
            NormalizedPath::new("/repo"),
            &aliases(&[("$lib", &["src/lib"]), ("#*.css", &["styles/*.css"])]),
        );
        assert_eq!(
            matcher.candidates("$lib"),
            vec![NormalizedPath::new("/repo/src/lib")]
        );
        assert!(!matcher.matches("$lib/x"));
        assert_eq!(
            matcher.candidates("#theme.css"),
            vec![NormalizedPath::new("/repo/styles/theme.css")]
        );
    }

    #[test]
    fn loads_tsconfig_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tsconfig.json"),
            r#"{
  // editor settings
  "compilerOptions": {
    "baseUrl": "src", /* relative to this file */
    "paths": { "~/*": ["./*"], },
  },
}"#,
        )
        .unwrap();
        let root = NormalizedPath::new(dir.path());
        let matcher = PathAliasMatcher::from_tsconfig(&root).unwrap().unwrap();
        assert_eq!(matcher.candidates("~/a/b"), vec![root.join("src/a/b")]);
    }

    #[test]
    fn missing_tsconfig_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let root = NormalizedPath::new(dir.path());
        assert!(PathAliasMatcher::from_tsconfig(&root).unwrap().is_none());
    }
}
