//! JavaScript / TypeScript resolver.
//!
//! Extraction is regex based and deliberately shallow: it sees literal
//! specifiers in `import`/`export ... from`, side-effect imports, literal
//! `import()` and `require()`. Comments are stripped first so commented-out
//! imports are ignored.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use reg_fs::NormalizedPath;
use reg_manifest::UnresolvedImport;
use serde_json::{Map, Value};

use crate::resolver::{LanguageResolver, Reference, ReferenceKind, ReferenceList};
use crate::search::{LocalMatch, MatchKind};

static STATIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?:^|[^\w$.])(?:import|export)\s*(?:type\s+)?(?:[\w$*{}\s,]+?\s*from\s*)?["']([^"'\n]+)["']"#,
    )
    .expect("valid static import pattern")
});

static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*["'`]([^"'`$\n]+)["'`]\s*\)"#).expect("valid import() pattern")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*["'`]([^"'`$\n]+)["'`]\s*\)"#).expect("valid require pattern")
});

static NON_LITERAL_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*([^\s)"'`][^)]*|`[^`]*\$\{[^`]*`)\s*\)"#)
        .expect("valid non-literal import pattern")
});

const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Template rendering styles stored under `meta.style`.
const STYLE_EXACT: &str = "exact";
const STYLE_EXTENSIONLESS: &str = "extensionless";
const STYLE_COMPILED: &str = "compiled";
const STYLE_INDEX: &str = "index";

/// The built-in JavaScript / TypeScript plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsResolver;

impl JsResolver {
    pub fn new() -> Self {
        Self
    }

    fn classify(&self, specifier: &str) -> ReferenceKind {
        if is_relative(specifier) {
            ReferenceKind::Relative
        } else if self.is_builtin(specifier) || self.package_name(specifier).is_some() {
            ReferenceKind::Bare
        } else {
            ReferenceKind::AliasCandidate
        }
    }
}

impl LanguageResolver for JsResolver {
    fn name(&self) -> &str {
        "js"
    }

    fn ecosystem(&self) -> &str {
        "js"
    }

    fn can_handle(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && EXTENSIONS.contains(&ext))
    }

    fn extract_references(&self, content: &str, file_name: &str) -> ReferenceList {
        let code = strip_comments(content);

        let mut found: Vec<(usize, &str)> = Vec::new();
        for pattern in [&*STATIC_IMPORT, &*DYNAMIC_IMPORT, &*REQUIRE] {
            for caps in pattern.captures_iter(&code) {
                if let Some(m) = caps.get(1) {
                    found.push((m.start(), m.as_str()));
                }
            }
        }
        found.sort_by_key(|(pos, _)| *pos);

        let mut list = ReferenceList::default();
        for (_, specifier) in found {
            let specifier = specifier.trim();
            if !specifier.is_empty() {
                list.push(Reference::new(specifier, self.classify(specifier)));
            }
        }

        for caps in NON_LITERAL_IMPORT.captures_iter(&code) {
            let expr = caps.get(1).map_or("", |m| m.as_str()).trim();
            let message = format!("{file_name}: skipping non-literal dynamic import `{expr}`");
            tracing::warn!("{}", message);
            list.warn(message);
        }

        list
    }

    fn resolution_extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn source_extensions_for(&self, compiled: &str) -> &[&'static str] {
        match compiled {
            "js" => &["ts", "tsx"],
            "jsx" => &["tsx"],
            "mjs" => &["mts"],
            "cjs" => &["cts"],
            _ => &[],
        }
    }

    fn is_builtin(&self, specifier: &str) -> bool {
        if specifier.starts_with("node:") {
            return true;
        }
        let root = specifier.split('/').next().unwrap_or(specifier);
        NODE_BUILTINS.contains(&root)
    }

    fn package_name(&self, specifier: &str) -> Option<String> {
        let name = if specifier.starts_with('@') {
            let mut parts = specifier.splitn(3, '/');
            match (parts.next(), parts.next()) {
                (Some(scope), Some(pkg)) => format!("{scope}/{pkg}"),
                _ => return None,
            }
        } else {
            specifier.split('/').next()?.to_string()
        };
        is_valid_package_name(&name).then_some(name)
    }

    fn dependency_manifest(&self) -> Option<&str> {
        Some("package.json")
    }

    fn read_dependency_versions(&self, content: &str) -> Option<BTreeMap<String, String>> {
        let json: Value = serde_json::from_str(content).ok()?;
        let mut versions = BTreeMap::new();
        // Later sections override earlier ones.
        for section in ["peerDependencies", "devDependencies", "dependencies"] {
            if let Some(deps) = json.get(section).and_then(Value::as_object) {
                for (name, version) in deps {
                    if let Some(version) = version.as_str() {
                        versions.insert(name.clone(), version.to_string());
                    }
                }
            }
        }
        Some(versions)
    }

    fn template_meta(&self, specifier: &str, found: &LocalMatch) -> Map<String, Value> {
        let mut meta = Map::new();
        let style = match found.kind {
            MatchKind::Exact => STYLE_EXACT,
            MatchKind::Extensionless => STYLE_EXTENSIONLESS,
            MatchKind::DirectoryIndex => STYLE_INDEX,
            MatchKind::CompiledExtension => {
                if let Some(ext) = NormalizedPath::new(specifier).extension() {
                    meta.insert("extension".into(), Value::from(ext));
                }
                STYLE_COMPILED
            }
        };
        meta.insert("style".into(), Value::from(style));
        meta
    }

    fn render_import(&self, template: &UnresolvedImport, path: &str) -> String {
        let style = template
            .meta
            .get("style")
            .and_then(Value::as_str)
            .unwrap_or(STYLE_EXACT);
        match style {
            STYLE_EXTENSIONLESS => strip_extension(path).to_string(),
            STYLE_COMPILED => match template.meta.get("extension").and_then(Value::as_str) {
                Some(ext) => format!("{}.{}", strip_extension(path), ext),
                None => path.to_string(),
            },
            STYLE_INDEX => match path.rsplit_once('/') {
                Some((dir, _)) if !dir.is_empty() => dir.to_string(),
                _ => ".".to_string(),
            },
            _ => path.to_string(),
        }
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// npm package name rules: lowercase, URL-safe, at most 214 characters,
/// no leading `.` or `_`, optional `@scope/` prefix.
pub fn is_valid_package_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 214 {
        return false;
    }
    let (scope, pkg) = match name.strip_prefix('@') {
        Some(rest) => match rest.split_once('/') {
            Some((scope, pkg)) => (Some(scope), pkg),
            None => return false,
        },
        None => (None, name),
    };
    let valid_part = |part: &str| {
        !part.is_empty()
            && !part.starts_with('.')
            && !part.starts_with('_')
            && part.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_')
            })
    };
    scope.is_none_or(valid_part) && valid_part(pkg)
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Remove `//` and `/* */` comments while leaving string and template
/// literals intact. Also used for JSON-with-comments files.
pub(crate) fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn extracts_all_literal_forms_in_order() {
        let source = r#"
import { add } from "./math/add";
import type { Props } from '@/types';
import * as path from "node:path";
import "./side-effect.css";
export { sub } from "../sub.js";
export * from "lodash/fp";
const lazy = await import("./lazy");
const fs = require('fs');
// import { gone } from "./commented";
/* import "./also-gone"; */
"#;
        let list = JsResolver.extract_references(source, "a.ts");
        assert_eq!(
            list.specifiers(),
            vec![
                "./math/add",
                "@/types",
                "node:path",
                "./side-effect.css",
                "../sub.js",
                "lodash/fp",
                "./lazy",
                "fs",
            ]
        );
        assert!(list.warnings.is_empty());
    }

    #[test]
    fn multiline_import_clause() {
        let source = "import {\n  a,\n  b,\n} from \"@scope/pkg/sub\";\n";
        let list = JsResolver.extract_references(source, "a.ts");
        assert_eq!(list.specifiers(), vec!["@scope/pkg/sub"]);
        assert_eq!(list.references[0].kind, ReferenceKind::Bare);
    }

    #[test]
    fn non_literal_dynamic_import_warns() {
        let source = "const m = await import(name);\nconst n = await import(`./x/${name}`);\n";
        let list = JsResolver.extract_references(source, "a.ts");
        assert!(list.references.is_empty());
        assert_eq!(list.warnings.len(), 2);
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let source = "const url = \"https://example.com\";\nimport x from \"./x\";\n";
        let list = JsResolver.extract_references(source, "a.ts");
        assert_eq!(list.specifiers(), vec!["./x"]);
    }

    #[rstest]
    #[case("./a", ReferenceKind::Relative)]
    #[case("..", ReferenceKind::Relative)]
    #[case("react", ReferenceKind::Bare)]
    #[case("@radix-ui/react-slot", ReferenceKind::Bare)]
    #[case("node:fs", ReferenceKind::Bare)]
    #[case("@/lib/utils", ReferenceKind::AliasCandidate)]
    #[case("~/utils", ReferenceKind::AliasCandidate)]
    #[case("$lib/x", ReferenceKind::AliasCandidate)]
    #[case("React", ReferenceKind::AliasCandidate)]
    fn classification(#[case] specifier: &str, #[case] kind: ReferenceKind) {
        assert_eq!(JsResolver.classify(specifier), kind);
    }

    #[rstest]
    #[case("react-dom/client", Some("react-dom"))]
    #[case("@scope/pkg/deep/path", Some("@scope/pkg"))]
    #[case("@scope", None)]
    #[case("_private", None)]
    #[case("Upper", None)]
    fn package_names(#[case] specifier: &str, #[case] expected: Option<&str>) {
        assert_eq!(JsResolver.package_name(specifier).as_deref(), expected);
    }

    #[test]
    fn builtins() {
        assert!(JsResolver.is_builtin("fs/promises"));
        assert!(JsResolver.is_builtin("node:test"));
        assert!(!JsResolver.is_builtin("react"));
    }

    #[test]
    fn dependency_versions_prefer_runtime_section() {
        let versions = JsResolver
            .read_dependency_versions(
                r#"{"dependencies": {"react": "^18.2.0"}, "devDependencies": {"react": "^17", "vitest": "1.0.0"}}"#,
            )
            .unwrap();
        assert_eq!(versions["react"], "^18.2.0");
        assert_eq!(versions["vitest"], "1.0.0");
        assert!(JsResolver.read_dependency_versions("not json").is_none());
    }

    fn template_for(specifier: &str, kind: MatchKind) -> UnresolvedImport {
        let found = LocalMatch {
            path: NormalizedPath::new("x"),
            kind,
        };
        UnresolvedImport::new(specifier, "item", "file.ts", "js")
            .with_meta(JsResolver.template_meta(specifier, &found))
    }

    #[rstest]
    #[case("./a", MatchKind::Extensionless, "../lib/utils.ts", "../lib/utils")]
    #[case("./a.js", MatchKind::CompiledExtension, "@/lib/utils.ts", "@/lib/utils.js")]
    #[case("./a.ts", MatchKind::Exact, "./utils.ts", "./utils.ts")]
    #[case("./utils", MatchKind::DirectoryIndex, "@/lib/utils/index.ts", "@/lib/utils")]
    #[case("./utils", MatchKind::DirectoryIndex, "./index.ts", ".")]
    fn renders_in_original_style(
        #[case] specifier: &str,
        #[case] kind: MatchKind,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        let template = template_for(specifier, kind);
        assert_eq!(JsResolver.render_import(&template, path), expected);
    }

    #[test]
    fn missing_meta_keeps_path() {
        let template = UnresolvedImport::new("./a", "item", "a.ts", "js");
        assert_eq!(JsResolver.render_import(&template, "./a.ts"), "./a.ts");
    }
}
