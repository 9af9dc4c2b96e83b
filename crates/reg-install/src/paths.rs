//! Install locations in the consumer project.

use std::collections::BTreeMap;

use reg_fs::NormalizedPath;
use reg_lang::PathAliasMatcher;
use reg_manifest::{ResolvedFile, ResolvedItem};

use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Catch-all key in path tables.
pub const ANY_TYPE: &str = "*";

/// A location both on disk and, when it came from an alias, as the alias
/// text that imports should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub fs: NormalizedPath,
    pub alias: Option<String>,
}

/// Maps items and files to project locations.
#[derive(Debug, Clone)]
pub struct PathResolver {
    project_root: NormalizedPath,
    paths: BTreeMap<String, String>,
    aliases: PathAliasMatcher,
}

impl PathResolver {
    pub fn new(
        project_root: NormalizedPath,
        paths: BTreeMap<String, String>,
        aliases: PathAliasMatcher,
    ) -> Self {
        Self {
            project_root,
            paths,
            aliases,
        }
    }

    pub fn project_root(&self) -> &NormalizedPath {
        &self.project_root
    }

    /// The configured path for an item, most specific first: `type/item`,
    /// `type`, `*`, then the registry's own defaults for `type` and `*`.
    pub fn configured<'a>(
        &'a self,
        item: &ResolvedItem,
        defaults: &'a BTreeMap<String, String>,
    ) -> Option<&'a str> {
        let specific = format!("{}/{}", item.item_type, item.name);
        self.paths
            .get(&specific)
            .or_else(|| self.paths.get(&item.item_type))
            .or_else(|| self.paths.get(ANY_TYPE))
            .or_else(|| defaults.get(&item.item_type))
            .or_else(|| defaults.get(ANY_TYPE))
            .map(String::as_str)
    }

    /// Directory an item installs into, asking the prompter when nothing
    /// is configured.
    pub fn item_dir(
        &self,
        item: &ResolvedItem,
        defaults: &BTreeMap<String, String>,
        prompter: &dyn Prompter,
    ) -> Result<ResolvedPath> {
        let raw = match self.configured(item, defaults) {
            Some(path) => path.to_string(),
            None => prompter
                .install_path(&item.name, &item.item_type)
                .ok_or_else(|| Error::NoInstallPath {
                    item: item.name.clone(),
                    item_type: item.item_type.clone(),
                })?,
        };
        self.locate(&raw)
    }

    /// Interpret a configured path as an alias or a project path.
    pub fn locate(&self, raw: &str) -> Result<ResolvedPath> {
        let raw = raw.trim_end_matches('/');
        if self.aliases.matches(raw) {
            let fs = self.aliases.candidates(raw).into_iter().next().ok_or_else(|| {
                Error::EmptyAlias {
                    path: raw.to_string(),
                    alias: self.aliases.matched_pattern(raw).unwrap_or(raw).to_string(),
                }
            })?;
            return Ok(ResolvedPath {
                fs,
                alias: Some(raw.to_string()),
            });
        }

        let path = NormalizedPath::new(raw);
        let fs = if path.is_absolute() {
            path
        } else {
            self.project_root.join(path.as_str())
        };
        Ok(ResolvedPath { fs, alias: None })
    }

    /// Final location of one file. A file-level `target` replaces the item
    /// directory entirely.
    pub fn file_destination(&self, dir: &ResolvedPath, file: &ResolvedFile) -> Result<ResolvedPath> {
        if let Some(target) = &file.target {
            return self.locate(target);
        }
        Ok(ResolvedPath {
            fs: dir.fs.join(&file.path),
            alias: dir.alias.as_ref().map(|alias| format!("{}/{}", alias, file.path)),
        })
    }

    /// Display form: project-relative where possible.
    pub fn display(&self, path: &NormalizedPath) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or_else(|| path.clone())
            .to_string()
    }
}

/// Import text pointing from `importer` to `target`: the alias when the
/// target was placed through one, otherwise a `./` or `../` path.
pub fn import_path(importer: &NormalizedPath, target: &ResolvedPath) -> String {
    if let Some(alias) = &target.alias {
        return alias.clone();
    }
    let from_dir = importer
        .parent()
        .unwrap_or_else(|| NormalizedPath::new("."));
    match target.fs.relative_to(&from_dir) {
        Some(relative) if relative.as_str().starts_with("../") => relative.to_string(),
        Some(relative) => format!("./{}", relative),
        None => target.fs.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::NonInteractive;
    use pretty_assertions::assert_eq;
    use reg_manifest::AddPolicy;
    use rstest::rstest;

    fn item(name: &str, item_type: &str) -> ResolvedItem {
        ResolvedItem {
            name: name.into(),
            title: None,
            description: None,
            item_type: item_type.into(),
            add: AddPolicy::WhenAdded,
            files: vec![],
            registry_dependencies: vec![],
            dependencies: vec![],
            dev_dependencies: vec![],
            categories: vec![],
        }
    }

    fn resolver(paths: &[(&str, &str)]) -> PathResolver {
        let root = NormalizedPath::new("/project");
        let aliases = BTreeMap::from([("@/*".to_string(), vec!["./src/*".to_string()])]);
        PathResolver::new(
            root.clone(),
            paths
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            PathAliasMatcher::new(root, &aliases),
        )
    }

    #[rstest]
    #[case(&[("util/math", "lib/math"), ("util", "lib"), ("*", "other")], "lib/math")]
    #[case(&[("util", "lib"), ("*", "other")], "lib")]
    #[case(&[("*", "other")], "other")]
    #[case(&[], "defaults")]
    fn configured_path_precedence(#[case] paths: &[(&str, &str)], #[case] expected: &str) {
        let defaults = BTreeMap::from([("util".to_string(), "defaults".to_string())]);
        let r = resolver(paths);
        assert_eq!(r.configured(&item("math", "util"), &defaults), Some(expected));
    }

    #[test]
    fn unconfigured_type_without_prompt_fails() {
        let r = resolver(&[]);
        let err = r
            .item_dir(&item("button", "ui"), &BTreeMap::new(), &NonInteractive)
            .unwrap_err();
        assert!(matches!(err, Error::NoInstallPath { ref item_type, .. } if item_type == "ui"));
    }

    #[test]
    fn alias_and_plain_locations() {
        let r = resolver(&[]);
        assert_eq!(
            r.locate("@/components/").unwrap(),
            ResolvedPath {
                fs: NormalizedPath::new("/project/src/components"),
                alias: Some("@/components".into()),
            }
        );
        assert_eq!(
            r.locate("src/utils").unwrap(),
            ResolvedPath {
                fs: NormalizedPath::new("/project/src/utils"),
                alias: None,
            }
        );
    }

    #[test]
    fn target_overrides_item_directory() {
        let r = resolver(&[]);
        let dir = r.locate("@/ui").unwrap();
        let mut file = ResolvedFile::new("button/button.tsx", "ui/button/button.tsx", "ui");
        assert_eq!(
            r.file_destination(&dir, &file).unwrap(),
            ResolvedPath {
                fs: NormalizedPath::new("/project/src/ui/button/button.tsx"),
                alias: Some("@/ui/button/button.tsx".into()),
            }
        );

        file.target = Some("app/button.tsx".into());
        assert_eq!(
            r.file_destination(&dir, &file).unwrap().fs,
            NormalizedPath::new("/project/app/button.tsx")
        );
    }

    #[rstest]
    #[case("/p/src/utils/stdout.ts", "/p/src/utils/math/add.ts", "./math/add.ts")]
    #[case("/p/src/ui/button.tsx", "/p/src/lib/utils.ts", "../lib/utils.ts")]
    #[case("/p/src/a.ts", "/p/src/b.ts", "./b.ts")]
    fn relative_imports(#[case] importer: &str, #[case] target: &str, #[case] expected: &str) {
        let target = ResolvedPath {
            fs: NormalizedPath::new(target),
            alias: None,
        };
        assert_eq!(import_path(&NormalizedPath::new(importer), &target), expected);
    }
}
