//! Binding requested names to registries and expanding their dependencies.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use reg_manifest::{FileRole, Manifest, ResolvedItem, validate_item_name};

use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// A requested item, optionally qualified as `<registry>/<item>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantedItem {
    pub registry: Option<String>,
    pub name: String,
}

impl WantedItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            registry: None,
            name: name.into(),
        }
    }

    pub fn in_registry(registry: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            registry: Some(registry.into()),
            name: name.into(),
        }
    }
}

impl FromStr for WantedItem {
    type Err = Error;

    /// Item names never contain `/`, so the last `/` separates the
    /// registry from the name.
    fn from_str(spec: &str) -> Result<Self> {
        let wanted = match spec.rsplit_once('/') {
            Some((registry, name)) if !registry.is_empty() => Self::in_registry(registry, name),
            Some(_) => return Err(Error::InvalidSpecifier(spec.to_string())),
            None => Self::new(spec),
        };
        validate_item_name(&wanted.name)
            .map_err(|_| Error::InvalidSpecifier(spec.to_string()))?;
        Ok(wanted)
    }
}

impl std::fmt::Display for WantedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.registry {
            Some(registry) => write!(f, "{}/{}", registry, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A fetched manifest and the URL of the registry it came from.
#[derive(Debug, Clone, Copy)]
pub struct RegistryManifest<'a> {
    pub url: &'a str,
    pub manifest: &'a Manifest,
}

/// One resolved node.
#[derive(Debug, Clone, Copy)]
pub struct GraphItem<'a> {
    /// Index into the registries the graph was resolved against.
    pub registry: usize,
    pub url: &'a str,
    pub item: &'a ResolvedItem,
}

/// Flat, deduplicated result in breadth-first order: requested items
/// first, then their dependencies level by level.
#[derive(Debug, Clone, Default)]
pub struct ItemGraph<'a> {
    items: Vec<GraphItem<'a>>,
}

impl<'a> ItemGraph<'a> {
    pub fn items(&self) -> &[GraphItem<'a>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.items.iter().map(|node| node.item.name.as_str()).collect()
    }

    pub fn get(&self, url: &str, name: &str) -> Option<&GraphItem<'a>> {
        self.items
            .iter()
            .find(|node| node.url == url && node.item.name == name)
    }
}

/// Resolve `wanted` against `registries`.
///
/// Dependencies are looked up in the registry of the item that declares
/// them. Optional-role files listed in `include` contribute their own
/// registry dependencies.
pub fn resolve_graph<'a>(
    registries: &[RegistryManifest<'a>],
    wanted: &[WantedItem],
    include: &[FileRole],
    prompter: &dyn Prompter,
) -> Result<ItemGraph<'a>> {
    let mut queue: VecDeque<(usize, &'a ResolvedItem)> = VecDeque::new();
    for request in wanted {
        queue.push_back(bind(registries, request, prompter)?);
    }

    let mut seen: HashSet<(usize, &'a str)> = HashSet::new();
    let mut graph = ItemGraph::default();

    while let Some((index, item)) = queue.pop_front() {
        if !seen.insert((index, item.name.as_str())) {
            continue;
        }
        let source = registries[index];
        for dependency in item.registry_dependencies_for(include) {
            let Some(found) = source.manifest.get_item(&dependency) else {
                return Err(Error::UnknownDependency {
                    registry: source.url.to_string(),
                    item: item.name.clone(),
                    dependency,
                });
            };
            if !seen.contains(&(index, found.name.as_str())) {
                queue.push_back((index, found));
            }
        }
        tracing::debug!(registry = source.url, item = %item.name, "resolved item");
        graph.items.push(GraphItem {
            registry: index,
            url: source.url,
            item,
        });
    }

    Ok(graph)
}

fn bind<'a>(
    registries: &[RegistryManifest<'a>],
    request: &WantedItem,
    prompter: &dyn Prompter,
) -> Result<(usize, &'a ResolvedItem)> {
    if let Some(registry) = &request.registry {
        let index = registries
            .iter()
            .position(|r| r.url == registry)
            .ok_or_else(|| Error::UnknownRegistry(registry.clone()))?;
        let item = registries[index]
            .manifest
            .get_item(&request.name)
            .ok_or_else(|| Error::NotFound {
                item: request.name.clone(),
                registries: vec![registry.clone()],
            })?;
        return Ok((index, item));
    }

    let matches: Vec<(usize, &'a ResolvedItem)> = registries
        .iter()
        .enumerate()
        .filter_map(|(index, r)| r.manifest.get_item(&request.name).map(|item| (index, item)))
        .collect();

    match matches.as_slice() {
        [] => Err(Error::NotFound {
            item: request.name.clone(),
            registries: registries.iter().map(|r| r.url.to_string()).collect(),
        }),
        [single] => Ok(*single),
        several => {
            let urls: Vec<String> = several
                .iter()
                .map(|(index, _)| registries[*index].url.to_string())
                .collect();
            match prompter.select_registry(&request.name, &urls) {
                Some(choice) if choice < several.len() => Ok(several[choice]),
                _ => Err(Error::Ambiguous {
                    item: request.name.clone(),
                    registries: urls,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{NonInteractive, OverwriteRequest};
    use pretty_assertions::assert_eq;
    use reg_manifest::{AddPolicy, ResolvedFile};
    use rstest::rstest;

    fn item(name: &str, deps: &[&str]) -> ResolvedItem {
        ResolvedItem {
            name: name.into(),
            title: None,
            description: None,
            item_type: "util".into(),
            add: AddPolicy::WhenAdded,
            files: vec![ResolvedFile::new(format!("{name}.ts"), format!("src/{name}.ts"), "util")],
            registry_dependencies: deps.iter().map(|d| d.to_string()).collect(),
            dependencies: vec![],
            dev_dependencies: vec![],
            categories: vec![],
        }
    }

    fn manifest(name: &str, items: Vec<ResolvedItem>) -> Manifest {
        let mut manifest = Manifest::new(name);
        manifest.items = items;
        manifest
    }

    struct PickLast;

    impl Prompter for PickLast {
        fn select_registry(&self, _item: &str, registries: &[String]) -> Option<usize> {
            registries.len().checked_sub(1)
        }
        fn install_path(&self, _item: &str, _item_type: &str) -> Option<String> {
            None
        }
        fn confirm_overwrite(&self, _request: &OverwriteRequest<'_>) -> bool {
            false
        }
    }

    #[rstest]
    #[case("math", None, "math")]
    #[case("github/ieedan/std/math", Some("github/ieedan/std"), "math")]
    #[case("https://example.com/r/button", Some("https://example.com/r"), "button")]
    fn parses_specifiers(#[case] spec: &str, #[case] registry: Option<&str>, #[case] name: &str) {
        let wanted: WantedItem = spec.parse().unwrap();
        assert_eq!(wanted.registry.as_deref(), registry);
        assert_eq!(wanted.name, name);
    }

    #[rstest]
    #[case("")]
    #[case("/math")]
    #[case("github/ieedan/std/")]
    fn rejects_bad_specifiers(#[case] spec: &str) {
        assert!(spec.parse::<WantedItem>().is_err());
    }

    #[test]
    fn dependencies_follow_requested_items() {
        let std = manifest(
            "std",
            vec![item("math", &[]), item("stdout", &["math"]), item("fmt", &["stdout"])],
        );
        let registries = [RegistryManifest {
            url: "fs:/std",
            manifest: &std,
        }];

        let graph = resolve_graph(
            &registries,
            &[WantedItem::new("stdout")],
            &[],
            &NonInteractive,
        )
        .unwrap();
        assert_eq!(graph.names(), vec!["stdout", "math"]);

        let graph = resolve_graph(
            &registries,
            &[WantedItem::new("fmt"), WantedItem::new("math")],
            &[],
            &NonInteractive,
        )
        .unwrap();
        assert_eq!(graph.names(), vec!["fmt", "math", "stdout"]);
    }

    #[test]
    fn revisits_are_skipped() {
        let m = manifest("r", vec![item("a", &["b"]), item("b", &["a"])]);
        let registries = [RegistryManifest {
            url: "r",
            manifest: &m,
        }];
        let graph =
            resolve_graph(&registries, &[WantedItem::new("a")], &[], &NonInteractive).unwrap();
        assert_eq!(graph.names(), vec!["a", "b"]);
    }

    #[test]
    fn optional_file_dependencies_only_when_included() {
        let mut main = item("main", &[]);
        let mut test_file = ResolvedFile::new("main.test.ts", "src/main.test.ts", "util");
        test_file.role = FileRole::Test;
        test_file.registry_dependencies.push("harness".into());
        main.files.push(test_file);
        let m = manifest("r", vec![main, item("harness", &[])]);
        let registries = [RegistryManifest {
            url: "r",
            manifest: &m,
        }];

        let without =
            resolve_graph(&registries, &[WantedItem::new("main")], &[], &NonInteractive).unwrap();
        assert_eq!(without.names(), vec!["main"]);

        let with = resolve_graph(
            &registries,
            &[WantedItem::new("main")],
            &[FileRole::Test],
            &NonInteractive,
        )
        .unwrap();
        assert_eq!(with.names(), vec!["main", "harness"]);
    }

    #[test]
    fn ambiguity_needs_a_decision() {
        let a = manifest("a", vec![item("button", &[])]);
        let b = manifest("b", vec![item("button", &[])]);
        let registries = [
            RegistryManifest {
                url: "github/acme/a",
                manifest: &a,
            },
            RegistryManifest {
                url: "github/acme/b",
                manifest: &b,
            },
        ];
        let wanted = [WantedItem::new("button")];

        match resolve_graph(&registries, &wanted, &[], &NonInteractive).unwrap_err() {
            Error::Ambiguous { item, registries } => {
                assert_eq!(item, "button");
                assert_eq!(registries, vec!["github/acme/a", "github/acme/b"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let graph = resolve_graph(&registries, &wanted, &[], &PickLast).unwrap();
        assert_eq!(graph.items()[0].url, "github/acme/b");

        let qualified = [WantedItem::in_registry("github/acme/a", "button")];
        let graph = resolve_graph(&registries, &qualified, &[], &NonInteractive).unwrap();
        assert_eq!(graph.items()[0].registry, 0);
    }

    #[test]
    fn missing_items_and_dependencies() {
        let m = manifest("r", vec![item("a", &["ghost"])]);
        let registries = [RegistryManifest {
            url: "r",
            manifest: &m,
        }];

        let err = resolve_graph(&registries, &[WantedItem::new("nope")], &[], &NonInteractive)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { ref item, .. } if item == "nope"));

        let err =
            resolve_graph(&registries, &[WantedItem::new("a")], &[], &NonInteractive).unwrap_err();
        assert!(matches!(err, Error::UnknownDependency { ref dependency, .. } if dependency == "ghost"));

        let err = resolve_graph(
            &registries,
            &[WantedItem::in_registry("elsewhere", "a")],
            &[],
            &NonInteractive,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownRegistry(_)));
    }
}
