//! The rules every registry build runs unless configured off.

use std::collections::{BTreeSet, HashMap, HashSet};

use reg_manifest::{Manifest, RemoteDependency, ResolvedItem, RuleLevel};

use super::{Rule, RuleOptions};

const DEFAULT_MAX_LOCAL_DEPENDENCIES: usize = 10;

const DEFAULT_FORBIDDEN: &[&str] = &[
    "react",
    "react-dom",
    "vue",
    "svelte",
    "@sveltejs/kit",
    "solid-js",
    "preact",
    "@angular/core",
    "next",
    "nuxt",
];

pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::item(
            "no-unpinned-dependency",
            "Remote dependencies should pin a version",
            RuleLevel::Warn,
            no_unpinned_dependency,
        ),
        Rule::item(
            "require-local-dependency-exists",
            "Registry dependencies must name items of this registry",
            RuleLevel::Error,
            require_local_dependency_exists,
        ),
        Rule::item(
            "max-local-dependencies",
            "Limit how many registry dependencies one item pulls in",
            RuleLevel::Warn,
            max_local_dependencies,
        ),
        Rule::item(
            "no-circular-dependency",
            "Registry dependencies must not form a cycle",
            RuleLevel::Error,
            no_circular_dependency,
        ),
        Rule::global(
            "no-unused-item",
            "Every item is either added on its own or needed by one that is",
            RuleLevel::Warn,
            no_unused_item,
        ),
        Rule::item(
            "no-framework-dependency",
            "Framework packages must not be forced onto consumers",
            RuleLevel::Warn,
            no_framework_dependency,
        ),
        Rule::item(
            "require-companion-file",
            "Items must ship the configured companion files",
            RuleLevel::Off,
            require_companion_file,
        ),
    ]
}

fn all_registry_dependencies(item: &ResolvedItem) -> impl Iterator<Item = &String> {
    item.registry_dependencies
        .iter()
        .chain(item.files.iter().flat_map(|f| f.registry_dependencies.iter()))
}

fn all_remote_dependencies(item: &ResolvedItem) -> impl Iterator<Item = &RemoteDependency> {
    item.dependencies
        .iter()
        .chain(item.dev_dependencies.iter())
        .chain(item.files.iter().flat_map(|f| f.dependencies.iter()))
}

fn no_unpinned_dependency(item: &ResolvedItem, _: &Manifest, _: &RuleOptions) -> Vec<String> {
    let unpinned: BTreeSet<String> = all_remote_dependencies(item)
        .filter(|dep| !dep.is_pinned())
        .map(|dep| dep.to_string())
        .collect();
    unpinned
        .into_iter()
        .map(|dep| format!("`{dep}` has no pinned version"))
        .collect()
}

fn require_local_dependency_exists(
    item: &ResolvedItem,
    manifest: &Manifest,
    _: &RuleOptions,
) -> Vec<String> {
    let missing: BTreeSet<&String> = all_registry_dependencies(item)
        .filter(|dep| !manifest.contains(dep))
        .collect();
    missing
        .into_iter()
        .map(|dep| format!("`{dep}` is not an item of this registry"))
        .collect()
}

fn max_local_dependencies(
    item: &ResolvedItem,
    _: &Manifest,
    options: &RuleOptions,
) -> Vec<String> {
    let max = options
        .get_usize("max")
        .unwrap_or(DEFAULT_MAX_LOCAL_DEPENDENCIES);
    let count = item.registry_dependencies.len();
    if count > max {
        vec![format!("{count} registry dependencies exceed the limit of {max}")]
    } else {
        Vec::new()
    }
}

fn no_circular_dependency(item: &ResolvedItem, manifest: &Manifest, _: &RuleOptions) -> Vec<String> {
    find_cycle(manifest, &item.name)
        .map(|cycle| vec![format!("circular dependency: {}", cycle.join(" -> "))])
        .unwrap_or_default()
}

fn no_unused_item(manifest: &Manifest, _: &RuleOptions) -> Vec<String> {
    unused_items(manifest)
        .into_iter()
        .map(|name| format!("`{name}` is never added and no other item needs it"))
        .collect()
}

fn no_framework_dependency(
    item: &ResolvedItem,
    _: &Manifest,
    options: &RuleOptions,
) -> Vec<String> {
    let forbidden = options
        .get_strings("forbidden")
        .unwrap_or_else(|| DEFAULT_FORBIDDEN.iter().map(|s| s.to_string()).collect());
    item.dependencies
        .iter()
        .filter(|dep| forbidden.contains(&dep.name))
        .map(|dep| {
            format!(
                "`{}` is a framework package and should not be a required dependency",
                dep.name
            )
        })
        .collect()
}

fn require_companion_file(
    item: &ResolvedItem,
    _: &Manifest,
    options: &RuleOptions,
) -> Vec<String> {
    options
        .get_strings("files")
        .unwrap_or_default()
        .into_iter()
        .filter(|name| {
            !item.files.iter().any(|f| {
                f.path == *name || f.path.ends_with(&format!("/{name}"))
            })
        })
        .map(|name| format!("missing companion file `{name}`"))
        .collect()
}

/// The first dependency cycle through `start`, as `start -> ... -> start`.
///
/// Depth-first with a per-path visited set, so diamonds are explored but a
/// path never loops through the same item twice.
pub fn find_cycle(manifest: &Manifest, start: &str) -> Option<Vec<String>> {
    let graph: HashMap<&str, &[String]> = manifest
        .items
        .iter()
        .map(|item| (item.name.as_str(), item.registry_dependencies.as_slice()))
        .collect();
    let start = manifest.get_item(start)?.name.as_str();
    let mut path = vec![start];
    walk(&graph, start, &mut path)
}

fn walk<'a>(
    graph: &HashMap<&'a str, &'a [String]>,
    start: &str,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    let current = *path.last()?;
    for dep in graph.get(current).copied().unwrap_or_default() {
        if dep == start {
            let mut cycle: Vec<String> = path.iter().map(|s| s.to_string()).collect();
            cycle.push(start.to_string());
            return Some(cycle);
        }
        if path.contains(&dep.as_str()) {
            continue;
        }
        path.push(dep.as_str());
        if let Some(cycle) = walk(graph, start, path) {
            return Some(cycle);
        }
        path.pop();
    }
    None
}

/// Items not reachable from any item that can be added on its own.
///
/// Reachability follows item-level and per-file registry dependencies, so
/// an item needed only by an optional file still counts as used.
pub fn unused_items(manifest: &Manifest) -> Vec<String> {
    let index: HashMap<&str, &ResolvedItem> = manifest
        .items
        .iter()
        .map(|item| (item.name.as_str(), item))
        .collect();

    let mut stack: Vec<&str> = manifest
        .items
        .iter()
        .filter(|item| item.add.is_root())
        .map(|item| item.name.as_str())
        .collect();
    let mut reachable: HashSet<&str> = HashSet::new();

    while let Some(name) = stack.pop() {
        if !reachable.insert(name) {
            continue;
        }
        if let Some(item) = index.get(name) {
            stack.extend(all_registry_dependencies(item).map(String::as_str));
        }
    }

    manifest
        .items
        .iter()
        .filter(|item| !reachable.contains(item.name.as_str()))
        .map(|item| item.name.clone())
        .collect()
}
