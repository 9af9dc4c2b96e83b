//! Closure properties of item graph resolution over random dependency
//! graphs, cycles included.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use reg_install::{NonInteractive, RegistryManifest, WantedItem, resolve_graph};
use reg_manifest::{AddPolicy, Manifest, ResolvedItem};

fn name(index: usize) -> String {
    format!("item-{index}")
}

fn manifest(edges: &[Vec<usize>]) -> Manifest {
    let mut manifest = Manifest::new("random");
    manifest.items = edges
        .iter()
        .enumerate()
        .map(|(index, deps)| ResolvedItem {
            name: name(index),
            title: None,
            description: None,
            item_type: "util".into(),
            add: AddPolicy::WhenAdded,
            files: vec![],
            registry_dependencies: deps
                .iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|dep| name(*dep))
                .collect(),
            dependencies: vec![],
            dev_dependencies: vec![],
            categories: vec![],
        })
        .collect();
    manifest
}

fn reachable(edges: &[Vec<usize>], roots: &[usize]) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<usize> = roots.to_vec();
    while let Some(index) = stack.pop() {
        if seen.insert(index) {
            stack.extend(edges[index].iter().copied());
        }
    }
    seen.into_iter().map(name).collect()
}

fn graph_strategy() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..10).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::collection::vec(0..n, 0..4), n),
            prop::collection::vec(0..n, 1..4),
        )
    })
}

proptest! {
    #[test]
    fn graph_is_the_dependency_closure((edges, roots) in graph_strategy()) {
        let manifest = manifest(&edges);
        let sources = [RegistryManifest { url: "fs:random", manifest: &manifest }];
        let wanted: Vec<WantedItem> = roots.iter().map(|r| WantedItem::new(name(*r))).collect();

        let graph = resolve_graph(&sources, &wanted, &[], &NonInteractive).unwrap();
        let names = graph.names();

        let unique: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(unique.len(), names.len());

        let resolved: BTreeSet<String> = names.iter().map(|n| n.to_string()).collect();
        prop_assert_eq!(resolved, reachable(&edges, &roots));

        let first = name(roots[0]);
        prop_assert_eq!(names[0], first.as_str());
    }

    #[test]
    fn every_dependency_is_in_the_graph((edges, roots) in graph_strategy()) {
        let manifest = manifest(&edges);
        let sources = [RegistryManifest { url: "fs:random", manifest: &manifest }];
        let wanted: Vec<WantedItem> = roots.iter().map(|r| WantedItem::new(name(*r))).collect();

        let graph = resolve_graph(&sources, &wanted, &[], &NonInteractive).unwrap();
        for node in graph.items() {
            for dep in &node.item.registry_dependencies {
                prop_assert!(graph.get("fs:random", dep).is_some(), "missing {}", dep);
            }
        }
    }
}
