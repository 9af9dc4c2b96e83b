//! Connecting to several registries and fetching their manifests.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use reg_provider::{
    Error, MemoryCredentialStore, MemoryHttpClient, Providers, connect_all, fetch_manifests,
};

fn write_manifest(dir: &std::path::Path, name: &str) {
    std::fs::write(
        dir.join("registry.json"),
        format!(r#"{{"name": "{name}", "items": []}}"#),
    )
    .unwrap();
}

#[tokio::test]
async fn manifests_come_back_in_request_order() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write_manifest(first.path(), "first");
    write_manifest(second.path(), "second");

    let client = Arc::new(MemoryHttpClient::new().with_text(
        "https://cdn.example.com/r/registry.json",
        r#"{"name": "remote", "items": []}"#,
    ));
    let providers = Providers::builtin(client);
    let specs = vec![
        format!("fs:{}", second.path().display()),
        "https://cdn.example.com/r".to_string(),
        format!("fs:{}", first.path().display()),
    ];

    let registries = connect_all(&providers, &specs, &MemoryCredentialStore::new())
        .await
        .unwrap();
    let manifests = fetch_manifests(&registries).await.unwrap();
    let names: Vec<&str> = manifests.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["second", "remote", "first"]);
    assert_eq!(registries[1].url(), "https://cdn.example.com/r");
}

#[tokio::test]
async fn first_failure_names_the_registry() {
    let good = tempfile::tempdir().unwrap();
    write_manifest(good.path(), "good");

    let providers = Providers::builtin(Arc::new(MemoryHttpClient::new()));
    let specs = vec![
        format!("fs:{}", good.path().display()),
        "https://broken.example.com".to_string(),
    ];
    let registries = connect_all(&providers, &specs, &MemoryCredentialStore::new())
        .await
        .unwrap();

    let err = fetch_manifests(&registries).await.unwrap_err();
    assert_eq!(err.registry(), Some("https://broken.example.com"));
    assert!(err.to_string().contains("registry.json"));
}

#[tokio::test]
async fn invalid_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("registry.json"), "{ not json").unwrap();

    let providers = Providers::builtin(Arc::new(MemoryHttpClient::new()));
    let specs = vec![format!("fs:{}", dir.path().display())];
    let registries = connect_all(&providers, &specs, &MemoryCredentialStore::new())
        .await
        .unwrap();
    let err = registries[0].fetch_manifest().await.unwrap_err();
    assert!(matches!(err, Error::ManifestParse { .. }));
}
