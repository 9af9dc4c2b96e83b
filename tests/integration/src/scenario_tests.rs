//! End-to-end scenarios: build registries on disk, then add their items to
//! fresh projects through the filesystem provider.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use reg_build::RegistryBuilder;
use reg_core::{Error, Project, build_registry};
use reg_manifest::RegistryConfig;
use reg_provider::{MemoryCredentialStore, MemoryHttpClient, Providers};
use reg_test_utils::{TestProject, TestRegistry};

const STD: &str = r#"
name = "std"
version = "1.0.0"

[[items]]
name = "math"
type = "util"
files = ["src/math"]

[[items]]
name = "stdout"
type = "util"
files = ["src/stdout.ts"]
"#;

fn std_registry() -> TestRegistry {
    let registry = TestRegistry::new()
        .file(
            "src/math/add.ts",
            "export const add = (a: number, b: number) => a + b;\n",
        )
        .file(
            "src/stdout.ts",
            "import { add } from \"./math/add\";\nexport const print = () => console.log(add(1, 2));\n",
        )
        .config(STD);
    build_registry(&registry.root()).unwrap();
    registry
}

fn offline(project: &TestProject) -> Project {
    Project::load(project.root())
        .unwrap()
        .with_providers(Providers::builtin(Arc::new(MemoryHttpClient::new())))
        .with_credentials(Arc::new(MemoryCredentialStore::new()))
}

fn names(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|qualified| qualified.rsplit('/').next().unwrap_or(qualified))
        .collect()
}

#[tokio::test]
async fn adding_an_item_brings_its_dependencies() {
    let registry = std_registry();
    let project = TestProject::new().config(&format!(
        "registries = [\"{}\"]\n\n[paths]\nutil = \"src/utils\"\n",
        registry.spec()
    ));

    let report = offline(&project)
        .add_items(&["stdout".to_string()])
        .await
        .unwrap();

    assert_eq!(names(&report.items), vec!["stdout", "math"]);
    assert_eq!(
        report.created,
        vec!["src/utils/stdout.ts", "src/utils/math/add.ts"]
    );
    project.assert_file_contains("src/utils/stdout.ts", "import { add } from \"./math/add\";");
    project.assert_file_contains("src/utils/math/add.ts", "export const add");
}

#[tokio::test]
async fn same_name_in_two_registries_is_ambiguous() {
    let first = std_registry();
    let second = std_registry();
    let project = TestProject::new().config(&format!(
        "registries = [\"{}\", \"{}\"]\n\n[paths]\n\"*\" = \"src\"\n",
        first.spec(),
        second.spec()
    ));

    let err = offline(&project)
        .add_items(&["math".to_string()])
        .await
        .unwrap_err();

    match err {
        Error::Install(reg_install::Error::Ambiguous { item, registries }) => {
            assert_eq!(item, "math");
            assert_eq!(registries.len(), 2);
            assert!(registries[0].contains(&first.path().display().to_string()));
            assert!(registries[1].contains(&second.path().display().to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    project.assert_file_not_exists("src/math/add.ts");
}

#[tokio::test]
async fn imports_follow_the_project_aliases() {
    let registry = TestRegistry::new()
        .file("src/lib/utils.ts", "export const cn = (...c: string[]) => c.join(' ');\n")
        .file(
            "src/ui/button.tsx",
            "import { cn } from \"../lib/utils\";\nexport const Button = () => cn('btn');\n",
        )
        .config(
            r#"
name = "ui"

[[items]]
name = "utils"
type = "lib"
files = ["src/lib/utils.ts"]

[[items]]
name = "button"
type = "ui"
files = ["src/ui/button.tsx"]
"#,
        );
    build_registry(&registry.root()).unwrap();
    assert_eq!(
        registry.manifest().get_item("button").unwrap().registry_dependencies,
        vec!["utils"]
    );

    let project = TestProject::new().config(&format!(
        r#"registries = ["{}"]

[paths]
ui = "@/components"
lib = "@/lib"

[aliases]
"@/*" = ["./src/*"]
"#,
        registry.spec()
    ));

    let report = offline(&project)
        .add_items(&["button".to_string()])
        .await
        .unwrap();

    assert_eq!(report.created, vec!["src/components/button.tsx", "src/lib/utils.ts"]);
    project.assert_file_contains("src/components/button.tsx", "from \"@/lib/utils\"");
}

const TESTED: &str = r#"
name = "tested"

[[items]]
name = "math"
type = "util"

[[items.files]]
path = "src/math/add.ts"

[[items.files]]
path = "src/math/add.test.ts"
role = "test"
"#;

fn tested_registry() -> TestRegistry {
    let registry = TestRegistry::new()
        .file("src/math/add.ts", "export const add = (a: number, b: number) => a + b;\n")
        .file(
            "src/math/add.test.ts",
            "import { it } from \"vitest\";\nimport { add } from \"./add\";\nit('adds', () => add(1, 2));\n",
        )
        .file("package.json", r#"{"devDependencies": {"vitest": "^1.6.0"}}"#)
        .config(TESTED);
    build_registry(&registry.root()).unwrap();
    registry
}

#[tokio::test]
async fn test_files_and_their_dependencies_are_opt_in() {
    let registry = tested_registry();

    let manifest = registry.manifest();
    let math = manifest.get_item("math").unwrap();
    assert!(math.dependencies.is_empty());
    assert_eq!(math.files[1].dependencies[0].to_string(), "js:vitest@^1.6.0");

    let plain = TestProject::new().config(&format!(
        "registries = [\"{}\"]\n\n[paths]\nutil = \"src/math\"\n",
        registry.spec()
    ));
    let report = offline(&plain)
        .add_items(&["math".to_string()])
        .await
        .unwrap();
    assert_eq!(report.created, vec!["src/math/add.ts"]);
    assert!(report.dependencies.is_empty());
    plain.assert_file_not_exists("src/math/add.test.ts");

    let with_tests = TestProject::new().config(&format!(
        "registries = [\"{}\"]\n\n[paths]\nutil = \"src/math\"\n\n[include]\ntests = true\n",
        registry.spec()
    ));
    let report = offline(&with_tests)
        .add_items(&["math".to_string()])
        .await
        .unwrap();
    assert_eq!(report.created, vec!["src/math/add.ts", "src/math/add.test.ts"]);
    let deps: Vec<String> = report.dependencies.iter().map(ToString::to_string).collect();
    assert_eq!(deps, vec!["js:vitest@^1.6.0"]);
}

#[test]
fn circular_items_fail_unless_the_rule_is_off() {
    let registry = TestRegistry::new()
        .file("src/a.ts", "import { b } from \"./b\";\nexport const a = 1;\n")
        .file("src/b.ts", "import { a } from \"./a\";\nexport const b = 2;\n")
        .config(
            r#"
name = "cyclic"

[[items]]
name = "a"
type = "util"
files = ["src/a.ts"]

[[items]]
name = "b"
type = "util"
files = ["src/b.ts"]
"#,
        );

    let err = build_registry(&registry.root()).unwrap_err();
    assert!(err.to_string().contains("circular dependency"), "{err}");

    let mut config = RegistryConfig::load_from_dir(&registry.root()).unwrap();
    config.rules.insert(
        "no-circular-dependency".into(),
        serde_json::from_value(serde_json::json!("off")).unwrap(),
    );
    let output = RegistryBuilder::new(registry.root(), config).build().unwrap();
    assert_eq!(output.manifest.item_names(), vec!["a", "b"]);
}

#[tokio::test]
async fn every_built_item_can_be_added() {
    let registry = std_registry();
    for name in registry.manifest().item_names() {
        let project = TestProject::new().config(&format!(
            "registries = [\"{}\"]\n\n[paths]\n\"*\" = \"src\"\n",
            registry.spec()
        ));
        let report = offline(&project)
            .add_items(&[name.to_string()])
            .await
            .unwrap();
        assert_eq!(names(&report.items)[0], name);
        assert!(!report.created.is_empty());
    }
}

#[test]
fn rebuilding_produces_the_same_manifest() {
    let registry = std_registry();
    let manifest_path = registry.path().join("registry.json");
    let first = std::fs::read_to_string(&manifest_path).unwrap();

    build_registry(&registry.root()).unwrap();
    let second = std::fs::read_to_string(&manifest_path).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn adding_twice_leaves_files_unchanged() {
    let registry = std_registry();
    let project = TestProject::new().config(&format!(
        "registries = [\"{}\"]\n\n[paths]\nutil = \"src/utils\"\n",
        registry.spec()
    ));

    let first = offline(&project)
        .add_items(&["stdout".to_string()])
        .await
        .unwrap();
    let second = offline(&project)
        .add_items(&["stdout".to_string()])
        .await
        .unwrap();

    assert!(second.created.is_empty());
    assert!(second.updated.is_empty());
    assert_eq!(second.unchanged, first.created);
}
