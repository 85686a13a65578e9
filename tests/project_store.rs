// ABOUTME: Integration tests for the on-disk project store.
// ABOUTME: Checks layout, overwrite-on-redeploy and residue-free deletion.

mod support;

use compose_adapter::compose::{ProjectStore, SPEC_FILE, StoreError};
use compose_adapter::types::ProjectName;
use support::DEMO_SPEC;
use tempfile::TempDir;

fn demo() -> ProjectName {
    ProjectName::new("demo").unwrap()
}

#[test]
fn layout_is_packages_name_spec() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());

    store.ensure(&demo()).unwrap();
    let path = store.write_spec(&demo(), DEMO_SPEC.as_bytes()).unwrap();

    assert_eq!(path, temp.path().join("packages").join("demo").join(SPEC_FILE));
    assert_eq!(std::fs::read_to_string(path).unwrap(), DEMO_SPEC);
}

#[test]
fn redeploy_overwrites_previous_spec() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());
    store.ensure(&demo()).unwrap();

    store.write_spec(&demo(), DEMO_SPEC.as_bytes()).unwrap();
    store
        .write_spec(&demo(), b"services:\n  web:\n    image: nginx\n")
        .unwrap();

    let content = std::fs::read_to_string(store.spec_path(&demo())).unwrap();
    assert!(!content.contains("postgres"));
}

#[test]
fn delete_leaves_no_residue() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());
    store.ensure(&demo()).unwrap();
    store.write_spec(&demo(), DEMO_SPEC.as_bytes()).unwrap();

    store.delete(&demo()).unwrap();

    let remaining: Vec<_> = std::fs::read_dir(store.packages_dir())
        .unwrap()
        .collect();
    assert!(remaining.is_empty());
}

#[test]
fn projects_are_independent() {
    let temp = TempDir::new().unwrap();
    let store = ProjectStore::new(temp.path());
    let other = ProjectName::new("other").unwrap();
    for name in [demo(), other.clone()] {
        store.ensure(&name).unwrap();
        store.write_spec(&name, DEMO_SPEC.as_bytes()).unwrap();
    }

    store.delete(&demo()).unwrap();

    assert!(store.locate(&other).is_ok());
    assert!(matches!(
        store.locate(&demo()),
        Err(StoreError::ProjectNotFound(_))
    ));
}
