// ABOUTME: Integration tests for package extraction.
// ABOUTME: Builds archives in memory and checks what the extractor finds or rejects.

mod support;

use compose_adapter::diagnostics::Diagnostics;
use compose_adapter::package::{PackageError, extract};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use support::{DEMO_SPEC, package, tar_of};

#[test]
fn extracts_demo_package() {
    support::init_tracing();

    let extracted = extract(&package("demo", DEMO_SPEC)).unwrap();
    assert_eq!(extracted.name, "demo");
    assert_eq!(extracted.compose, DEMO_SPEC.as_bytes());
    assert!(
        extracted
            .metadata
            .registry_login(&mut Diagnostics::default())
            .is_none()
    );
}

#[test]
fn gzip_package_with_registry() {
    let archive = tar_of(&[
        (
            "bundle/metadata.yml",
            b"name: private\ndocker_registry: registry.local:5000\ndocker_username: ci\ndocker_password: secret\n",
        ),
        ("bundle/docker-compose.yaml", DEMO_SPEC.as_bytes()),
    ]);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&archive).unwrap();
    let bytes = encoder.finish().unwrap();

    let extracted = extract(&bytes).unwrap();
    assert_eq!(extracted.name, "private");

    let login = extracted
        .metadata
        .registry_login(&mut Diagnostics::default())
        .unwrap();
    assert_eq!(login.address, "registry.local:5000");
    assert_eq!(login.auth.username, "ci");
    assert!(!format!("{:?}", login.auth).contains("secret"));
}

#[test]
fn missing_spec_is_reported() {
    let archive = tar_of(&[("metadata.yaml", b"name: demo\n")]);
    assert!(matches!(
        extract(&archive),
        Err(PackageError::MissingComposeSpec)
    ));
}

#[test]
fn empty_archive_has_no_metadata() {
    let archive = tar_of(&[]);
    assert!(matches!(extract(&archive), Err(PackageError::MissingMetadata)));
}

#[test]
fn unrelated_files_are_ignored() {
    let archive = tar_of(&[
        ("README.md", b"# demo"),
        ("metadata.yaml", b"name: demo\n"),
        ("config/app.env", b"A=1"),
        ("docker-compose.yml", DEMO_SPEC.as_bytes()),
    ]);
    assert_eq!(extract(&archive).unwrap().name, "demo");
}
