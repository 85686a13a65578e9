// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and builders for in-memory deployment packages.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("compose_adapter=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Tar archive holding `files` as regular entries.
#[allow(dead_code)]
pub fn tar_of(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *content).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Package with a metadata document naming `name` and the given compose spec.
#[allow(dead_code)]
pub fn package(name: &str, compose: &str) -> Vec<u8> {
    let metadata = format!("name: {}\n", name);
    tar_of(&[
        ("metadata.yaml", metadata.as_bytes()),
        ("docker-compose.yml", compose.as_bytes()),
    ])
}

#[allow(dead_code)]
pub const DEMO_SPEC: &str = "\
services:
  web:
    image: nginx
    depends_on: [db]
  db:
    image: postgres
";
