// ABOUTME: Extracts uploaded deployment packages held in memory.
// ABOUTME: Finds the metadata and compose documents inside a tar or tar.gz archive.

mod metadata;

pub use metadata::{Metadata, RegistryLogin};

use flate2::read::GzDecoder;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;

const METADATA_NAMES: &[&str] = &["metadata.yaml", "metadata.yml"];
const COMPOSE_NAMES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("package archive could not be read: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("no metadata document found in package")]
    MissingMetadata,

    #[error("no docker-compose document found in package")]
    MissingComposeSpec,

    #[error("metadata document is not valid YAML: {0}")]
    InvalidMetadata(#[source] serde_yaml::Error),

    #[error("metadata does not declare a name")]
    MissingName,

    #[error("package contains more than one {0} document")]
    DuplicateEntry(&'static str),
}

/// Contents of an uploaded package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Declared project name, non-blank but not yet validated.
    pub name: String,
    pub metadata: Metadata,
    /// Raw compose document, written to disk as-is.
    pub compose: Vec<u8>,
}

#[derive(Clone, Copy)]
enum Role {
    Metadata,
    Compose,
}

impl Role {
    fn of(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if METADATA_NAMES.contains(&file_name) {
            Some(Role::Metadata)
        } else if COMPOSE_NAMES.contains(&file_name) {
            Some(Role::Compose)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Role::Metadata => "metadata",
            Role::Compose => "docker-compose",
        }
    }
}

/// Extract a package from archive bytes.
///
/// Reads the archive in a single pass without touching the filesystem.
pub fn extract(bytes: &[u8]) -> Result<Package, PackageError> {
    let reader: Box<dyn Read + '_> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(Cursor::new(bytes)))
    } else {
        Box::new(Cursor::new(bytes))
    };

    let mut archive = tar::Archive::new(reader);
    let mut metadata: Option<Vec<u8>> = None;
    let mut compose: Option<Vec<u8>> = None;

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let Some(role) = Role::of(&entry.path()?) else {
            continue;
        };

        let slot = match role {
            Role::Metadata => &mut metadata,
            Role::Compose => &mut compose,
        };
        if slot.is_some() {
            return Err(PackageError::DuplicateEntry(role.label()));
        }

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        tracing::debug!(role = role.label(), bytes = content.len(), "found package document");
        *slot = Some(content);
    }

    let metadata = metadata.ok_or(PackageError::MissingMetadata)?;
    let compose = compose.ok_or(PackageError::MissingComposeSpec)?;
    let metadata = Metadata::parse(&metadata).map_err(PackageError::InvalidMetadata)?;
    let name = metadata.name().ok_or(PackageError::MissingName)?.to_string();

    Ok(Package {
        name,
        metadata,
        compose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn tar_of(files: &[(&str, &[u8])]) -> Vec<u8> {
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

    const COMPOSE: &[u8] = b"services:\n  web:\n    image: nginx\n";

    #[test]
    fn extracts_metadata_and_compose() {
        let bytes = tar_of(&[
            ("metadata.yaml", b"name: demo\n"),
            ("docker-compose.yml", COMPOSE),
        ]);
        let package = extract(&bytes).unwrap();
        assert_eq!(package.name, "demo");
        assert_eq!(package.compose, COMPOSE);
    }

    #[test]
    fn finds_documents_in_subdirectories() {
        let bytes = tar_of(&[
            ("pkg/metadata.yml", b"name: nested\n"),
            ("pkg/compose.yaml", COMPOSE),
            ("pkg/README.md", b"ignored"),
        ]);
        assert_eq!(extract(&bytes).unwrap().name, "nested");
    }

    #[test]
    fn decompresses_gzip_archives() {
        let tar = tar_of(&[
            ("metadata.yaml", b"name: zipped\n"),
            ("docker-compose.yaml", COMPOSE),
        ]);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        let bytes = encoder.finish().unwrap();

        assert_eq!(extract(&bytes).unwrap().name, "zipped");
    }

    #[test]
    fn missing_documents_are_reported() {
        let no_meta = tar_of(&[("docker-compose.yml", COMPOSE)]);
        assert!(matches!(extract(&no_meta), Err(PackageError::MissingMetadata)));

        let no_compose = tar_of(&[("metadata.yaml", b"name: demo\n")]);
        assert!(matches!(
            extract(&no_compose),
            Err(PackageError::MissingComposeSpec)
        ));
    }

    #[test]
    fn metadata_without_name_is_rejected() {
        let bytes = tar_of(&[
            ("metadata.yaml", b"docker_registry: r.example\n"),
            ("docker-compose.yml", COMPOSE),
        ]);
        assert!(matches!(extract(&bytes), Err(PackageError::MissingName)));
    }

    #[test]
    fn malformed_metadata_is_rejected() {
        let bytes = tar_of(&[
            ("metadata.yaml", b"name: [unclosed\n"),
            ("docker-compose.yml", COMPOSE),
        ]);
        assert!(matches!(
            extract(&bytes),
            Err(PackageError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn duplicate_compose_documents_are_rejected() {
        let bytes = tar_of(&[
            ("metadata.yaml", b"name: demo\n"),
            ("docker-compose.yml", COMPOSE),
            ("other/compose.yml", COMPOSE),
        ]);
        assert!(matches!(
            extract(&bytes),
            Err(PackageError::DuplicateEntry("docker-compose"))
        ));
    }

    #[test]
    fn garbage_is_unreadable() {
        let result = extract(&[0x1f, 0x8b, 0x00, 0x01, 0x02]);
        assert!(matches!(result, Err(PackageError::Unreadable(_))));
    }
}
