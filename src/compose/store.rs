// ABOUTME: On-disk layout of deployed projects under `<root>/packages/<name>/`.
// ABOUTME: Each project directory holds exactly one docker-compose.yml.

use super::error::StoreError;
use crate::types::ProjectName;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const PACKAGES_DIR: &str = "packages";
pub const SPEC_FILE: &str = "docker-compose.yml";

/// Maps project names to their directories.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    packages: PathBuf,
}

impl ProjectStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            packages: root.as_ref().join(PACKAGES_DIR),
        }
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages
    }

    pub fn project_dir(&self, name: &ProjectName) -> PathBuf {
        self.packages.join(name.as_str())
    }

    pub fn spec_path(&self, name: &ProjectName) -> PathBuf {
        self.project_dir(name).join(SPEC_FILE)
    }

    /// Create the project directory if needed and return it.
    pub fn ensure(&self, name: &ProjectName) -> Result<PathBuf, StoreError> {
        let dir = self.project_dir(name);
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Replace the project's spec with `content`.
    pub fn write_spec(&self, name: &ProjectName, content: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.spec_path(name);
        std::fs::write(&path, content).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(project = %name, path = %path.display(), "spec written");
        Ok(path)
    }

    /// Directory of an existing project.
    pub fn locate(&self, name: &ProjectName) -> Result<PathBuf, StoreError> {
        let dir = self.project_dir(name);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::ProjectNotFound(name.to_string()))
        }
    }

    /// Remove the spec, then the directory.
    ///
    /// Fails with `ProjectNotEmpty` rather than deleting files the store did
    /// not write.
    pub fn delete(&self, name: &ProjectName) -> Result<(), StoreError> {
        let dir = self.locate(name)?;
        let spec = dir.join(SPEC_FILE);

        match std::fs::remove_file(&spec) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { path: spec, source }),
        }

        match std::fs::remove_dir(&dir) {
            Ok(()) => {
                tracing::debug!(project = %name, "project directory removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                Err(StoreError::ProjectNotEmpty(dir))
            }
            Err(source) => Err(StoreError::Io { path: dir, source }),
        }
    }
}
