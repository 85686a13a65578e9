// ABOUTME: File transfer trait for the container engine.
// ABOUTME: Moves tar archives into and out of a container's filesystem.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Archive transfer between the adapter and a container.
#[async_trait]
pub trait CopyOps: Sealed + Send + Sync {
    /// Extract `archive` (an uncompressed tar) into `dir` inside the container.
    async fn upload_archive(
        &self,
        container: &ContainerId,
        dir: &str,
        archive: Vec<u8>,
    ) -> Result<(), CopyError>;

    /// Fetch `path` from the container as a tar archive.
    async fn download_archive(
        &self,
        container: &ContainerId,
        path: &str,
    ) -> Result<Vec<u8>, CopyError>;
}

/// Errors from archive transfers.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("path not found in container: {0}")]
    PathNotFound(String),

    #[error("failed to build archive: {0}")]
    Archive(#[from] std::io::Error),

    #[error("runtime error: {0}")]
    Runtime(String),
}
