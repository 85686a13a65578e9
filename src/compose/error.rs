// ABOUTME: Error types for compose project handling.
// ABOUTME: Covers spec parsing, project storage, and engine-side deployment failures.

use crate::runtime::{ContainerError, ImageError, RuntimeInfoError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid compose spec: {0}")]
    InvalidSpec(String),

    #[error("container engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("engine error: {0}")]
    Engine(String),
}

impl ComposeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComposeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ComposeError::InvalidSpec(message.into())
    }
}

impl From<RuntimeInfoError> for ComposeError {
    fn from(e: RuntimeInfoError) -> Self {
        ComposeError::EngineUnavailable(e.to_string())
    }
}

impl From<ContainerError> for ComposeError {
    fn from(e: ContainerError) -> Self {
        match e {
            ContainerError::Unreachable(msg) => ComposeError::EngineUnavailable(msg),
            other => ComposeError::Engine(other.to_string()),
        }
    }
}

impl From<ImageError> for ComposeError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Unreachable(msg) => ComposeError::EngineUnavailable(msg),
            other => ComposeError::Engine(other.to_string()),
        }
    }
}

/// Errors from the on-disk project store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project directory {0} still contains other files")]
    ProjectNotEmpty(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
