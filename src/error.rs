// ABOUTME: Application-wide error types for compose-adapter startup and shutdown.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::registration::RegistrationError;
use crate::runtime::RuntimeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("server error: {0}")]
    Serve(#[from] tonic::transport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
