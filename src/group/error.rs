// ABOUTME: Stage-annotated errors raised by resource group operations, SNAFU pattern.
// ABOUTME: Each error names the stage it failed in and classifies itself for the transport.

use crate::compose::{ComposeError, StoreError};
use crate::package::PackageError;
use crate::runtime::{ContainerError, CopyError, ExecError};
use crate::types::ProjectNameError;
use snafu::Snafu;
use std::fmt;
use std::path::PathBuf;

/// Where in a request the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    ProjectStore,
    LoggingInjection,
    Deployment,
    Teardown,
    Container,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extraction => "extraction",
            Stage::ProjectStore => "project-store",
            Stage::LoggingInjection => "logging-injection",
            Stage::Deployment => "deployment",
            Stage::Teardown => "teardown",
            Stage::Container => "container",
        })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GroupError {
    #[snafu(display("extraction: malformed package: {source}"))]
    MalformedPackage { source: PackageError },

    #[snafu(display("project-store: invalid project name {name:?}: {source}"))]
    InvalidProjectName {
        name: String,
        source: ProjectNameError,
    },

    #[snafu(display("{stage}: {source}"))]
    Store { stage: Stage, source: StoreError },

    #[snafu(display("{stage}: {source}"))]
    Compose { stage: Stage, source: ComposeError },

    #[snafu(display("deployment: no container of {project} came up: {reasons}"))]
    NothingDeployed { project: String, reasons: String },

    #[snafu(display("{stage}: project not found: {project}"))]
    UnknownProject { stage: Stage, project: String },

    #[snafu(display("{stage}: missing request property: {what}"))]
    MissingProperty { stage: Stage, what: String },

    #[snafu(display("container: unbalanced quoting in command {command:?}"))]
    InvalidCommand { command: String },

    #[snafu(display("container: {source}"))]
    Container { source: ContainerError },

    #[snafu(display("container: {source}"))]
    Exec { source: ExecError },

    #[snafu(display("container: {source}"))]
    Transfer { source: CopyError },

    #[snafu(display("container: cannot read {}: {source}", path.display()))]
    HostFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{stage}: background task failed: {message}"))]
    Task { stage: Stage, message: String },
}

/// Transport-neutral classification of a [`GroupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidArgument,
    Unavailable,
    NotFound,
    FailedPrecondition,
    Aborted,
    Internal,
}

impl GroupError {
    pub fn class(&self) -> ErrorClass {
        match self {
            GroupError::MalformedPackage { .. }
            | GroupError::InvalidProjectName { .. }
            | GroupError::MissingProperty { .. }
            | GroupError::InvalidCommand { .. } => ErrorClass::InvalidArgument,

            GroupError::Store { source, .. } => match source {
                StoreError::ProjectNotFound(_) => ErrorClass::NotFound,
                StoreError::ProjectNotEmpty(_) => ErrorClass::FailedPrecondition,
                StoreError::Io { .. } => ErrorClass::Internal,
            },

            GroupError::Compose { source, .. } => match source {
                ComposeError::InvalidSpec(_) => ErrorClass::InvalidArgument,
                ComposeError::EngineUnavailable(_) => ErrorClass::Unavailable,
                ComposeError::DeploymentFailed(_) => ErrorClass::Aborted,
                ComposeError::Io { .. } | ComposeError::Engine(_) => ErrorClass::Internal,
            },

            GroupError::NothingDeployed { .. } => ErrorClass::Aborted,
            GroupError::UnknownProject { .. } => ErrorClass::NotFound,

            GroupError::Container { source } => match source {
                ContainerError::NotFound(_) => ErrorClass::NotFound,
                ContainerError::Unreachable(_) => ErrorClass::Unavailable,
                _ => ErrorClass::Internal,
            },

            GroupError::Exec { source } => match source {
                ExecError::ContainerNotFound(_) => ErrorClass::NotFound,
                ExecError::ContainerNotRunning(_) => ErrorClass::FailedPrecondition,
                _ => ErrorClass::Internal,
            },

            GroupError::Transfer { source } => match source {
                CopyError::ContainerNotFound(_) | CopyError::PathNotFound(_) => {
                    ErrorClass::NotFound
                }
                _ => ErrorClass::Internal,
            },

            GroupError::HostFile { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => ErrorClass::NotFound,
                _ => ErrorClass::Internal,
            },

            GroupError::Task { .. } => ErrorClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_stage() {
        let err = GroupError::Compose {
            stage: Stage::LoggingInjection,
            source: ComposeError::InvalidSpec("missing `services`".to_string()),
        };
        assert!(err.to_string().starts_with("logging-injection: "));

        let err = GroupError::Store {
            stage: Stage::Teardown,
            source: StoreError::ProjectNotFound("demo".to_string()),
        };
        assert_eq!(err.to_string(), "teardown: project not found: demo");
    }

    #[test]
    fn classification() {
        let malformed = GroupError::MalformedPackage {
            source: PackageError::MissingComposeSpec,
        };
        assert_eq!(malformed.class(), ErrorClass::InvalidArgument);

        let unavailable = GroupError::Compose {
            stage: Stage::Deployment,
            source: ComposeError::EngineUnavailable("down".to_string()),
        };
        assert_eq!(unavailable.class(), ErrorClass::Unavailable);

        let not_empty = GroupError::Store {
            stage: Stage::ProjectStore,
            source: StoreError::ProjectNotEmpty(PathBuf::from("/x")),
        };
        assert_eq!(not_empty.class(), ErrorClass::FailedPrecondition);

        let aborted = GroupError::NothingDeployed {
            project: "demo".to_string(),
            reasons: "web: boom".to_string(),
        };
        assert_eq!(aborted.class(), ErrorClass::Aborted);

        let missing = GroupError::Container {
            source: ContainerError::NotFound("abc".to_string()),
        };
        assert_eq!(missing.class(), ErrorClass::NotFound);
    }
}
