// ABOUTME: Validated project name and its derived compose project label.
// ABOUTME: The name becomes a directory under packages/, so traversal is rejected.

use std::fmt;
use thiserror::Error;

/// Longest name that still fits in a single path component.
const MAX_LEN: usize = 255;

/// Label used when normalization leaves nothing behind.
const FALLBACK_LABEL: &str = "default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectNameError {
    #[error("project name cannot be empty")]
    Empty,

    #[error("project name exceeds maximum length of {MAX_LEN} bytes")]
    TooLong,

    #[error("project name cannot be '.' or '..'")]
    Reserved,

    #[error("invalid character in project name: {0:?}")]
    InvalidChar(char),
}

/// Identity shared by a package, its on-disk project and its resource group.
///
/// The declared name is kept as given and used for the store and the
/// resource group. Engine objects are named after [`ProjectName::label`],
/// the compose normalization of the declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectName {
    name: String,
    label: String,
}

impl ProjectName {
    pub fn new(value: &str) -> Result<Self, ProjectNameError> {
        if value.is_empty() {
            return Err(ProjectNameError::Empty);
        }
        if value.len() > MAX_LEN {
            return Err(ProjectNameError::TooLong);
        }
        if value == "." || value == ".." {
            return Err(ProjectNameError::Reserved);
        }
        if let Some(c) = value
            .chars()
            .find(|c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(ProjectNameError::InvalidChar(c));
        }

        Ok(Self {
            name: value.to_string(),
            label: normalize(value),
        })
    }

    /// The name as declared in the package.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Value of the compose project label: lowercased, keeping only
    /// `[a-z0-9_-]`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the network every service joins when it declares none.
    pub fn default_network(&self) -> String {
        self.scoped("default")
    }

    /// Engine-side name for a project-scoped network or volume.
    pub fn scoped(&self, object: &str) -> String {
        format!("{}_{}", self.label, object)
    }
}

fn normalize(value: &str) -> String {
    let label: String = value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'))
        .collect();
    if label.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        label
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
