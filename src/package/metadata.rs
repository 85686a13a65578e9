// ABOUTME: Metadata document declared inside an uploaded package.
// ABOUTME: Carries the project name and optional registry credentials.

use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::RegistryAuth;
use serde::Deserialize;

/// Parsed `metadata.yaml` of a package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    pub name: Option<String>,
    #[serde(default, alias = "registry_address")]
    pub docker_registry: Option<String>,
    #[serde(default, alias = "registry_username")]
    pub docker_username: Option<String>,
    #[serde(default, alias = "registry_password")]
    pub docker_password: Option<String>,
}

/// Credentials for a one-off registry login.
#[derive(Debug, Clone)]
pub struct RegistryLogin {
    /// Registry address as declared, possibly with a scheme.
    pub address: String,
    pub auth: RegistryAuth,
}

impl Metadata {
    pub fn parse(document: &[u8]) -> Result<Self, serde_yaml::Error> {
        // An empty document is a valid mapping with no keys.
        if document.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(document)
    }

    /// The declared project name, if present and non-blank.
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Credentials to log in with before deploying.
    ///
    /// A registry without a username is reported and skipped; a missing
    /// password defaults to empty.
    pub fn registry_login(&self, diagnostics: &mut Diagnostics) -> Option<RegistryLogin> {
        let address = non_blank(&self.docker_registry)?;

        let Some(username) = non_blank(&self.docker_username) else {
            diagnostics.warn(Warning::registry_login_skipped(format!(
                "registry {} declared without a username, skipping login",
                address
            )));
            return None;
        };

        Some(RegistryLogin {
            address: address.to_string(),
            auth: RegistryAuth {
                username: username.to_string(),
                password: self.docker_password.clone().unwrap_or_default(),
                server: Some(address.to_string()),
            },
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
