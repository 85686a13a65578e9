// ABOUTME: Settings for registering the adapter with a process manager.
// ABOUTME: Names the manager's host and the address the manager should call back on.

use crate::error::{Error, Result};
use serde::Deserialize;

pub const DEFAULT_CONTROLLER: &str = "elastest-epm";
pub const DEFAULT_COMPOSE_ADDRESS: &str = "elastest-epm-adapter-docker-compose";
pub const DEFAULT_EPM_PORT: u16 = 50050;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationConfig {
    /// Host of the process manager.
    #[serde(default = "default_controller")]
    pub controller: String,

    /// Host the process manager reaches this adapter on.
    #[serde(default = "default_compose_address")]
    pub compose_address: String,

    #[serde(default = "default_epm_port")]
    pub epm_port: u16,
}

fn default_controller() -> String {
    DEFAULT_CONTROLLER.to_string()
}

fn default_compose_address() -> String {
    DEFAULT_COMPOSE_ADDRESS.to_string()
}

fn default_epm_port() -> u16 {
    DEFAULT_EPM_PORT
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            controller: default_controller(),
            compose_address: default_compose_address(),
            epm_port: default_epm_port(),
        }
    }
}

impl RegistrationConfig {
    /// Settings from `--register-adapter [CONTROLLER COMPOSE]`.
    ///
    /// Both hosts are taken only when two values are given; otherwise the
    /// defaults apply.
    pub fn from_flag(values: &[String]) -> Self {
        match values {
            [controller, compose_address] => Self {
                controller: controller.clone(),
                compose_address: compose_address.clone(),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// gRPC endpoint of the process manager.
    pub fn epm_endpoint(&self) -> String {
        format!("http://{}:{}", self.controller, self.epm_port)
    }

    /// Address advertised for an adapter listening on `port`.
    pub fn advertised_address(&self, port: u16) -> String {
        format!("{}:{}", self.compose_address, port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.controller.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "registration.controller cannot be empty".to_string(),
            ));
        }
        if self.compose_address.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "registration.compose_address cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
