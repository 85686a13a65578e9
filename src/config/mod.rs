// ABOUTME: Configuration types and parsing for compose-adapter.yml.
// ABOUTME: Every field has a default, so the adapter also runs without a file.

mod registration;

pub use registration::{
    DEFAULT_COMPOSE_ADDRESS, DEFAULT_CONTROLLER, DEFAULT_EPM_PORT, RegistrationConfig,
};

use crate::error::{Error, Result};
use crate::runtime::RuntimeConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "compose-adapter.yml";
pub const CONFIG_FILENAME_ALT: &str = "compose-adapter.yaml";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:50051";
pub const DEFAULT_WORKERS: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    /// Address the gRPC server binds to.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Adapter root; projects live under `<root>/packages/`.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Requests served at once.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Grace period before a stopping container is killed.
    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,

    /// Engine overrides (`runtime`, `socket`); detected when absent.
    #[serde(flatten)]
    pub runtime: RuntimeConfig,

    /// Register with a process manager at startup when present.
    #[serde(default)]
    pub registration: Option<RegistrationConfig>,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 50051))
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            root: default_root(),
            workers: default_workers(),
            stop_timeout: default_stop_timeout(),
            runtime: RuntimeConfig::default(),
            registration: None,
        }
    }
}

impl AdapterConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the config file in `dir`, or fall back to defaults.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }

        tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if let Some(registration) = &self.registration {
            registration.validate()?;
        }
        Ok(())
    }

    /// Turn on registration from the `--register-adapter` values.
    ///
    /// A configured `epm_port` is kept.
    pub fn register_with(&mut self, values: &[String]) {
        let epm_port = self
            .registration
            .as_ref()
            .map_or(DEFAULT_EPM_PORT, |r| r.epm_port);
        let mut registration = RegistrationConfig::from_flag(values);
        registration.epm_port = epm_port;
        self.registration = Some(registration);
    }
}
