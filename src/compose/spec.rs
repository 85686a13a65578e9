// ABOUTME: Typed model of the compose file fields the adapter deploys.
// ABOUTME: Also resolves service start order and project-scoped network and volume names.

use super::error::ComposeError;
use super::restart_policy::RestartPolicy;
use crate::types::ProjectName;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Network every service joins when it declares none.
pub const DEFAULT_NETWORK: &str = "default";

/// A parsed compose file.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeSpec {
    pub services: BTreeMap<String, ServiceSpec>,
    #[serde(default)]
    pub networks: BTreeMap<String, Option<NetworkSpec>>,
    #[serde(default)]
    pub volumes: BTreeMap<String, Option<VolumeSpec>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub build: Option<Value>,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub command: Option<CommandSpec>,
    #[serde(default)]
    pub entrypoint: Option<CommandSpec>,
    #[serde(default)]
    pub environment: Option<KeyValues>,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub volumes: Vec<ServiceVolume>,
    #[serde(default)]
    pub labels: Option<KeyValues>,
    #[serde(default)]
    pub logging: Option<LoggingSpec>,
    #[serde(default)]
    pub restart: Option<RestartPolicy>,
    #[serde(default)]
    pub working_dir: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub networks: Option<ServiceNetworks>,
    #[serde(default)]
    pub network_mode: Option<String>,
    #[serde(default)]
    pub depends_on: Option<DependsOn>,
    #[serde(default)]
    pub healthcheck: Option<HealthcheckSpec>,
    #[serde(default)]
    pub mem_limit: Option<Value>,
    #[serde(default)]
    pub cpus: Option<Value>,
    #[serde(default, with = "humantime_serde")]
    pub stop_grace_period: Option<Duration>,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default)]
    pub tty: bool,
    #[serde(default)]
    pub stdin_open: bool,
}

/// `command`, `entrypoint` and healthcheck `test` accept both forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Shell(String),
    Exec(Vec<String>),
}

/// `environment` and `labels`: a `KEY=value` list or a mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KeyValues {
    List(Vec<String>),
    Map(BTreeMap<String, Option<Value>>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Number(u16),
    Short(String),
    Long {
        target: u16,
        #[serde(default)]
        published: Option<Value>,
        #[serde(default)]
        host_ip: Option<String>,
        #[serde(default)]
        protocol: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceVolume {
    Short(String),
    Long {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        source: Option<String>,
        target: String,
        #[serde(default)]
        read_only: bool,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSpec {
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServiceNetworks {
    List(Vec<String>),
    Map(BTreeMap<String, Option<ServiceNetworkSpec>>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceNetworkSpec {
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    List(Vec<String>),
    /// Conditions are accepted but only the ordering is honoured.
    Map(BTreeMap<String, Value>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthcheckSpec {
    #[serde(default)]
    pub test: Option<CommandSpec>,
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub start_period: Option<Duration>,
    #[serde(default)]
    pub disable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSpec {
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub external: Option<External>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolumeSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub external: Option<External>,
}

/// `external: true` or the legacy `external: {name: ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum External {
    Flag(bool),
    Named { name: String },
}

impl External {
    fn is_external(&self) -> bool {
        !matches!(self, External::Flag(false))
    }

    fn name(&self) -> Option<&str> {
        match self {
            External::Named { name } => Some(name),
            External::Flag(_) => None,
        }
    }
}

/// A network the project needs, resolved to its engine name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectNetwork {
    /// Key in the compose file.
    pub key: String,
    /// Name on the engine.
    pub name: String,
    pub driver: Option<String>,
    /// Owned by someone else; never created or removed.
    pub external: bool,
}

/// Render a YAML scalar the way compose does for env and label values.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

impl ComposeSpec {
    pub fn parse(content: &[u8]) -> Result<Self, ComposeError> {
        serde_yaml::from_slice(content).map_err(|e| ComposeError::invalid(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ComposeError> {
        let content = std::fs::read(path).map_err(|e| ComposeError::io(path, e))?;
        Self::parse(&content)
    }

    /// Service names with every dependency ahead of its dependents.
    ///
    /// Independent services keep alphabetical order so the result is stable.
    pub fn start_order(&self) -> Result<Vec<&str>, ComposeError> {
        let mut order = Vec::with_capacity(self.services.len());
        let mut visited = HashSet::new();
        let mut visiting = HashSet::new();

        for name in self.services.keys() {
            self.visit(name, &mut visited, &mut visiting, &mut order)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        service: &'a str,
        visited: &mut HashSet<&'a str>,
        visiting: &mut HashSet<&'a str>,
        order: &mut Vec<&'a str>,
    ) -> Result<(), ComposeError> {
        if visited.contains(service) {
            return Ok(());
        }
        if !visiting.insert(service) {
            return Err(ComposeError::invalid(format!(
                "circular dependency involving service `{}`",
                service
            )));
        }

        let Some((name, spec)) = self.services.get_key_value(service) else {
            return Ok(());
        };
        for dependency in spec.dependencies() {
            if !self.services.contains_key(dependency) {
                return Err(ComposeError::invalid(format!(
                    "service `{}` depends on undefined service `{}`",
                    name, dependency
                )));
            }
            self.visit(dependency, visited, visiting, order)?;
        }

        visiting.remove(name.as_str());
        visited.insert(name.as_str());
        order.push(name.as_str());
        Ok(())
    }

    /// Networks used by the project, `default` included when a service relies on it.
    pub fn project_networks(&self, project: &ProjectName) -> Vec<ProjectNetwork> {
        let uses_default = self.services.values().any(|s| {
            s.network_mode.is_none()
                && s.network_keys()
                    .iter()
                    .any(|key| key == DEFAULT_NETWORK)
        });

        let mut networks: Vec<ProjectNetwork> = self
            .networks
            .iter()
            .filter(|(key, _)| key.as_str() != DEFAULT_NETWORK)
            .map(|(key, _)| self.network(project, key))
            .collect();

        if uses_default {
            networks.insert(0, self.network(project, DEFAULT_NETWORK));
        }
        networks
    }

    /// Resolve a network key to its engine-side definition.
    pub fn network(&self, project: &ProjectName, key: &str) -> ProjectNetwork {
        let spec = self.networks.get(key).cloned().flatten().unwrap_or_default();
        let external = spec.external.as_ref().is_some_and(External::is_external);
        let name = match (&spec.external, &spec.name) {
            (Some(ext), _) if ext.is_external() => ext
                .name()
                .or(spec.name.as_deref())
                .unwrap_or(key)
                .to_string(),
            (_, Some(name)) => name.clone(),
            _ => project.scoped(key),
        };
        ProjectNetwork {
            key: key.to_string(),
            name,
            driver: spec.driver,
            external,
        }
    }

    /// Engine name of a top-level named volume.
    pub fn volume_name(&self, project: &ProjectName, key: &str) -> Result<String, ComposeError> {
        let Some(spec) = self.volumes.get(key) else {
            return Err(ComposeError::invalid(format!(
                "volume `{}` is not declared under top-level `volumes`",
                key
            )));
        };
        let spec = spec.clone().unwrap_or_default();
        Ok(match (&spec.external, &spec.name) {
            (Some(ext), _) if ext.is_external() => ext
                .name()
                .or(spec.name.as_deref())
                .unwrap_or(key)
                .to_string(),
            (_, Some(name)) => name.clone(),
            _ => project.scoped(key),
        })
    }
}

impl ServiceSpec {
    pub fn dependencies(&self) -> Vec<&str> {
        match &self.depends_on {
            Some(DependsOn::List(list)) => list.iter().map(String::as_str).collect(),
            Some(DependsOn::Map(map)) => map.keys().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    /// Network keys the service joins, in declaration order.
    pub fn network_keys(&self) -> Vec<String> {
        match &self.networks {
            Some(ServiceNetworks::List(list)) if !list.is_empty() => list.clone(),
            Some(ServiceNetworks::Map(map)) if !map.is_empty() => map.keys().cloned().collect(),
            _ => vec![DEFAULT_NETWORK.to_string()],
        }
    }

    /// Extra aliases declared for the service on `network`.
    pub fn aliases_on(&self, network: &str) -> Vec<String> {
        match &self.networks {
            Some(ServiceNetworks::Map(map)) => map
                .get(network)
                .cloned()
                .flatten()
                .map(|n| n.aliases)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}
