// ABOUTME: Turns a compose service into the engine's container configuration.
// ABOUTME: Parses short port and volume syntax and applies compose naming rules.

use super::error::ComposeError;
use super::labels;
use super::spec::{
    CommandSpec, ComposeSpec, HealthcheckSpec, KeyValues, LoggingSpec, PortSpec, ServiceSpec,
    ServiceVolume, scalar_to_string,
};
use crate::runtime::{
    ContainerConfig, HealthcheckConfig, LogConfig, MountKind, PortMapping, Protocol,
    ResourceLimits, VolumeMount,
};
use crate::types::{ImageRef, NetworkAlias, NetworkId, ProjectName};
use std::path::{Component, Path, PathBuf};

/// Log driver the engine uses when a service names none.
const ENGINE_DEFAULT_LOG_DRIVER: &str = "json-file";

/// Everything needed to create one service's container.
#[derive(Debug, Clone)]
pub struct ServicePlan {
    pub service: String,
    pub config: ContainerConfig,
    /// Networks joined after creation; the engine attaches only one at create time.
    pub extra_networks: Vec<(NetworkId, Vec<NetworkAlias>)>,
}

/// Default container name for a service: `<project label>-<service>-1`.
pub fn container_name(project: &ProjectName, service: &str) -> String {
    format!("{}-{}-1", project.label(), service)
}

/// Build the container plan for `service_name`.
pub fn plan_service(
    project: &ProjectName,
    project_dir: &Path,
    spec: &ComposeSpec,
    service_name: &str,
) -> Result<ServicePlan, ComposeError> {
    let service = spec.services.get(service_name).ok_or_else(|| {
        ComposeError::invalid(format!("service `{}` is not defined", service_name))
    })?;

    let image = match (&service.image, &service.build) {
        (Some(image), _) => ImageRef::parse(image).map_err(|e| {
            ComposeError::invalid(format!("service `{}`: {}", service_name, e))
        })?,
        (None, Some(_)) => {
            return Err(ComposeError::invalid(format!(
                "service `{}` has no image; building images is not supported",
                service_name
            )));
        }
        (None, None) => {
            return Err(ComposeError::invalid(format!(
                "service `{}` has no image",
                service_name
            )));
        }
    };

    let name = service
        .container_name
        .clone()
        .unwrap_or_else(|| container_name(project, service_name));
    let mut config = ContainerConfig::new(name, image);

    config.command = service
        .command
        .as_ref()
        .map(|c| argv(service_name, "command", c))
        .transpose()?;
    config.entrypoint = service
        .entrypoint
        .as_ref()
        .map(|c| argv(service_name, "entrypoint", c))
        .transpose()?;
    config.env = service
        .environment
        .as_ref()
        .map(environment)
        .transpose()
        .map_err(|e| in_service(service_name, e))?
        .unwrap_or_default();

    if let Some(ref declared) = service.labels {
        config.labels = key_values(declared)
            .map_err(|e| in_service(service_name, e))?
            .into_iter()
            .collect();
    }
    // Compose labels win over user labels so the project can always be found.
    config
        .labels
        .extend(labels::service_labels(project, service_name));

    config.ports = service
        .ports
        .iter()
        .map(parse_port)
        .collect::<Result<_, _>>()
        .map_err(|e| in_service(service_name, e))?;

    config.volumes = service
        .volumes
        .iter()
        .map(|v| parse_volume(v, project, project_dir, spec))
        .collect::<Result<_, _>>()
        .map_err(|e| in_service(service_name, e))?;

    config.log_config = service.logging.as_ref().map(log_config);
    config.restart_policy = service
        .restart
        .as_ref()
        .map(Into::into)
        .unwrap_or_default();
    config.healthcheck = service.healthcheck.as_ref().and_then(healthcheck);
    config.resources = resources(service).map_err(|e| in_service(service_name, e))?;
    config.stop_timeout = service.stop_grace_period;
    config.working_dir = service.working_dir.clone();
    config.user = service.user.clone();
    config.hostname = service.hostname.clone();
    config.privileged = service.privileged;
    config.tty = service.tty;
    config.stdin_open = service.stdin_open;

    let mut extra_networks = Vec::new();
    match service.network_mode {
        Some(ref mode) => {
            config.network = Some(match mode.strip_prefix("service:") {
                Some(other) => format!("container:{}", container_name_of(project, spec, other)?),
                None => mode.clone(),
            });
        }
        None => {
            for (index, key) in service.network_keys().iter().enumerate() {
                if key != super::spec::DEFAULT_NETWORK && !spec.networks.contains_key(key) {
                    return Err(ComposeError::invalid(format!(
                        "service `{}` uses undefined network `{}`",
                        service_name, key
                    )));
                }
                let network = spec.network(project, key);
                let aliases = network_aliases(service_name, service, key)?;
                if index == 0 {
                    config.network = Some(network.name);
                    config.network_aliases = aliases;
                } else {
                    extra_networks.push((NetworkId::new(network.name), aliases));
                }
            }
        }
    }

    Ok(ServicePlan {
        service: service_name.to_string(),
        config,
        extra_networks,
    })
}

fn in_service(service: &str, e: ComposeError) -> ComposeError {
    match e {
        ComposeError::InvalidSpec(msg) => {
            ComposeError::InvalidSpec(format!("service `{}`: {}", service, msg))
        }
        other => other,
    }
}

fn container_name_of(
    project: &ProjectName,
    spec: &ComposeSpec,
    service: &str,
) -> Result<String, ComposeError> {
    let target = spec.services.get(service).ok_or_else(|| {
        ComposeError::invalid(format!("network_mode refers to undefined service `{}`", service))
    })?;
    Ok(target
        .container_name
        .clone()
        .unwrap_or_else(|| container_name(project, service)))
}

fn network_aliases(
    service_name: &str,
    service: &ServiceSpec,
    network: &str,
) -> Result<Vec<NetworkAlias>, ComposeError> {
    std::iter::once(service_name.to_string())
        .chain(service.aliases_on(network))
        .map(|alias| {
            NetworkAlias::new(&alias).map_err(|e| {
                ComposeError::invalid(format!("alias `{}` on `{}`: {}", alias, network, e))
            })
        })
        .collect()
}

/// String forms are split with shell quoting rules, like compose does.
fn argv(service: &str, field: &str, command: &CommandSpec) -> Result<Vec<String>, ComposeError> {
    match command {
        CommandSpec::Shell(line) => shlex::split(line).ok_or_else(|| {
            ComposeError::invalid(format!(
                "service `{}`: unbalanced quoting in {}: {}",
                service, field, line
            ))
        }),
        CommandSpec::Exec(args) => Ok(args.clone()),
    }
}

fn environment(values: &KeyValues) -> Result<Vec<String>, ComposeError> {
    match values {
        KeyValues::List(list) => Ok(list.clone()),
        KeyValues::Map(map) => map
            .iter()
            .map(|(key, value)| match value {
                // A bare key passes the variable through unset.
                None => Ok(key.clone()),
                Some(value) => scalar_to_string(value)
                    .map(|v| format!("{}={}", key, v))
                    .ok_or_else(|| {
                        ComposeError::invalid(format!("environment `{}` must be a scalar", key))
                    }),
            })
            .collect(),
    }
}

fn key_values(values: &KeyValues) -> Result<Vec<(String, String)>, ComposeError> {
    match values {
        KeyValues::List(list) => Ok(list
            .iter()
            .map(|item| match item.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (item.clone(), String::new()),
            })
            .collect()),
        KeyValues::Map(map) => map
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    None => String::new(),
                    Some(v) => scalar_to_string(v).ok_or_else(|| {
                        ComposeError::invalid(format!("label `{}` must be a scalar", key))
                    })?,
                };
                Ok((key.clone(), value))
            })
            .collect(),
    }
}

fn parse_protocol(protocol: &str) -> Result<Protocol, ComposeError> {
    match protocol {
        "tcp" => Ok(Protocol::Tcp),
        "udp" => Ok(Protocol::Udp),
        other => Err(ComposeError::invalid(format!(
            "unsupported port protocol `{}`",
            other
        ))),
    }
}

fn parse_port_number(value: &str, spec: &str) -> Result<u16, ComposeError> {
    value
        .parse()
        .map_err(|_| ComposeError::invalid(format!("invalid port `{}` in `{}`", value, spec)))
}

/// Parse `c`, `h:c` or `ip:h:c`, each with an optional `/tcp` or `/udp` suffix.
fn parse_port(port: &PortSpec) -> Result<PortMapping, ComposeError> {
    match port {
        PortSpec::Number(container_port) => Ok(PortMapping {
            host_port: None,
            container_port: *container_port,
            protocol: Protocol::Tcp,
            host_ip: None,
        }),
        PortSpec::Short(spec) => {
            let (mapping, protocol) = match spec.split_once('/') {
                Some((mapping, protocol)) => (mapping, parse_protocol(protocol)?),
                None => (spec.as_str(), Protocol::Tcp),
            };
            if mapping.contains('-') {
                return Err(ComposeError::invalid(format!(
                    "port ranges are not supported: `{}`",
                    spec
                )));
            }

            let mut parts = mapping.rsplitn(3, ':');
            let container_port = parse_port_number(parts.next().unwrap_or_default(), spec)?;
            let host_port = match parts.next() {
                Some("") | None => None,
                Some(host) => Some(parse_port_number(host, spec)?),
            };
            let host_ip = parts
                .next()
                .map(|ip| ip.trim_start_matches('[').trim_end_matches(']').to_string())
                .filter(|ip| !ip.is_empty());

            Ok(PortMapping {
                host_port,
                container_port,
                protocol,
                host_ip,
            })
        }
        PortSpec::Long {
            target,
            published,
            host_ip,
            protocol,
        } => {
            let host_port = match published.as_ref().and_then(scalar_to_string) {
                Some(p) if !p.is_empty() => Some(parse_port_number(&p, &p)?),
                _ => None,
            };
            Ok(PortMapping {
                host_port,
                container_port: *target,
                protocol: protocol
                    .as_deref()
                    .map(parse_protocol)
                    .transpose()?
                    .unwrap_or_default(),
                host_ip: host_ip.clone(),
            })
        }
    }
}

fn is_host_path(source: &str) -> bool {
    source.starts_with('.') || source.starts_with('/') || source.starts_with('~')
}

/// Absolute, lexically normalised host path for a bind source.
fn resolve_host_path(source: &str, project_dir: &Path) -> Result<String, ComposeError> {
    let path = match source.strip_prefix('~') {
        Some(rest) => {
            let home = std::env::var("HOME")
                .map_err(|_| ComposeError::invalid("`~` used in a volume but HOME is unset"))?;
            PathBuf::from(home).join(rest.trim_start_matches('/'))
        }
        None => project_dir.join(source),
    };
    let path = std::path::absolute(&path).map_err(|e| ComposeError::io(&path, e))?;

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized.to_string_lossy().into_owned())
}

fn parse_volume(
    volume: &ServiceVolume,
    project: &ProjectName,
    project_dir: &Path,
    spec: &ComposeSpec,
) -> Result<VolumeMount, ComposeError> {
    let mount = |source: Option<&str>, target: &str, read_only: bool| -> Result<VolumeMount, ComposeError> {
        match source {
            None | Some("") => Ok(VolumeMount {
                kind: MountKind::Volume,
                source: String::new(),
                target: target.to_string(),
                read_only,
            }),
            Some(source) if is_host_path(source) => Ok(VolumeMount {
                kind: MountKind::Bind,
                source: resolve_host_path(source, project_dir)?,
                target: target.to_string(),
                read_only,
            }),
            Some(source) => Ok(VolumeMount {
                kind: MountKind::Volume,
                source: spec.volume_name(project, source)?,
                target: target.to_string(),
                read_only,
            }),
        }
    };

    match volume {
        ServiceVolume::Short(short) => {
            let parts: Vec<&str> = short.split(':').collect();
            match parts.as_slice() {
                [target] => mount(None, *target, false),
                [source, target] => mount(Some(*source), *target, false),
                [source, target, mode] => {
                    let read_only = mode.split(',').any(|m| m == "ro");
                    mount(Some(*source), *target, read_only)
                }
                _ => Err(ComposeError::invalid(format!(
                    "invalid volume `{}`",
                    short
                ))),
            }
        }
        ServiceVolume::Long {
            kind,
            source,
            target,
            read_only,
        } => match kind.as_deref() {
            Some("bind") => {
                let source = source.as_deref().ok_or_else(|| {
                    ComposeError::invalid(format!("bind mount for `{}` needs a source", target))
                })?;
                Ok(VolumeMount {
                    kind: MountKind::Bind,
                    source: resolve_host_path(source, project_dir)?,
                    target: target.clone(),
                    read_only: *read_only,
                })
            }
            Some("volume") | None => mount(source.as_deref(), target, *read_only),
            Some(other) => Err(ComposeError::invalid(format!(
                "unsupported mount type `{}`",
                other
            ))),
        },
    }
}

fn log_config(logging: &LoggingSpec) -> LogConfig {
    LogConfig {
        driver: logging
            .driver
            .clone()
            .unwrap_or_else(|| ENGINE_DEFAULT_LOG_DRIVER.to_string()),
        options: logging
            .options
            .iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k.clone(), v)))
            .collect(),
    }
}

fn healthcheck(spec: &HealthcheckSpec) -> Option<HealthcheckConfig> {
    let test = if spec.disable {
        vec!["NONE".to_string()]
    } else {
        match spec.test.as_ref()? {
            CommandSpec::Shell(s) => vec!["CMD-SHELL".to_string(), s.clone()],
            CommandSpec::Exec(args) => args.clone(),
        }
    };
    Some(HealthcheckConfig {
        test,
        interval: spec.interval,
        timeout: spec.timeout,
        retries: spec.retries,
        start_period: spec.start_period,
    })
}

fn resources(service: &ServiceSpec) -> Result<Option<ResourceLimits>, ComposeError> {
    let memory = match &service.mem_limit {
        None => None,
        Some(value) => {
            let text = scalar_to_string(value).unwrap_or_default();
            Some(parse_memory_string(&text).ok_or_else(|| {
                ComposeError::invalid(format!("invalid mem_limit `{}`", text))
            })?)
        }
    };
    let cpus = match &service.cpus {
        None => None,
        Some(value) => {
            let text = scalar_to_string(value).unwrap_or_default();
            Some(
                text.parse::<f64>()
                    .map_err(|_| ComposeError::invalid(format!("invalid cpus `{}`", text)))?,
            )
        }
    };
    Ok((memory.is_some() || cpus.is_some()).then_some(ResourceLimits { memory, cpus }))
}

/// Parse a memory string like "512m", "1g" or "1gb" into bytes.
fn parse_memory_string(spec: &str) -> Option<u64> {
    let spec = spec.trim().to_lowercase();
    let spec = spec.strip_suffix('b').unwrap_or(&spec);
    let (num_str, multiplier) = if let Some(n) = spec.strip_suffix('g') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = spec.strip_suffix('m') {
        (n, 1024 * 1024)
    } else if let Some(n) = spec.strip_suffix('k') {
        (n, 1024)
    } else {
        (spec, 1)
    };

    num_str.trim().parse::<u64>().ok().map(|n| n * multiplier)
}
