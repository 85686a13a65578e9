// ABOUTME: In-memory container engine for unit tests.
// ABOUTME: Records every call and lets tests inject failures per image or container.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerInfo, ContainerOps, ContainerState,
    ContainerSummary, CopyError, CopyOps, ExecConfig, ExecError, ExecOps, ExecResult, ImageError,
    ImageOps, NetworkConfig, NetworkError, NetworkOps, RegistryAuth, RuntimeInfo,
    RuntimeInfoError, RuntimeMetadata,
};
use crate::types::{ContainerId, ImageRef, NetworkAlias, NetworkId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct FakeContainer {
    pub id: ContainerId,
    pub config: ContainerConfig,
    pub state: ContainerState,
    pub networks: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub containers: Vec<FakeContainer>,
    pub networks: HashMap<String, HashMap<String, String>>,
    /// Images present locally.
    pub images: HashSet<String>,
    /// Every pull, with the credentials it carried.
    pub pulls: Vec<(String, Option<RegistryAuth>)>,
    /// Images whose pull fails.
    pub unpullable: HashSet<String>,
    /// Images whose local lookup fails.
    pub uninspectable: HashSet<String>,
    /// Container names whose creation fails.
    pub uncreatable: HashSet<String>,
    /// Networks that report active endpoints on removal.
    pub busy_networks: HashSet<String>,
    pub unreachable: bool,
    pub execs: HashMap<String, (ContainerId, Vec<String>)>,
    pub exec_stderr: Vec<u8>,
    pub uploads: Vec<(ContainerId, String, Vec<u8>)>,
    /// Archives served by `download_archive`, keyed by container id and path.
    pub files: HashMap<(String, String), Vec<u8>>,
    next_id: u64,
}

impl FakeState {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:012x}", prefix, self.next_id)
    }

    pub(crate) fn find(&self, id: &ContainerId) -> Option<&FakeContainer> {
        self.containers
            .iter()
            .find(|c| c.id == *id || c.config.name == id.as_str())
    }

    fn find_mut(&mut self, id: &ContainerId) -> Option<&mut FakeContainer> {
        self.containers
            .iter_mut()
            .find(|c| c.id == *id || c.config.name == id.as_str())
    }
}

/// Engine double backed by a mutex-guarded [`FakeState`].
#[derive(Debug, Default)]
pub(crate) struct FakeRuntime {
    pub state: Mutex<FakeState>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        let runtime = Self::default();
        runtime.state.lock().unreachable = true;
        runtime
    }

    pub fn container_named(&self, name: &str) -> Option<FakeContainer> {
        self.state
            .lock()
            .containers
            .iter()
            .find(|c| c.config.name == name)
            .cloned()
    }

    /// Simulate a container that exited on its own.
    pub fn kill(&self, name: &str) {
        let mut state = self.state.lock();
        if let Some(c) = state.containers.iter_mut().find(|c| c.config.name == name) {
            c.state = ContainerState::Exited;
        }
    }

    fn check_reachable(&self) -> Result<(), ContainerError> {
        if self.state.lock().unreachable {
            return Err(ContainerError::Unreachable("fake engine is down".to_string()));
        }
        Ok(())
    }
}

impl Sealed for FakeRuntime {}

#[async_trait]
impl RuntimeInfo for FakeRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        self.ping().await?;
        Ok(RuntimeMetadata {
            name: "Fake".to_string(),
            version: "0.0.0".to_string(),
            api_version: "1.0".to_string(),
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        if self.state.lock().unreachable {
            return Err(RuntimeInfoError::ConnectionFailed(
                "fake engine is down".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let name = reference.to_string();
        let mut state = self.state.lock();
        state.pulls.push((name.clone(), auth.cloned()));
        if state.unpullable.contains(&name) {
            return Err(ImageError::PullFailed(name));
        }
        state.images.insert(name);
        Ok(())
    }

    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        let name = reference.to_string();
        let state = self.state.lock();
        if state.uninspectable.contains(&name) {
            return Err(ImageError::Runtime(format!("failed to inspect {}", name)));
        }
        Ok(state.images.contains(&name))
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        self.check_reachable()?;
        let mut state = self.state.lock();
        if state.uncreatable.contains(&config.name) {
            return Err(ContainerError::InvalidConfig(config.name.clone()));
        }
        if state.containers.iter().any(|c| c.config.name == config.name) {
            return Err(ContainerError::AlreadyExists(config.name.clone()));
        }
        if !state.images.contains(&config.image.to_string()) {
            return Err(ContainerError::ImageNotFound(config.image.to_string()));
        }
        let id = ContainerId::new(state.allocate_id("c"));
        state.containers.push(FakeContainer {
            id: id.clone(),
            config: config.clone(),
            state: ContainerState::Created,
            networks: config.network.iter().cloned().collect(),
        });
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.check_reachable()?;
        let mut state = self.state.lock();
        let container = state
            .find_mut(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if container.state == ContainerState::Running {
            return Err(ContainerError::AlreadyRunning(id.to_string()));
        }
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: Duration,
    ) -> Result<(), ContainerError> {
        self.check_reachable()?;
        let mut state = self.state.lock();
        let container = state
            .find_mut(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if container.state != ContainerState::Running {
            return Err(ContainerError::NotRunning(id.to_string()));
        }
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        self.check_reachable()?;
        let mut state = self.state.lock();
        let index = state
            .containers
            .iter()
            .position(|c| c.id == *id || c.config.name == id.as_str())
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if state.containers[index].state == ContainerState::Running && !force {
            return Err(ContainerError::Runtime(format!(
                "cannot remove running container {}",
                id
            )));
        }
        state.containers.remove(index);
        Ok(())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        self.check_reachable()?;
        let state = self.state.lock();
        let container = state
            .find(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        Ok(ContainerInfo {
            id: container.id.clone(),
            name: container.config.name.clone(),
            image: container.config.image.to_string(),
            state: container.state,
            health: None,
            created: String::new(),
            labels: container.config.labels.clone(),
        })
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        self.check_reachable()?;
        let state = self.state.lock();
        Ok(state
            .containers
            .iter()
            .filter(|c| filters.all || c.state == ContainerState::Running)
            .filter(|c| {
                filters
                    .name
                    .as_ref()
                    .is_none_or(|name| c.config.name.contains(name.as_str()))
            })
            .filter(|c| {
                filters
                    .labels
                    .iter()
                    .all(|(k, v)| c.config.labels.get(k) == Some(v))
            })
            .map(|c| ContainerSummary {
                id: c.id.clone(),
                name: c.config.name.clone(),
                image: c.config.image.to_string(),
                state: c.state,
                status: format!("{:?}", c.state),
                labels: c.config.labels.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl NetworkOps for FakeRuntime {
    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkId, NetworkError> {
        let mut state = self.state.lock();
        if state.networks.contains_key(&config.name) {
            return Err(NetworkError::AlreadyExists(config.name.clone()));
        }
        state
            .networks
            .insert(config.name.clone(), config.labels.clone());
        Ok(NetworkId::new(config.name.clone()))
    }

    async fn remove_network(&self, id: &NetworkId) -> Result<(), NetworkError> {
        let mut state = self.state.lock();
        if state.busy_networks.contains(id.as_str()) {
            return Err(NetworkError::InUse(id.to_string()));
        }
        state
            .networks
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| NetworkError::NotFound(id.to_string()))
    }

    async fn connect_to_network(
        &self,
        container: &ContainerId,
        network: &NetworkId,
        _aliases: &[NetworkAlias],
    ) -> Result<(), NetworkError> {
        let mut state = self.state.lock();
        if !state.networks.contains_key(network.as_str()) {
            return Err(NetworkError::NotFound(network.to_string()));
        }
        let c = state
            .find_mut(container)
            .ok_or_else(|| NetworkError::NotFound(container.to_string()))?;
        c.networks.push(network.to_string());
        Ok(())
    }

    async fn network_exists(&self, name: &str) -> Result<bool, NetworkError> {
        Ok(self.state.lock().networks.contains_key(name))
    }
}

#[async_trait]
impl ExecOps for FakeRuntime {
    async fn exec_create(
        &self,
        container: &ContainerId,
        config: &ExecConfig,
    ) -> Result<String, ExecError> {
        let mut state = self.state.lock();
        let c = state
            .find(container)
            .ok_or_else(|| ExecError::ContainerNotFound(container.to_string()))?;
        if c.state != ContainerState::Running {
            return Err(ExecError::ContainerNotRunning(container.to_string()));
        }
        let container = c.id.clone();
        let exec_id = state.allocate_id("e");
        state
            .execs
            .insert(exec_id.clone(), (container, config.cmd.clone()));
        Ok(exec_id)
    }

    /// Echoes the last argument of the command on stdout.
    async fn exec_start(&self, exec_id: &str) -> Result<ExecResult, ExecError> {
        let state = self.state.lock();
        let (_, cmd) = state
            .execs
            .get(exec_id)
            .ok_or_else(|| ExecError::ExecNotFound(exec_id.to_string()))?;
        let stdout = cmd
            .last()
            .map(|arg| format!("{}\n", arg).into_bytes())
            .unwrap_or_default();
        Ok(ExecResult {
            exit_code: 0,
            stdout,
            stderr: state.exec_stderr.clone(),
        })
    }
}

#[async_trait]
impl CopyOps for FakeRuntime {
    async fn upload_archive(
        &self,
        container: &ContainerId,
        dir: &str,
        archive: Vec<u8>,
    ) -> Result<(), CopyError> {
        let mut state = self.state.lock();
        let id = state
            .find(container)
            .map(|c| c.id.clone())
            .ok_or_else(|| CopyError::ContainerNotFound(container.to_string()))?;
        state.uploads.push((id, dir.to_string(), archive));
        Ok(())
    }

    async fn download_archive(
        &self,
        container: &ContainerId,
        path: &str,
    ) -> Result<Vec<u8>, CopyError> {
        let state = self.state.lock();
        let id = state
            .find(container)
            .map(|c| c.id.to_string())
            .ok_or_else(|| CopyError::ContainerNotFound(container.to_string()))?;
        state
            .files
            .get(&(id, path.to_string()))
            .cloned()
            .ok_or_else(|| CopyError::PathNotFound(path.to_string()))
    }
}
