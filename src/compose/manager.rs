// ABOUTME: Brings compose projects up and down on the container engine.
// ABOUTME: Idempotent, no-recreate deploys; best-effort per service with no rollback.

use super::convert::{ServicePlan, plan_service};
use super::error::ComposeError;
use super::labels;
use super::spec::ComposeSpec;
use super::store::SPEC_FILE;
use crate::diagnostics::{Diagnostics, Warning};
use crate::package::RegistryLogin;
use crate::runtime::{
    ContainerError, ContainerSummary, FullRuntime, NetworkConfig, NetworkError,
};
use crate::types::{ContainerId, NetworkId, ProjectName};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A service whose container could not be created or started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub service: String,
    pub reason: String,
}

/// Result of bringing a project up.
#[derive(Debug, Clone, Default)]
pub struct UpOutcome {
    /// Project containers ordered by container name.
    pub containers: Vec<ContainerId>,
    pub failures: Vec<ServiceFailure>,
}

impl UpOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compose lifecycle over any engine implementing the capability traits.
pub struct ComposeManager<R> {
    runtime: Arc<R>,
    stop_timeout: Duration,
}

impl<R: FullRuntime> ComposeManager<R> {
    pub fn new(runtime: Arc<R>, stop_timeout: Duration) -> Self {
        Self {
            runtime,
            stop_timeout,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Grace period given to containers before they are killed.
    pub fn stop_timeout(&self) -> Duration {
        self.stop_timeout
    }

    /// Deploy the project stored at `project_dir`, detached and without recreating.
    ///
    /// Registry credentials are only sent with pulls of images hosted on
    /// that registry.
    pub async fn up(
        &self,
        project_dir: &Path,
        registry: Option<&RegistryLogin>,
    ) -> Result<UpOutcome, ComposeError> {
        let project = project_of(project_dir)?;
        let spec = ComposeSpec::load(&project_dir.join(SPEC_FILE))?;

        self.runtime.ping().await?;

        let plans = spec
            .start_order()?
            .into_iter()
            .map(|service| plan_service(&project, project_dir, &spec, service))
            .collect::<Result<Vec<_>, _>>()?;

        self.ensure_networks(&project, &spec).await?;

        let existing = self.existing_services(&project).await?;
        self.pull_missing_images(&plans, &existing, registry)
            .await?;

        let mut failures = Vec::new();
        for plan in &plans {
            if let Err(reason) = self.converge(plan, existing.get(&plan.service)).await {
                tracing::warn!(
                    project = %project,
                    service = %plan.service,
                    error = %reason,
                    "service failed to come up"
                );
                failures.push(ServiceFailure {
                    service: plan.service.clone(),
                    reason,
                });
            }
        }

        let containers: Vec<ContainerId> = self
            .service_containers(&project, &spec)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        tracing::info!(
            project = %project,
            containers = containers.len(),
            failed = failures.len(),
            "project up"
        );

        Ok(UpOutcome {
            containers,
            failures,
        })
    }

    /// Stop and remove the project's service containers and networks.
    ///
    /// Volumes are kept, and containers of services no longer in the spec
    /// are left alone.
    pub async fn down(
        &self,
        project_dir: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ComposeError> {
        let project = project_of(project_dir)?;
        let spec = ComposeSpec::load(&project_dir.join(SPEC_FILE))?;

        self.runtime.ping().await?;

        let mut first_error: Option<ComposeError> = None;

        for container in self.service_containers(&project, &spec).await? {
            if let Err(e) = self.stop_and_remove(&container).await {
                if matches!(e, ComposeError::EngineUnavailable(_)) {
                    return Err(e);
                }
                tracing::warn!(container = %container.name, error = %e, "failed to remove container");
                first_error.get_or_insert(e);
            }
        }

        for network in spec.project_networks(&project) {
            if network.external {
                continue;
            }
            match self
                .runtime
                .remove_network(&NetworkId::new(network.name.clone()))
                .await
            {
                Ok(()) => tracing::debug!(network = %network.name, "network removed"),
                Err(NetworkError::NotFound(_)) => {}
                Err(NetworkError::InUse(_)) => {
                    diagnostics.warn(Warning::network_in_use(format!(
                        "network {} is still in use and was kept",
                        network.name
                    )));
                }
                Err(e) => {
                    first_error.get_or_insert(ComposeError::Engine(e.to_string()));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!(project = %project, "project down");
                Ok(())
            }
        }
    }

    /// Containers of the spec's services, one-offs included, ordered by name.
    pub async fn service_containers(
        &self,
        project: &ProjectName,
        spec: &ComposeSpec,
    ) -> Result<Vec<ContainerSummary>, ComposeError> {
        let containers = self.project_containers(project).await?;
        Ok(containers
            .into_iter()
            .filter(|c| {
                c.label(labels::SERVICE)
                    .is_some_and(|service| spec.services.contains_key(service))
            })
            .collect())
    }

    /// Every container labelled with the project, ordered by name.
    pub async fn project_containers(
        &self,
        project: &ProjectName,
    ) -> Result<Vec<ContainerSummary>, ComposeError> {
        let listed = self
            .runtime
            .list_containers(&labels::project_filter(project))
            .await?;

        let mut seen = HashSet::new();
        let mut containers: Vec<ContainerSummary> = listed
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        containers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(containers)
    }

    async fn ensure_networks(
        &self,
        project: &ProjectName,
        spec: &ComposeSpec,
    ) -> Result<(), ComposeError> {
        for network in spec.project_networks(project) {
            let exists = self
                .runtime
                .network_exists(&network.name)
                .await
                .map_err(|e| ComposeError::DeploymentFailed(e.to_string()))?;

            if network.external {
                if !exists {
                    return Err(ComposeError::DeploymentFailed(format!(
                        "external network {} not found",
                        network.name
                    )));
                }
                continue;
            }
            if exists {
                continue;
            }

            let config = NetworkConfig {
                name: network.name.clone(),
                driver: network.driver.clone(),
                labels: labels::network_labels(project, &network.key),
            };
            match self.runtime.create_network(&config).await {
                Ok(_) | Err(NetworkError::AlreadyExists(_)) => {
                    tracing::debug!(network = %network.name, "network ready");
                }
                Err(e) => {
                    return Err(ComposeError::DeploymentFailed(format!(
                        "creating network {}: {}",
                        network.name, e
                    )));
                }
            }
        }
        Ok(())
    }

    /// Regular containers of the project keyed by service name.
    async fn existing_services(
        &self,
        project: &ProjectName,
    ) -> Result<HashMap<String, ContainerSummary>, ComposeError> {
        let mut existing = HashMap::new();
        for container in self.project_containers(project).await? {
            if labels::is_oneoff(&container.labels) {
                continue;
            }
            if let Some(service) = container.label(labels::SERVICE) {
                existing
                    .entry(service.to_string())
                    .or_insert(container.clone());
            }
        }
        Ok(existing)
    }

    async fn pull_missing_images(
        &self,
        plans: &[ServicePlan],
        existing: &HashMap<String, ContainerSummary>,
        registry: Option<&RegistryLogin>,
    ) -> Result<(), ComposeError> {
        let mut pulled = HashSet::new();
        for plan in plans {
            if existing.contains_key(&plan.service) {
                continue;
            }
            let image = &plan.config.image;
            if !pulled.insert(image.to_string()) {
                continue;
            }
            if self.runtime.image_exists(image).await? {
                continue;
            }

            let auth = registry
                .filter(|login| image.is_served_by(&login.address))
                .map(|login| &login.auth);
            tracing::info!(
                service = %plan.service,
                registry = image.registry_host(),
                repository = image.repository(),
                tag = image.tag().unwrap_or_default(),
                digest = image.digest().unwrap_or_default(),
                authenticated = auth.is_some(),
                "pulling image"
            );

            self.runtime.pull_image(image, auth).await.map_err(|e| {
                ComposeError::DeploymentFailed(format!(
                    "pulling {} for service {}: {}",
                    image, plan.service, e
                ))
            })?;
        }
        Ok(())
    }

    /// Make the service's container exist and run.
    async fn converge(
        &self,
        plan: &ServicePlan,
        existing: Option<&ContainerSummary>,
    ) -> Result<(), String> {
        if let Some(container) = existing {
            if container.is_running() {
                tracing::debug!(service = %plan.service, "container up to date");
                return Ok(());
            }
            return match self.runtime.start_container(&container.id).await {
                Ok(()) | Err(ContainerError::AlreadyRunning(_)) => {
                    tracing::info!(service = %plan.service, "existing container started");
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            };
        }

        let id = self
            .runtime
            .create_container(&plan.config)
            .await
            .map_err(|e| e.to_string())?;

        for (network, aliases) in &plan.extra_networks {
            self.runtime
                .connect_to_network(&id, network, aliases)
                .await
                .map_err(|e| format!("joining {}: {}", network, e))?;
        }

        self.runtime
            .start_container(&id)
            .await
            .map_err(|e| e.to_string())?;
        tracing::info!(service = %plan.service, container = %plan.config.name, "container created");
        Ok(())
    }

    async fn stop_and_remove(&self, container: &ContainerSummary) -> Result<(), ComposeError> {
        if container.is_running() {
            match self
                .runtime
                .stop_container(&container.id, self.stop_timeout)
                .await
            {
                Ok(()) | Err(ContainerError::NotRunning(_)) | Err(ContainerError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        match self.runtime.remove_container(&container.id, true).await {
            Ok(()) | Err(ContainerError::NotFound(_)) => {
                tracing::debug!(container = %container.name, "container removed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// The project is named after its directory.
fn project_of(project_dir: &Path) -> Result<ProjectName, ComposeError> {
    let name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ComposeError::invalid(format!("{} is not a project directory", project_dir.display()))
        })?;
    ProjectName::new(name).map_err(|e| ComposeError::invalid(e.to_string()))
}
