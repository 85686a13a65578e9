// ABOUTME: Resource group operations behind the remote interface.
// ABOUTME: Validates each request, delegates to the store, compose manager or engine, and tags failures with their stage.

use super::error::{
    ComposeSnafu, ExecSnafu, GroupError, HostFileSnafu, InvalidCommandSnafu,
    InvalidProjectNameSnafu, MalformedPackageSnafu, MissingPropertySnafu, NothingDeployedSnafu,
    Stage, StoreSnafu, TaskSnafu, TransferSnafu, UnknownProjectSnafu,
};
use super::locks::ProjectLocks;
use super::state::{DeploymentRegistry, DeploymentState, GroupStatus};
use crate::compose::{ComposeManager, ProjectStore, StoreError, logging};
use crate::diagnostics::{Diagnostics, Warning};
use crate::package;
use crate::runtime::{ContainerError, ContainerState, ExecConfig, FullRuntime};
use crate::types::{ContainerId, ProjectName};
use snafu::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Upload mode that names a host path instead of carrying bytes.
pub const WITH_PATH: &str = "withPath";

/// A deployed project and its containers, ordered by container name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    pub name: String,
    pub container_ids: Vec<ContainerId>,
}

pub struct ResourceGroupFacade<R> {
    store: ProjectStore,
    compose: ComposeManager<R>,
    registry: DeploymentRegistry,
    locks: ProjectLocks,
}

impl<R: FullRuntime> ResourceGroupFacade<R> {
    pub fn new(runtime: Arc<R>, root: impl AsRef<Path>, stop_timeout: Duration) -> Self {
        Self {
            store: ProjectStore::new(root),
            compose: ComposeManager::new(runtime, stop_timeout),
            registry: DeploymentRegistry::default(),
            locks: ProjectLocks::default(),
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    fn runtime(&self) -> &R {
        self.compose.runtime()
    }

    /// Deploy the package in `file`.
    ///
    /// `options` are positional: `["True", "<syslog address>"]` turns on
    /// default logging for services that declare none.
    pub async fn create(&self, file: &[u8], options: &[String]) -> Result<ResourceGroup, GroupError> {
        let package = package::extract(file).context(MalformedPackageSnafu)?;
        let project = ProjectName::new(&package.name).context(InvalidProjectNameSnafu {
            name: package.name.clone(),
        })?;

        let _guard = self.locks.lock(&project).await;
        tracing::info!(project = %project, bytes = file.len(), "creating resource group");

        let stage = Stage::ProjectStore;
        let dir = self.store.ensure(&project).context(StoreSnafu { stage })?;
        let spec_path = self
            .store
            .write_spec(&project, &package.compose)
            .context(StoreSnafu { stage })?;

        let mut diagnostics = Diagnostics::default();
        let login = package.metadata.registry_login(&mut diagnostics);

        if let Some(address) = logging::requested_address(options) {
            logging::apply_default_logging(&spec_path, address).context(ComposeSnafu {
                stage: Stage::LoggingInjection,
            })?;
        }

        self.registry.set(&project, DeploymentState::Deploying);
        let outcome = match self.compose.up(&dir, login.as_ref()).await {
            Ok(outcome) => outcome,
            Err(source) => {
                self.registry.set(&project, DeploymentState::Failed);
                return Err(source).context(ComposeSnafu {
                    stage: Stage::Deployment,
                });
            }
        };

        let state = DeploymentState::after(&outcome);
        self.registry.set(&project, state);

        for failure in &outcome.failures {
            diagnostics.warn(Warning::service_failed(format!(
                "service {} of {} failed: {}",
                failure.service, project, failure.reason
            )));
        }

        if state == DeploymentState::Failed {
            let reasons = outcome
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.service, f.reason))
                .collect::<Vec<_>>()
                .join("; ");
            return NothingDeployedSnafu {
                project: project.as_str(),
                reasons,
            }
            .fail();
        }

        tracing::info!(
            project = %project,
            containers = outcome.containers.len(),
            state = ?state,
            warnings = diagnostics.warnings().len(),
            "resource group created"
        );

        Ok(ResourceGroup {
            name: project.to_string(),
            container_ids: outcome.containers,
        })
    }

    /// Tear down the project and delete its stored spec.
    pub async fn remove(&self, resource_id: &str) -> Result<(), GroupError> {
        let project = ProjectName::new(resource_id).context(InvalidProjectNameSnafu {
            name: resource_id,
        })?;
        let _guard = self.locks.lock(&project).await;

        let stage = Stage::Teardown;
        let dir = self.store.locate(&project).context(StoreSnafu { stage })?;

        let mut diagnostics = Diagnostics::default();
        self.compose
            .down(&dir, &mut diagnostics)
            .await
            .context(ComposeSnafu { stage })?;
        self.store.delete(&project).context(StoreSnafu { stage })?;
        self.registry.forget(&project);

        tracing::info!(project = %project, warnings = diagnostics.warnings().len(), "resource group removed");
        Ok(())
    }

    /// Status of a project, from the last deployment this process ran or
    /// from its live containers.
    pub async fn check_status(&self, resource_id: &str) -> Result<GroupStatus, GroupError> {
        let project = ProjectName::new(resource_id).context(InvalidProjectNameSnafu {
            name: resource_id,
        })?;

        if let Some(record) = self.registry.get(&project) {
            return Ok(record.state.into());
        }

        let containers = self
            .compose
            .project_containers(&project)
            .await
            .context(ComposeSnafu {
                stage: Stage::Container,
            })?;

        if containers.is_empty() {
            return match self.store.locate(&project) {
                Ok(_) => Ok(GroupStatus::Inactive),
                Err(StoreError::ProjectNotFound(_)) => UnknownProjectSnafu {
                    stage: Stage::Container,
                    project: project.as_str(),
                }
                .fail(),
                Err(source) => Err(source).context(StoreSnafu {
                    stage: Stage::Container,
                }),
            };
        }

        if containers.iter().all(|c| c.is_running()) {
            Ok(GroupStatus::Active)
        } else {
            Ok(GroupStatus::Inactive)
        }
    }

    pub async fn check_if_container_exists(&self, resource_id: &str) -> Result<bool, GroupError> {
        Ok(self.container_state(resource_id).await?.is_some())
    }

    pub async fn check_if_container_running(&self, resource_id: &str) -> Result<bool, GroupError> {
        Ok(self.container_state(resource_id).await? == Some(ContainerState::Running))
    }

    async fn container_state(
        &self,
        resource_id: &str,
    ) -> Result<Option<ContainerState>, GroupError> {
        match self
            .runtime()
            .inspect_container(&ContainerId::new(resource_id))
            .await
        {
            Ok(info) => Ok(Some(info.state)),
            Err(ContainerError::NotFound(_)) => Ok(None),
            Err(source) => Err(GroupError::Container { source }),
        }
    }

    pub async fn start_container(&self, resource_id: &str) -> Result<(), GroupError> {
        match self
            .runtime()
            .start_container(&ContainerId::new(resource_id))
            .await
        {
            Ok(()) | Err(ContainerError::AlreadyRunning(_)) => {
                tracing::info!(container = resource_id, "container started");
                Ok(())
            }
            Err(source) => Err(GroupError::Container { source }),
        }
    }

    pub async fn stop_container(&self, resource_id: &str) -> Result<(), GroupError> {
        match self
            .runtime()
            .stop_container(&ContainerId::new(resource_id), self.compose.stop_timeout())
            .await
        {
            Ok(()) | Err(ContainerError::NotRunning(_)) => {
                tracing::info!(container = resource_id, "container stopped");
                Ok(())
            }
            Err(source) => Err(GroupError::Container { source }),
        }
    }

    /// Run `command` inside the container. Returns stdout followed by stderr.
    ///
    /// A single entry is a command line and is split the way a shell would;
    /// several entries are taken as the argument vector.
    pub async fn execute_command(
        &self,
        resource_id: &str,
        command: &[String],
    ) -> Result<String, GroupError> {
        let cmd = match command {
            [] => Vec::new(),
            [line] => shlex::split(line).context(InvalidCommandSnafu {
                command: line.as_str(),
            })?,
            argv => argv.to_vec(),
        };
        if cmd.is_empty() {
            return MissingPropertySnafu {
                stage: Stage::Container,
                what: "command",
            }
            .fail();
        }

        let config = ExecConfig {
            cmd,
            ..Default::default()
        };
        let result = self
            .runtime()
            .exec(&ContainerId::new(resource_id), &config)
            .await
            .context(ExecSnafu)?;

        tracing::debug!(container = resource_id, exit_code = result.exit_code, "command executed");
        Ok(result.combined_output())
    }

    /// Tar archive of `property[0]` inside the container.
    pub async fn download_file(
        &self,
        resource_id: &str,
        property: &[String],
    ) -> Result<Vec<u8>, GroupError> {
        let Some(path) = property.first() else {
            return MissingPropertySnafu {
                stage: Stage::Container,
                what: "path",
            }
            .fail();
        };

        self.runtime()
            .download_archive(&ContainerId::new(resource_id), path)
            .await
            .context(TransferSnafu)
    }

    /// Copy into the container.
    ///
    /// With `property = ["withPath", host, remote]` the host file or
    /// directory is packed and extracted under `remote`. Otherwise `file`
    /// is a tar archive extracted under `property[1]`, or `property[0]`
    /// when that is the only entry.
    pub async fn upload_file(
        &self,
        resource_id: &str,
        property: &[String],
        file: Vec<u8>,
    ) -> Result<(), GroupError> {
        let (remote, archive) = match property {
            [mode, host, remote, ..] if mode == WITH_PATH => {
                let host = PathBuf::from(host);
                let archive = tokio::task::spawn_blocking({
                    let host = host.clone();
                    move || pack_host_path(&host)
                })
                .await
                .map_err(|e| {
                    TaskSnafu {
                        stage: Stage::Container,
                        message: e.to_string(),
                    }
                    .build()
                })?
                .context(HostFileSnafu { path: host })?;
                (remote.as_str(), archive)
            }
            [mode, ..] if mode == WITH_PATH => {
                return MissingPropertySnafu {
                    stage: Stage::Container,
                    what: "host and remote paths",
                }
                .fail();
            }
            [_, remote, ..] | [remote] => (remote.as_str(), file),
            [] => {
                return MissingPropertySnafu {
                    stage: Stage::Container,
                    what: "remote path",
                }
                .fail();
            }
        };

        self.runtime()
            .upload_archive(&ContainerId::new(resource_id), remote, archive)
            .await
            .context(TransferSnafu)?;
        tracing::info!(container = resource_id, remote, "file uploaded");
        Ok(())
    }
}

/// Pack a host file or directory into a tar archive named after it.
fn pack_host_path(path: &Path) -> std::io::Result<Vec<u8>> {
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "host path has no file name")
    })?;

    let mut builder = tar::Builder::new(Vec::new());
    if path.is_dir() {
        builder.append_dir_all(name, path)?;
    } else {
        builder.append_path_with_name(path, name)?;
    }
    builder.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ErrorClass;
    use crate::runtime::fake::FakeRuntime;
    use std::io::Read;
    use tempfile::TempDir;

    const DEMO: &str = "services:\n  web:\n    image: nginx\n    depends_on: [db]\n  db:\n    image: postgres\n";

    fn package(name: &str, compose: &str) -> Vec<u8> {
        let metadata = format!("name: {}\n", name);
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in [
            ("metadata.yaml", metadata.as_bytes()),
            ("docker-compose.yml", compose.as_bytes()),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, content).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn facade(temp: &TempDir) -> ResourceGroupFacade<FakeRuntime> {
        ResourceGroupFacade::new(
            Arc::new(FakeRuntime::new()),
            temp.path(),
            Duration::from_secs(1),
        )
    }

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn create_returns_containers_in_name_order() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        let group = facade.create(&package("demo", DEMO), &[]).await.unwrap();

        let db = facade.runtime().container_named("demo-db-1").unwrap();
        let web = facade.runtime().container_named("demo-web-1").unwrap();
        assert_eq!(group.name, "demo");
        assert_eq!(group.container_ids, vec![db.id, web.id]);
        assert!(temp.path().join("packages/demo/docker-compose.yml").is_file());
        assert_eq!(facade.check_status("demo").await.unwrap(), GroupStatus::Active);
    }

    #[tokio::test]
    async fn create_twice_keeps_containers() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        let first = facade.create(&package("demo", DEMO), &[]).await.unwrap();
        let second = facade.create(&package("demo", DEMO), &[]).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn create_with_logging_injects_syslog() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        facade
            .create(&package("demo", DEMO), &options(&["True", "10.0.0.5:514"]))
            .await
            .unwrap();

        for name in ["demo-web-1", "demo-db-1"] {
            let log = facade
                .runtime()
                .container_named(name)
                .unwrap()
                .config
                .log_config
                .unwrap();
            assert_eq!(log.driver, "syslog");
            assert_eq!(log.options["syslog-address"], "10.0.0.5:514");
        }
    }

    #[tokio::test]
    async fn logging_flag_off_leaves_spec_untouched() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        facade
            .create(&package("demo", DEMO), &options(&["False", "10.0.0.5:514"]))
            .await
            .unwrap();

        let spec = std::fs::read_to_string(temp.path().join("packages/demo/docker-compose.yml"))
            .unwrap();
        assert_eq!(spec, DEMO);
    }

    #[tokio::test]
    async fn malformed_package_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        let err = facade.create(b"not an archive", &[]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidArgument);
        assert!(err.to_string().starts_with("extraction: "));
        assert!(!temp.path().join("packages").exists());
    }

    #[tokio::test]
    async fn path_like_names_are_rejected() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        let err = facade
            .create(&package("../escape", DEMO), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::InvalidProjectName { .. }));
        assert!(!temp.path().join("packages").exists());
    }

    #[tokio::test]
    async fn mixed_case_and_dotted_names_are_accepted() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        let single = "services:\n  web:\n    image: nginx\n";

        let group = facade.create(&package("MyApp", single), &[]).await.unwrap();
        assert_eq!(group.name, "MyApp");
        let web = facade.runtime().container_named("myapp-web-1").unwrap();
        assert_eq!(group.container_ids, vec![web.id]);
        assert!(temp.path().join("packages/MyApp/docker-compose.yml").is_file());

        let group = facade.create(&package("shop.v2", single), &[]).await.unwrap();
        assert_eq!(group.name, "shop.v2");
        assert!(facade.runtime().container_named("shopv2-web-1").is_some());
        assert!(temp.path().join("packages/shop.v2").is_dir());
        assert_eq!(facade.check_status("shop.v2").await.unwrap(), GroupStatus::Active);

        facade.remove("MyApp").await.unwrap();
        assert!(!temp.path().join("packages/MyApp").exists());
    }

    #[tokio::test]
    async fn partial_deployment_is_inactive() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade
            .runtime()
            .state
            .lock()
            .uncreatable
            .insert("demo-db-1".to_string());

        let group = facade.create(&package("demo", DEMO), &[]).await.unwrap();
        assert_eq!(group.container_ids.len(), 1);
        assert_eq!(facade.check_status("demo").await.unwrap(), GroupStatus::Inactive);
    }

    #[tokio::test]
    async fn nothing_deployed_is_aborted() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        {
            let mut state = facade.runtime().state.lock();
            state.uncreatable.insert("demo-db-1".to_string());
            state.uncreatable.insert("demo-web-1".to_string());
        }

        let err = facade.create(&package("demo", DEMO), &[]).await.unwrap_err();
        assert!(matches!(err, GroupError::NothingDeployed { .. }));
        assert_eq!(err.class(), ErrorClass::Aborted);
        assert_eq!(facade.check_status("demo").await.unwrap(), GroupStatus::Inactive);
    }

    #[tokio::test]
    async fn unreachable_engine_marks_deployment_failed() {
        let temp = TempDir::new().unwrap();
        let facade = ResourceGroupFacade::new(
            Arc::new(FakeRuntime::unreachable()),
            temp.path(),
            Duration::from_secs(1),
        );

        let err = facade.create(&package("demo", DEMO), &[]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Unavailable);
        assert!(err.to_string().starts_with("deployment: "));
        assert_eq!(facade.check_status("demo").await.unwrap(), GroupStatus::Inactive);
    }

    #[tokio::test]
    async fn remove_leaves_no_residue() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade.create(&package("demo", DEMO), &[]).await.unwrap();

        facade.remove("demo").await.unwrap();

        assert!(!temp.path().join("packages/demo").exists());
        assert!(facade.runtime().state.lock().containers.is_empty());
        let err = facade.check_status("demo").await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[tokio::test]
    async fn remove_unknown_project() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        let err = facade.remove("ghost").await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert_eq!(err.to_string(), "teardown: project not found: ghost");
    }

    #[tokio::test]
    async fn status_is_derived_from_containers_after_restart() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade.create(&package("demo", DEMO), &[]).await.unwrap();
        facade
            .registry
            .forget(&ProjectName::new("demo").unwrap());

        assert_eq!(facade.check_status("demo").await.unwrap(), GroupStatus::Active);

        facade.runtime().kill("demo-web-1");
        assert_eq!(facade.check_status("demo").await.unwrap(), GroupStatus::Inactive);
    }

    #[tokio::test]
    async fn status_while_deploying_is_configuring() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        let demo = ProjectName::new("demo").unwrap();
        facade.registry.set(&demo, DeploymentState::Deploying);

        assert_eq!(
            facade.check_status("demo").await.unwrap(),
            GroupStatus::Configuring
        );
    }

    #[tokio::test]
    async fn container_probes() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        let group = facade
            .create(&package("demo", "services:\n  web:\n    image: nginx\n"), &[])
            .await
            .unwrap();
        let id = group.container_ids[0].as_str();

        assert!(facade.check_if_container_exists(id).await.unwrap());
        assert!(facade.check_if_container_running(id).await.unwrap());

        facade.stop_container(id).await.unwrap();
        facade.stop_container(id).await.unwrap();
        assert!(facade.check_if_container_exists(id).await.unwrap());
        assert!(!facade.check_if_container_running(id).await.unwrap());

        facade.start_container(id).await.unwrap();
        facade.start_container(id).await.unwrap();
        assert!(facade.check_if_container_running(id).await.unwrap());

        assert!(!facade.check_if_container_exists("missing").await.unwrap());
        assert!(!facade.check_if_container_running("missing").await.unwrap());

        let err = facade.start_container("missing").await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[tokio::test]
    async fn execute_command_concatenates_streams() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade
            .create(&package("demo", "services:\n  web:\n    image: nginx\n"), &[])
            .await
            .unwrap();
        facade.runtime().state.lock().exec_stderr = b"warn\n".to_vec();

        let output = facade
            .execute_command("demo-web-1", &options(&["echo", "hello"]))
            .await
            .unwrap();
        assert_eq!(output, "hello\nwarn\n");

        let err = facade.execute_command("demo-web-1", &[]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidArgument);
    }

    #[tokio::test]
    async fn single_command_line_is_split_like_a_shell() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade
            .create(&package("demo", "services:\n  web:\n    image: nginx\n"), &[])
            .await
            .unwrap();

        let output = facade
            .execute_command("demo-web-1", &options(&["sh -c 'echo two words'"]))
            .await
            .unwrap();
        assert_eq!(output, "echo two words\n");

        let recorded: Vec<Vec<String>> = facade
            .runtime()
            .state
            .lock()
            .execs
            .values()
            .map(|(_, cmd)| cmd.clone())
            .collect();
        assert_eq!(
            recorded,
            vec![vec!["sh".to_string(), "-c".to_string(), "echo two words".to_string()]]
        );

        let err = facade
            .execute_command("demo-web-1", &options(&["echo 'unterminated"]))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::InvalidCommand { .. }));
        assert_eq!(err.class(), ErrorClass::InvalidArgument);

        let err = facade
            .execute_command("demo-web-1", &options(&["   "]))
            .await
            .unwrap_err();
        assert!(matches!(err, GroupError::MissingProperty { .. }));
    }

    #[tokio::test]
    async fn upload_inline_bytes() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade
            .create(&package("demo", "services:\n  web:\n    image: nginx\n"), &[])
            .await
            .unwrap();

        facade
            .upload_file("demo-web-1", &options(&["/ignored", "/data"]), b"tar".to_vec())
            .await
            .unwrap();
        facade
            .upload_file("demo-web-1", &options(&["/only"]), b"tar".to_vec())
            .await
            .unwrap();

        let state = facade.runtime().state.lock();
        let dirs: Vec<&str> = state.uploads.iter().map(|(_, dir, _)| dir.as_str()).collect();
        assert_eq!(dirs, vec!["/data", "/only"]);
    }

    #[tokio::test]
    async fn upload_with_host_path_packs_the_file() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        facade
            .create(&package("demo", "services:\n  web:\n    image: nginx\n"), &[])
            .await
            .unwrap();
        let host = temp.path().join("settings.conf");
        std::fs::write(&host, b"key=value").unwrap();

        facade
            .upload_file(
                "demo-web-1",
                &options(&[WITH_PATH, host.to_str().unwrap(), "/etc/app"]),
                Vec::new(),
            )
            .await
            .unwrap();

        let state = facade.runtime().state.lock();
        let (_, dir, archive) = &state.uploads[0];
        assert_eq!(dir, "/etc/app");

        let mut archive = tar::Archive::new(archive.as_slice());
        let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap().to_str(), Some("settings.conf"));
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "key=value");
    }

    #[tokio::test]
    async fn upload_with_missing_host_path() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);

        let err = facade
            .upload_file(
                "demo-web-1",
                &options(&[WITH_PATH, "/definitely/not/here.txt", "/tmp"]),
                Vec::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);

        let err = facade
            .upload_file("demo-web-1", &options(&[WITH_PATH]), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidArgument);
    }

    #[tokio::test]
    async fn download_returns_engine_archive() {
        let temp = TempDir::new().unwrap();
        let facade = facade(&temp);
        let group = facade
            .create(&package("demo", "services:\n  web:\n    image: nginx\n"), &[])
            .await
            .unwrap();
        let id = group.container_ids[0].clone();
        facade
            .runtime()
            .state
            .lock()
            .files
            .insert((id.to_string(), "/var/log/app.log".to_string()), b"archive".to_vec());

        let bytes = facade
            .download_file(id.as_str(), &options(&["/var/log/app.log"]))
            .await
            .unwrap();
        assert_eq!(bytes, b"archive");

        let err = facade
            .download_file(id.as_str(), &options(&["/nope"]))
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotFound);

        let err = facade.download_file(id.as_str(), &[]).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidArgument);
    }
}
