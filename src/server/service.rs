// ABOUTME: OperationHandler implementation that forwards requests to the facade.
// ABOUTME: Each request runs in its own task, holding a worker permit until it finishes.

use super::proto::operation_handler_server::OperationHandler;
use super::proto::{self, status::State};
use crate::group::{ErrorClass, GroupError, GroupStatus, ResourceGroupFacade};
use crate::runtime::FullRuntime;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tonic::{Code, Request, Response, Status};

pub struct OperationService<R> {
    facade: Arc<ResourceGroupFacade<R>>,
    permits: Arc<Semaphore>,
}

impl<R: FullRuntime + 'static> OperationService<R> {
    pub fn new(facade: Arc<ResourceGroupFacade<R>>, workers: usize) -> Self {
        Self {
            facade,
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Run `work` on a worker.
    ///
    /// The work is spawned, so it completes even if the caller goes away.
    async fn run<T, F, Fut>(&self, operation: &'static str, work: F) -> Result<T, Status>
    where
        T: Send + 'static,
        F: FnOnce(Arc<ResourceGroupFacade<R>>) -> Fut,
        Fut: Future<Output = Result<T, GroupError>> + Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Status::unavailable("adapter is shutting down"))?;

        let work = work(Arc::clone(&self.facade));
        let task = tokio::spawn(async move {
            let _permit = permit;
            work.await
        });

        match task.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, "request failed");
                Err(status_of(&e))
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "request task failed");
                Err(Status::internal(format!("{}: request task failed", operation)))
            }
        }
    }
}

fn status_of(error: &GroupError) -> Status {
    let code = match error.class() {
        ErrorClass::InvalidArgument => Code::InvalidArgument,
        ErrorClass::Unavailable => Code::Unavailable,
        ErrorClass::NotFound => Code::NotFound,
        ErrorClass::FailedPrecondition => Code::FailedPrecondition,
        ErrorClass::Aborted => Code::Aborted,
        ErrorClass::Internal => Code::Internal,
    };
    Status::new(code, error.to_string())
}

fn flag(value: bool) -> proto::StringResponse {
    proto::StringResponse {
        response: if value { "True" } else { "False" }.to_string(),
    }
}

impl From<GroupStatus> for State {
    fn from(status: GroupStatus) -> Self {
        match status {
            GroupStatus::Configuring => State::Configuring,
            GroupStatus::Active => State::Active,
            GroupStatus::Inactive => State::Inactive,
        }
    }
}

#[tonic::async_trait]
impl<R: FullRuntime + 'static> OperationHandler for OperationService<R> {
    async fn create(
        &self,
        request: Request<proto::FileMessage>,
    ) -> Result<Response<proto::ResourceGroup>, Status> {
        let proto::FileMessage { file, options } = request.into_inner();
        tracing::debug!(bytes = file.len(), ?options, "Create");

        let group = self
            .run("create", move |facade| async move {
                facade.create(&file, &options).await
            })
            .await?;

        Ok(Response::new(proto::ResourceGroup {
            name: group.name,
            container_ids: group
                .container_ids
                .into_iter()
                .map(|id| id.to_string())
                .collect(),
        }))
    }

    async fn remove(
        &self,
        request: Request<proto::InstanceIdentifier>,
    ) -> Result<Response<proto::Empty>, Status> {
        let id = request.into_inner().resource_id;
        self.run("remove", move |facade| async move { facade.remove(&id).await })
            .await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn check_status(
        &self,
        request: Request<proto::InstanceIdentifier>,
    ) -> Result<Response<proto::Status>, Status> {
        let id = request.into_inner().resource_id;
        let status = self
            .run("check_status", move |facade| async move {
                facade.check_status(&id).await
            })
            .await?;
        Ok(Response::new(proto::Status {
            status: State::from(status) as i32,
        }))
    }

    async fn check_if_container_exists(
        &self,
        request: Request<proto::InstanceIdentifier>,
    ) -> Result<Response<proto::StringResponse>, Status> {
        let id = request.into_inner().resource_id;
        let exists = self
            .run("check_if_container_exists", move |facade| async move {
                facade.check_if_container_exists(&id).await
            })
            .await?;
        Ok(Response::new(flag(exists)))
    }

    async fn check_if_container_running(
        &self,
        request: Request<proto::InstanceIdentifier>,
    ) -> Result<Response<proto::StringResponse>, Status> {
        let id = request.into_inner().resource_id;
        let running = self
            .run("check_if_container_running", move |facade| async move {
                facade.check_if_container_running(&id).await
            })
            .await?;
        Ok(Response::new(flag(running)))
    }

    async fn start_container(
        &self,
        request: Request<proto::InstanceIdentifier>,
    ) -> Result<Response<proto::Empty>, Status> {
        let id = request.into_inner().resource_id;
        self.run("start_container", move |facade| async move {
            facade.start_container(&id).await
        })
        .await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn stop_container(
        &self,
        request: Request<proto::InstanceIdentifier>,
    ) -> Result<Response<proto::Empty>, Status> {
        let id = request.into_inner().resource_id;
        self.run("stop_container", move |facade| async move {
            facade.stop_container(&id).await
        })
        .await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn execute_command(
        &self,
        request: Request<proto::RuntimeMessage>,
    ) -> Result<Response<proto::StringResponse>, Status> {
        let proto::RuntimeMessage {
            resource_id,
            property,
            ..
        } = request.into_inner();
        let response = self
            .run("execute_command", move |facade| async move {
                facade.execute_command(&resource_id, &property).await
            })
            .await?;
        Ok(Response::new(proto::StringResponse { response }))
    }

    async fn download_file(
        &self,
        request: Request<proto::RuntimeMessage>,
    ) -> Result<Response<proto::FileMessage>, Status> {
        let proto::RuntimeMessage {
            resource_id,
            property,
            ..
        } = request.into_inner();
        let file = self
            .run("download_file", move |facade| async move {
                facade.download_file(&resource_id, &property).await
            })
            .await?;
        Ok(Response::new(proto::FileMessage {
            file,
            options: Vec::new(),
        }))
    }

    async fn upload_file(
        &self,
        request: Request<proto::RuntimeMessage>,
    ) -> Result<Response<proto::Empty>, Status> {
        let proto::RuntimeMessage {
            resource_id,
            property,
            file,
        } = request.into_inner();
        self.run("upload_file", move |facade| async move {
            facade.upload_file(&resource_id, &property, file).await
        })
        .await?;
        Ok(Response::new(proto::Empty {}))
    }
}
