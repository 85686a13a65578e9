// ABOUTME: gRPC transport for the resource group facade.
// ABOUTME: Serves OperationHandler on a bounded worker pool until shutdown is signalled.

mod service;

pub use service::OperationService;

/// Generated protobuf messages and service stubs.
pub mod proto {
    tonic::include_proto!("adapter");
}

use crate::group::ResourceGroupFacade;
use crate::runtime::FullRuntime;
use proto::operation_handler_server::OperationHandlerServer;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

/// Largest request or response accepted, packages and downloads included.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Serve `facade` on `addr` until `shutdown` resolves.
///
/// At most `workers` requests run at once; the rest wait for a permit.
pub async fn serve<R, F>(
    addr: SocketAddr,
    facade: Arc<ResourceGroupFacade<R>>,
    workers: usize,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    R: FullRuntime + 'static,
    F: Future<Output = ()>,
{
    let service = OperationHandlerServer::new(OperationService::new(facade, workers))
        .max_decoding_message_size(MAX_MESSAGE_BYTES)
        .max_encoding_message_size(MAX_MESSAGE_BYTES);

    tracing::info!(%addr, workers, "serving compose adapter");
    tonic::transport::Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, shutdown)
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
}
