// ABOUTME: Registration of the adapter with an external process manager.
// ABOUTME: Registers once at startup and de-registers through an explicit close().

use crate::config::RegistrationConfig;
use crate::server::proto::adapter_handler_client::AdapterHandlerClient;
use crate::server::proto::{AdapterProto, ResourceIdentifier};
use thiserror::Error;
use tonic::transport::Channel;

/// Adapter type announced to the process manager.
pub const ADAPTER_TYPE: &str = "docker-compose";

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("cannot reach process manager at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("process manager rejected {operation}: {source}")]
    Rejected {
        operation: &'static str,
        #[source]
        source: tonic::Status,
    },
}

/// Live registration with a process manager.
#[derive(Debug)]
pub struct AdapterRegistration {
    client: AdapterHandlerClient<Channel>,
    adapter_id: String,
}

impl AdapterRegistration {
    /// Announce an adapter listening on `port`.
    pub async fn register(
        config: &RegistrationConfig,
        port: u16,
    ) -> Result<Self, RegistrationError> {
        let endpoint = config.epm_endpoint();
        let mut client = AdapterHandlerClient::connect(endpoint.clone())
            .await
            .map_err(|source| RegistrationError::Connect {
                endpoint: endpoint.clone(),
                source,
            })?;

        let ip = config.advertised_address(port);
        let response = client
            .register_adapter(AdapterProto {
                r#type: ADAPTER_TYPE.to_string(),
                ip: ip.clone(),
            })
            .await
            .map_err(|source| RegistrationError::Rejected {
                operation: "registration",
                source,
            })?;

        let adapter_id = response.into_inner().resource_id;
        tracing::info!(%endpoint, advertised = %ip, adapter_id = %adapter_id, "adapter registered");

        Ok(Self { client, adapter_id })
    }

    /// Identifier the process manager assigned.
    pub fn adapter_id(&self) -> &str {
        &self.adapter_id
    }

    /// De-register. Consumes the registration so it runs at most once.
    pub async fn close(mut self) -> Result<(), RegistrationError> {
        self.client
            .delete_adapter(ResourceIdentifier {
                resource_id: self.adapter_id.clone(),
            })
            .await
            .map_err(|source| RegistrationError::Rejected {
                operation: "de-registration",
                source,
            })?;
        tracing::info!(adapter_id = %self.adapter_id, "adapter de-registered");
        Ok(())
    }
}
