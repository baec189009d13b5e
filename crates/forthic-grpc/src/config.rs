//! Client configuration.

use tonic::transport::Endpoint;

use crate::error::ClientError;

/// Default gRPC message size limit (16 MiB) for both directions.
pub const DEFAULT_GRPC_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Default address used by the CLI.
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:50051";

/// Transport credentials for the client channel.
///
/// Only plaintext channels are supported today; the enum keeps the choice
/// explicit so a secure variant can be added without changing call sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelCredentials {
    #[default]
    Insecure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` or a full `http://host:port` URI.
    pub address: String,
    pub credentials: ChannelCredentials,
    pub max_message_bytes: usize,
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Validate the address and build the channel endpoint.
    pub fn endpoint(&self) -> Result<Endpoint, ClientError> {
        let address = self.address.trim();
        if address.is_empty() {
            return Err(ClientError::invalid_argument("address must not be empty"));
        }
        let uri = match self.credentials {
            ChannelCredentials::Insecure if address.contains("://") => address.to_string(),
            ChannelCredentials::Insecure => format!("http://{address}"),
        };
        Endpoint::from_shared(uri).map_err(|err| {
            ClientError::invalid_argument(format!("invalid address {address}: {err}"))
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            credentials: ChannelCredentials::Insecure,
            max_message_bytes: DEFAULT_GRPC_MAX_MESSAGE_BYTES,
        }
    }
}
