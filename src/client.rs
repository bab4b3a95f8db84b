use url::Url;

use crate::error::{ProvisionError, Result};

/// Sub-path the consensus RPC serves its WebSocket endpoint under.
pub const WEBSOCKET_PATH: &str = "/websocket";

/// Handle to a participant's consensus RPC endpoint.
#[derive(Debug, Clone)]
pub struct ConsensusRpcClient {
    endpoint: Url,
}

impl ConsensusRpcClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|source| ProvisionError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self { endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Endpoint with the fixed WebSocket sub-path applied.
    pub fn websocket_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(WEBSOCKET_PATH);
        url
    }
}
