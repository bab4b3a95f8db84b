use thiserror::Error;

/// Error type produced by the cluster orchestration collaborator.
///
/// The orchestration layer is external to this crate; its failures are carried
/// opaquely and wrapped with the participant and operation that hit them.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A node started without peer addresses cannot bootstrap connectivity.
    #[error("node {0} was given no peers to bootstrap from")]
    EmptyPeers(String),

    #[error("blob size range must contain exactly two integers, got {0}")]
    BlobSizeRange(usize),

    #[error("malformed peer address {0:?}, expected id@host:port")]
    MalformedPeer(String),

    #[error("invalid endpoint {endpoint:?}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// Local staging I/O failed while rendering the named artifact.
    #[error("failed to stage {artifact} for {participant}")]
    Staging {
        participant: String,
        artifact: &'static str,
        #[source]
        source: BackendError,
    },

    /// A cluster orchestration operation failed for the named instance.
    #[error("{operation} failed for {participant}")]
    Cluster {
        participant: String,
        operation: String,
        #[source]
        source: BackendError,
    },

    /// The runtime could not report an IP address for the instance.
    #[error("instance {participant} has not reported an IP address")]
    IpUnavailable {
        participant: String,
        #[source]
        source: BackendError,
    },

    /// A proxy address was requested but port forwarding was never
    /// established for this participant.
    #[error("port {port} was never forwarded for {participant}")]
    NotForwarded { participant: String, port: u16 },
}

impl ProvisionError {
    pub(crate) fn staging(
        participant: impl Into<String>,
        artifact: &'static str,
        source: impl Into<BackendError>,
    ) -> Self {
        Self::Staging {
            participant: participant.into(),
            artifact,
            source: source.into(),
        }
    }

    pub(crate) fn cluster(
        participant: impl Into<String>,
        operation: impl Into<String>,
        source: impl Into<BackendError>,
    ) -> Self {
        Self::Cluster {
            participant: participant.into(),
            operation: operation.into(),
            source: source.into(),
        }
    }
}
