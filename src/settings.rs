use std::path::PathBuf;

/// Static settings shared by every participant in a test run.
///
/// These values feed the configuration fingerprint: two participants built
/// from identical settings (and the same version) are guaranteed to need
/// byte-identical base instance templates, which is what makes template
/// caching sound.
#[derive(Debug, Clone)]
pub struct ClusterSettings {
    /// Image source for consensus node instances, without the version tag.
    pub node_image: String,
    /// Image source for load simulator instances, without the version tag.
    pub simulator_image: String,
    /// Entry point overriding the simulator image's default command.
    pub simulator_command: String,
    pub rpc_port: u16,
    pub p2p_port: u16,
    pub grpc_port: u16,
    /// Root of the application home directory inside the instance.
    pub remote_root: PathBuf,
    pub volume_size: String,
    pub memory_request: String,
    pub memory_limit: String,
    pub cpu: String,
    /// Numeric uid the in-container process runs as. Every injected file is
    /// owned by this user so the process can read it.
    pub run_as_user: u32,
    /// When enabled, `start` establishes local TCP forwards for the RPC and
    /// gRPC ports and the proxy address resolvers become available.
    pub port_forwarding: bool,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            node_image: "ghcr.io/testnet-cluster/consensus-node".to_string(),
            simulator_image: "ghcr.io/testnet-cluster/load-sim".to_string(),
            simulator_command: "/bin/load-sim".to_string(),
            rpc_port: 26657,
            p2p_port: 26656,
            grpc_port: 9090,
            remote_root: PathBuf::from("/home/validator/.consensus"),
            volume_size: "100Gi".to_string(),
            memory_request: "200Mi".to_string(),
            memory_limit: "200Mi".to_string(),
            cpu: "300m".to_string(),
            run_as_user: 10001,
            port_forwarding: false,
        }
    }
}

impl ClusterSettings {
    /// `user:group` owner string applied to every injected file.
    pub fn file_owner(&self) -> String {
        format!("{}:{}", self.run_as_user, self.run_as_user)
    }
}
