use std::fs;
use std::path::PathBuf;

use fastcrypto::encoding::{Encoding, Hex};
use tracing::info;

use crate::client::ConsensusRpcClient;
use crate::config::addrbook::AddressBook;
use crate::config::app_config::AppConfigFile;
use crate::config::genesis::Genesis;
use crate::config::key_files::stage_key_material;
use crate::config::node_config::NodeConfigFile;
use crate::config::{
    save_json, save_toml, ADDRBOOK_FILE, APP_CONFIG_FILE, CONFIG_DIR, DATA_DIR, GENESIS_FILE,
    NODE_CONFIG_FILE, NODE_KEY_FILE, VALIDATOR_KEY_FILE, VALIDATOR_STATE_FILE,
};
use crate::error::{ProvisionError, Result};
use crate::instance::RuntimeInstance;
use crate::keys::ParticipantKey;
use crate::settings::ClusterSettings;

/// Immutable identity of a consensus node participant.
#[derive(Debug)]
pub struct NodeIdentity {
    /// Unique within a test run.
    pub name: String,
    /// Image tag of the node binary.
    pub version: String,
    pub start_height: i64,
    /// Zero means the node joins as a non-validator.
    pub self_delegation: u64,
    /// Peers baked into the node configuration as persistent peers.
    pub peers: Vec<String>,
    pub signer_key: ParticipantKey,
    pub network_key: ParticipantKey,
    pub account_key: ParticipantKey,
}

/// A consensus node participant.
///
/// Lifecycle: created (identity and instance assigned) → configured via
/// [`Node::init`] → started via [`Node::start`]. `init` must complete before
/// `start`: the signing keys and genesis must exist on the instance's
/// filesystem before the node process comes up.
#[derive(Debug)]
pub struct Node {
    name: String,
    version: String,
    start_height: i64,
    self_delegation: u64,
    initial_peers: Vec<String>,
    signer_key: ParticipantKey,
    network_key: ParticipantKey,
    account_key: ParticipantKey,
    instance: RuntimeInstance,
    settings: ClusterSettings,
    staging_root: PathBuf,
    rpc_proxy_port: Option<u16>,
    grpc_proxy_port: Option<u16>,
}

impl Node {
    pub(crate) fn new(
        identity: NodeIdentity,
        instance: RuntimeInstance,
        settings: ClusterSettings,
        staging_root: PathBuf,
    ) -> Self {
        Self {
            name: identity.name,
            version: identity.version,
            start_height: identity.start_height,
            self_delegation: identity.self_delegation,
            initial_peers: identity.peers,
            signer_key: identity.signer_key,
            network_key: identity.network_key,
            account_key: identity.account_key,
            instance,
            settings,
            staging_root,
            rpc_proxy_port: None,
            grpc_proxy_port: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn start_height(&self) -> i64 {
        self.start_height
    }

    pub fn self_delegation(&self) -> u64 {
        self.self_delegation
    }

    pub fn initial_peers(&self) -> &[String] {
        &self.initial_peers
    }

    pub fn signer_key(&self) -> &ParticipantKey {
        &self.signer_key
    }

    pub fn network_key(&self) -> &ParticipantKey {
        &self.network_key
    }

    pub fn account_key(&self) -> &ParticipantKey {
        &self.account_key
    }

    /// A node with a non-zero self-delegation joins the validator set.
    pub fn is_validator(&self) -> bool {
        self.self_delegation != 0
    }

    fn staging_dir(&self) -> PathBuf {
        self.staging_root.join(&self.name)
    }

    /// Materialize the node's configuration set locally and inject it into
    /// the instance filesystem.
    ///
    /// Renders the node configuration, persists the supplied genesis
    /// verbatim, renders the application configuration, writes the network
    /// identity key, consensus signing key and initial signing state, and an
    /// address book built from `peers`; then copies all seven files to their
    /// canonical remote paths, owned by the instance user.
    pub async fn init(&mut self, genesis: &Genesis, peers: &[String]) -> Result<()> {
        if peers.is_empty() {
            return Err(ProvisionError::EmptyPeers(self.name.clone()));
        }

        info!(name = %self.name, "staging node configuration");
        let staging = self.staging_dir();
        let config_dir = staging.join(CONFIG_DIR);
        let data_dir = staging.join(DATA_DIR);
        for dir in [&config_dir, &data_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| ProvisionError::staging(&self.name, "staging directories", e))?;
        }

        let config_path = config_dir.join(NODE_CONFIG_FILE);
        let node_config = NodeConfigFile::render(&self.name, &self.initial_peers, &self.settings);
        save_toml(&node_config, &config_path)
            .map_err(|e| ProvisionError::staging(&self.name, NODE_CONFIG_FILE, e))?;

        let genesis_path = config_dir.join(GENESIS_FILE);
        genesis
            .save(&genesis_path)
            .map_err(|e| ProvisionError::staging(&self.name, GENESIS_FILE, e))?;

        let app_path = config_dir.join(APP_CONFIG_FILE);
        let app_config = AppConfigFile::render(&self.settings);
        save_toml(&app_config, &app_path)
            .map_err(|e| ProvisionError::staging(&self.name, APP_CONFIG_FILE, e))?;

        let keys = stage_key_material(&staging, &self.network_key, &self.signer_key)
            .map_err(|e| ProvisionError::staging(&self.name, "key material", e))?;

        let addrbook_path = config_dir.join(ADDRBOOK_FILE);
        let addrbook = AddressBook::from_peers(peers)?;
        save_json(&addrbook, &addrbook_path)
            .map_err(|e| ProvisionError::staging(&self.name, ADDRBOOK_FILE, e))?;

        let owner = self.settings.file_owner();
        let remote_config = self.settings.remote_root.join(CONFIG_DIR);
        let remote_data = self.settings.remote_root.join(DATA_DIR);
        let injections = [
            (NODE_CONFIG_FILE, &config_path, remote_config.join(NODE_CONFIG_FILE)),
            (GENESIS_FILE, &genesis_path, remote_config.join(GENESIS_FILE)),
            (APP_CONFIG_FILE, &app_path, remote_config.join(APP_CONFIG_FILE)),
            (NODE_KEY_FILE, &keys.node_key, remote_config.join(NODE_KEY_FILE)),
            (VALIDATOR_KEY_FILE, &keys.validator_key, remote_config.join(VALIDATOR_KEY_FILE)),
            (VALIDATOR_STATE_FILE, &keys.validator_state, remote_data.join(VALIDATOR_STATE_FILE)),
            (ADDRBOOK_FILE, &addrbook_path, remote_config.join(ADDRBOOK_FILE)),
        ];
        for (artifact, local, remote) in injections {
            self.instance.add_file(artifact, local, &remote, &owner).await?;
        }

        info!(name = %self.name, "node configuration injected");
        Ok(())
    }

    /// Start the instance and block until the runtime reports it running.
    ///
    /// When port forwarding is enabled, local forwards for the RPC and gRPC
    /// ports are established here and the proxy address resolvers become
    /// available. No timeout is imposed; callers wanting a bound wrap this
    /// call with their own deadline.
    pub async fn start(&mut self) -> Result<()> {
        info!(name = %self.name, "starting node instance");
        self.instance.start().await?;
        self.instance.wait_until_running().await?;

        if self.settings.port_forwarding {
            let rpc = self.instance.port_forward_tcp(self.settings.rpc_port).await?;
            let grpc = self.instance.port_forward_tcp(self.settings.grpc_port).await?;
            self.rpc_proxy_port = Some(rpc);
            self.grpc_proxy_port = Some(grpc);
        }

        info!(name = %self.name, "node running");
        Ok(())
    }

    /// P2P endpoint address. With `with_id`, the hex form of the network
    /// key's public address prefixes the endpoint, e.g.
    /// `3314051954fc072a…@10.0.0.5:26656`.
    pub async fn address_p2p(&self, with_id: bool) -> Result<String> {
        let ip = self.instance.ip().await?;
        let addr = format!("{}:{}", ip, self.settings.p2p_port);
        if with_id {
            Ok(format!("{}@{}", Hex::encode(self.network_key.address()), addr))
        } else {
            Ok(addr)
        }
    }

    /// RPC endpoint via the local forward established at start.
    pub fn address_rpc(&self) -> Result<String> {
        match self.rpc_proxy_port {
            Some(port) => Ok(format!("http://127.0.0.1:{port}")),
            None => Err(ProvisionError::NotForwarded {
                participant: self.name.clone(),
                port: self.settings.rpc_port,
            }),
        }
    }

    /// gRPC endpoint via the local forward established at start.
    pub fn address_grpc(&self) -> Result<String> {
        match self.grpc_proxy_port {
            Some(port) => Ok(format!("127.0.0.1:{port}")),
            None => Err(ProvisionError::NotForwarded {
                participant: self.name.clone(),
                port: self.settings.grpc_port,
            }),
        }
    }

    /// RPC endpoint reachable on the instance's own IP.
    pub async fn external_address_rpc(&self) -> Result<String> {
        let ip = self.instance.ip().await?;
        Ok(format!("http://{}:{}", ip, self.settings.rpc_port))
    }

    /// gRPC endpoint reachable on the instance's own IP.
    pub async fn external_address_grpc(&self) -> Result<String> {
        let ip = self.instance.ip().await?;
        Ok(format!("{}:{}", ip, self.settings.grpc_port))
    }

    /// Consensus RPC client against the forwarded RPC endpoint.
    pub fn rpc_client(&self) -> Result<ConsensusRpcClient> {
        ConsensusRpcClient::new(&self.address_rpc()?)
    }

    /// Clone this node under a new name with newly supplied keys.
    ///
    /// Version, start height, initial peers, and self-delegation carry over;
    /// the clone gets an independent runtime instance and is unstarted, so
    /// proxy ports do not carry over.
    pub fn clone_with(
        &self,
        name: &str,
        signer_key: ParticipantKey,
        network_key: ParticipantKey,
        account_key: ParticipantKey,
    ) -> Result<Node> {
        let instance = self.instance.clone_with_name(name)?;
        Ok(Node {
            name: name.to_string(),
            version: self.version.clone(),
            start_height: self.start_height,
            self_delegation: self.self_delegation,
            initial_peers: self.initial_peers.clone(),
            signer_key,
            network_key,
            account_key,
            instance,
            settings: self.settings.clone(),
            staging_root: self.staging_root.clone(),
            rpc_proxy_port: None,
            grpc_proxy_port: None,
        })
    }
}
