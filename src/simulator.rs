use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::config::key_files::stage_key_material;
use crate::config::{
    CONFIG_DIR, DATA_DIR, NODE_KEY_FILE, VALIDATOR_KEY_FILE, VALIDATOR_STATE_FILE,
};
use crate::error::{ProvisionError, Result};
use crate::instance::RuntimeInstance;
use crate::keys::ParticipantKey;
use crate::settings::ClusterSettings;

/// Identity and workload shape of a load simulator participant.
pub struct SimulatorOptions {
    pub name: String,
    pub version: String,
    pub signer_key: ParticipantKey,
    pub network_key: ParticipantKey,
    pub account_key: ParticipantKey,
    /// Mnemonic funding the simulator's submitting account.
    pub key_mnemonic: String,
    pub rpc_endpoints: Vec<String>,
    pub grpc_endpoints: Vec<String>,
    pub poll_interval: Duration,
    /// Inclusive blob size bounds; must contain exactly two integers.
    pub blob_size_range: Vec<u64>,
    pub blobs: u64,
    pub blob_amounts: u64,
    pub seed: u64,
    pub send: u64,
}

impl SimulatorOptions {
    /// Reject a blob-size range that is not exactly `[min, max]`. Runs
    /// before any remote call is made on the simulator's behalf.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.blob_size_range.len() != 2 {
            return Err(ProvisionError::BlobSizeRange(self.blob_size_range.len()));
        }
        Ok(())
    }
}

impl fmt::Debug for SimulatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatorOptions")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("signer_key", &self.signer_key)
            .field("network_key", &self.network_key)
            .field("account_key", &self.account_key)
            // funds an account; never print it
            .field("key_mnemonic", &"<redacted>")
            .field("rpc_endpoints", &self.rpc_endpoints)
            .field("grpc_endpoints", &self.grpc_endpoints)
            .field("poll_interval", &self.poll_interval)
            .field("blob_size_range", &self.blob_size_range)
            .field("blobs", &self.blobs)
            .field("blob_amounts", &self.blob_amounts)
            .field("seed", &self.seed)
            .field("send", &self.send)
            .finish()
    }
}

/// Startup arguments baked into the simulator template.
pub(crate) fn simulator_args(options: &SimulatorOptions) -> Vec<String> {
    vec![
        "--key-mnemonic".to_string(),
        options.key_mnemonic.clone(),
        "--rpc-endpoints".to_string(),
        options.rpc_endpoints.join(","),
        "--grpc-endpoints".to_string(),
        options.grpc_endpoints.join(","),
        "--poll-time".to_string(),
        render_interval(options.poll_interval),
        "--blob-sizes".to_string(),
        format!("{}-{}", options.blob_size_range[0], options.blob_size_range[1]),
        "--blob".to_string(),
        options.blobs.to_string(),
        "--blob-amounts".to_string(),
        options.blob_amounts.to_string(),
        "--seed".to_string(),
        options.seed.to_string(),
        "--send".to_string(),
        options.send.to_string(),
    ]
}

/// Whole seconds render as `Ns`; anything with a sub-second component
/// renders in milliseconds so no precision is dropped.
fn render_interval(interval: Duration) -> String {
    if interval.subsec_nanos() == 0 {
        format!("{}s", interval.as_secs())
    } else {
        format!("{}ms", interval.as_millis())
    }
}

/// A load-generating simulator participant.
///
/// Not a protocol participant: it carries key material only, no genesis,
/// application config, or address book.
#[derive(Debug)]
pub struct Simulator {
    name: String,
    version: String,
    signer_key: ParticipantKey,
    network_key: ParticipantKey,
    account_key: ParticipantKey,
    instance: RuntimeInstance,
    settings: ClusterSettings,
    staging_root: PathBuf,
}

impl Simulator {
    pub(crate) fn new(
        options: SimulatorOptions,
        instance: RuntimeInstance,
        settings: ClusterSettings,
        staging_root: PathBuf,
    ) -> Self {
        Self {
            name: options.name,
            version: options.version,
            signer_key: options.signer_key,
            network_key: options.network_key,
            account_key: options.account_key,
            instance,
            settings,
            staging_root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn account_key(&self) -> &ParticipantKey {
        &self.account_key
    }

    fn staging_dir(&self) -> PathBuf {
        self.staging_root.join(&self.name)
    }

    /// Stage and inject the simulator's key material: network identity key,
    /// consensus signing key, and initial signing state.
    pub async fn init(&mut self) -> Result<()> {
        info!(name = %self.name, "staging simulator key material");
        let staging = self.staging_dir();
        let config_dir = staging.join(CONFIG_DIR);
        let data_dir = staging.join(DATA_DIR);
        for dir in [&config_dir, &data_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| ProvisionError::staging(&self.name, "staging directories", e))?;
        }

        let keys = stage_key_material(&staging, &self.network_key, &self.signer_key)
            .map_err(|e| ProvisionError::staging(&self.name, "key material", e))?;

        let owner = self.settings.file_owner();
        let remote_config = self.settings.remote_root.join(CONFIG_DIR);
        let remote_data = self.settings.remote_root.join(DATA_DIR);
        let injections = [
            (NODE_KEY_FILE, &keys.node_key, remote_config.join(NODE_KEY_FILE)),
            (VALIDATOR_KEY_FILE, &keys.validator_key, remote_config.join(VALIDATOR_KEY_FILE)),
            (VALIDATOR_STATE_FILE, &keys.validator_state, remote_data.join(VALIDATOR_STATE_FILE)),
        ];
        for (artifact, local, remote) in injections {
            self.instance.add_file(artifact, local, &remote, &owner).await?;
        }

        info!(name = %self.name, "simulator key material injected");
        Ok(())
    }

    /// Start the instance and block until the runtime reports it running.
    pub async fn start(&mut self) -> Result<()> {
        info!(name = %self.name, "starting simulator instance");
        self.instance.start().await?;
        self.instance.wait_until_running().await?;
        info!(name = %self.name, "simulator running");
        Ok(())
    }
}
