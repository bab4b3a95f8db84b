use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::info;

use crate::backend::ClusterBackend;
use crate::cache::TemplateCache;
use crate::config::{CONFIG_DIR, DATA_DIR};
use crate::error::{ProvisionError, Result};
use crate::fingerprint::Fingerprint;
use crate::instance::{InstanceDraft, InstanceTemplate};
use crate::node::{Node, NodeIdentity};
use crate::settings::ClusterSettings;
use crate::simulator::{simulator_args, Simulator, SimulatorOptions};

#[derive(Debug)]
enum StagingDirectory {
    Persistent(PathBuf),
    Temporary(TempDir),
}

impl StagingDirectory {
    fn new_temporary() -> Self {
        StagingDirectory::Temporary(TempDir::new().unwrap())
    }
}

impl AsRef<Path> for StagingDirectory {
    fn as_ref(&self) -> &Path {
        match self {
            StagingDirectory::Persistent(dir) => dir.as_ref(),
            StagingDirectory::Temporary(dir) => dir.as_ref(),
        }
    }
}

/// One test run's provisioning context.
///
/// Owns the template cache (scoped to this run, not the process), the shared
/// cluster settings, and the staging root that participants render their
/// configuration sets under. Participants for different names are safe to
/// provision concurrently; only template construction is serialized, per
/// fingerprint, by the cache.
pub struct Testnet {
    backend: Arc<dyn ClusterBackend>,
    settings: ClusterSettings,
    cache: TemplateCache,
    staging: StagingDirectory,
}

impl Testnet {
    /// Return a new Builder.
    pub fn builder() -> TestnetBuilder {
        TestnetBuilder::new()
    }

    pub fn settings(&self) -> &ClusterSettings {
        &self.settings
    }

    /// Root of the directory where participants stage configuration files.
    pub fn staging_dir(&self) -> &Path {
        self.staging.as_ref()
    }

    /// Provision a consensus node: resolve its instance template through the
    /// cache (building and committing it on first use of this fingerprint),
    /// then clone the template into the node's own runtime instance.
    pub async fn create_node(&self, identity: NodeIdentity) -> Result<Node> {
        let fingerprint = Fingerprint::node(&self.settings, &identity.version);
        let template = self
            .cache
            .resolve(fingerprint, || {
                self.build_node_template(fingerprint, &identity.version)
            })
            .await?;
        let instance = template.instantiate(&identity.name)?;
        info!(name = %identity.name, template = %template.name(), "provisioned node instance");
        Ok(Node::new(
            identity,
            instance,
            self.settings.clone(),
            self.staging.as_ref().to_path_buf(),
        ))
    }

    /// Provision a load simulator. The workload arguments are validated
    /// before any remote call and then baked into the cached template, so
    /// simulators sharing a fingerprint share their startup arguments.
    pub async fn create_simulator(&self, options: SimulatorOptions) -> Result<Simulator> {
        options.validate()?;
        let fingerprint = Fingerprint::simulator(&self.settings, &options.version);
        let template = self
            .cache
            .resolve(fingerprint, || {
                self.build_simulator_template(fingerprint, &options)
            })
            .await?;
        let instance = template.instantiate(&options.name)?;
        info!(name = %options.name, template = %template.name(), "provisioned simulator instance");
        Ok(Simulator::new(
            options,
            instance,
            self.settings.clone(),
            self.staging.as_ref().to_path_buf(),
        ))
    }

    async fn build_node_template(
        &self,
        fingerprint: Fingerprint,
        version: &str,
    ) -> Result<InstanceTemplate> {
        let name = format!("node-template-{}", fingerprint.short());
        info!(template = %name, version, "building node instance template");

        let root = &self.settings.remote_root;
        let instance = self
            .backend
            .create_instance(&name)
            .await
            .map_err(|e| ProvisionError::cluster(&name, "create instance", e))?;
        let mut draft = InstanceDraft::new(instance);
        draft.set_image(&format!("{}:{}", self.settings.node_image, version))?;
        for port in [
            self.settings.rpc_port,
            self.settings.p2p_port,
            self.settings.grpc_port,
        ] {
            draft.add_port_tcp(port)?;
        }
        draft.set_memory(&self.settings.memory_request, &self.settings.memory_limit)?;
        draft.set_cpu(&self.settings.cpu)?;
        draft.add_volume_with_owner(root, &self.settings.volume_size, self.settings.run_as_user)?;
        draft.set_args(&[
            "start".to_string(),
            format!("--home={}", root.display()),
            format!("--rpc.laddr=tcp://0.0.0.0:{}", self.settings.rpc_port),
        ])?;
        draft
            .execute_command(&format!("mkdir -p {}/{}", root.display(), CONFIG_DIR))
            .await?;
        draft
            .execute_command(&format!("mkdir -p {}/{}", root.display(), DATA_DIR))
            .await?;
        draft.set_user(&self.settings.run_as_user.to_string())?;
        draft.commit()
    }

    async fn build_simulator_template(
        &self,
        fingerprint: Fingerprint,
        options: &SimulatorOptions,
    ) -> Result<InstanceTemplate> {
        let name = format!("sim-template-{}", fingerprint.short());
        info!(template = %name, version = %options.version, "building simulator instance template");

        let root = &self.settings.remote_root;
        let instance = self
            .backend
            .create_instance(&name)
            .await
            .map_err(|e| ProvisionError::cluster(&name, "create instance", e))?;
        let mut draft = InstanceDraft::new(instance);
        draft.set_image(&format!("{}:{}", self.settings.simulator_image, options.version))?;
        draft.set_memory(&self.settings.memory_request, &self.settings.memory_limit)?;
        draft.set_cpu(&self.settings.cpu)?;
        draft.add_volume_with_owner(root, &self.settings.volume_size, self.settings.run_as_user)?;
        draft.set_command(&self.settings.simulator_command)?;
        draft.set_args(&simulator_args(options))?;
        draft
            .execute_command(&format!("mkdir -p {}/{}", root.display(), CONFIG_DIR))
            .await?;
        draft
            .execute_command(&format!("mkdir -p {}/{}", root.display(), DATA_DIR))
            .await?;
        draft.commit()
    }
}

pub struct TestnetBuilder {
    settings: ClusterSettings,
    dir: Option<PathBuf>,
}

impl TestnetBuilder {
    pub fn new() -> Self {
        Self {
            settings: ClusterSettings::default(),
            dir: None,
        }
    }

    pub fn with_settings(mut self, settings: ClusterSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the directory participants stage configuration under.
    ///
    /// If a directory is provided, it will not be cleaned up when the
    /// Testnet is dropped. Defaults to a temporary directory that will be.
    pub fn with_staging_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_port_forwarding(mut self, enabled: bool) -> Self {
        self.settings.port_forwarding = enabled;
        self
    }

    pub fn build(self, backend: Arc<dyn ClusterBackend>) -> Testnet {
        let staging = match self.dir {
            Some(dir) => StagingDirectory::Persistent(dir),
            None => StagingDirectory::new_temporary(),
        };
        Testnet {
            backend,
            settings: self.settings,
            cache: TemplateCache::new(),
            staging,
        }
    }
}

impl Default for TestnetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
