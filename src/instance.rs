//! Wrappers enforcing the draft → committed template → runtime instance
//! protocol over the orchestration-layer traits.

use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use crate::backend::ClusterInstance;
use crate::error::{ProvisionError, Result};

/// An uncommitted instance under construction.
///
/// `commit` consumes the draft, so committing twice is unrepresentable.
pub struct InstanceDraft {
    inner: Box<dyn ClusterInstance>,
}

impl InstanceDraft {
    pub fn new(inner: Box<dyn ClusterInstance>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn set_image(&mut self, image: &str) -> Result<()> {
        self.inner
            .set_image(image)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "set image", e))
    }

    pub fn add_port_tcp(&mut self, port: u16) -> Result<()> {
        self.inner
            .add_port_tcp(port)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), format!("expose port {port}"), e))
    }

    pub fn set_memory(&mut self, request: &str, limit: &str) -> Result<()> {
        self.inner
            .set_memory(request, limit)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "set memory", e))
    }

    pub fn set_cpu(&mut self, limit: &str) -> Result<()> {
        self.inner
            .set_cpu(limit)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "set cpu", e))
    }

    pub fn add_volume_with_owner(&mut self, path: &Path, size: &str, owner: u32) -> Result<()> {
        self.inner
            .add_volume_with_owner(path, size, owner)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "add volume", e))
    }

    pub fn set_command(&mut self, command: &str) -> Result<()> {
        self.inner
            .set_command(command)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "set command", e))
    }

    pub fn set_args(&mut self, args: &[String]) -> Result<()> {
        self.inner
            .set_args(args)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "set args", e))
    }

    pub fn set_user(&mut self, user: &str) -> Result<()> {
        self.inner
            .set_user(user)
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "set user", e))
    }

    pub async fn execute_command(&mut self, command: &str) -> Result<String> {
        self.inner
            .execute_command(command)
            .await
            .map_err(|e| ProvisionError::cluster(self.inner.name(), format!("execute {command:?}"), e))
    }

    /// Freeze the draft into an immutable, cacheable template.
    pub fn commit(mut self) -> Result<InstanceTemplate> {
        self.inner
            .commit()
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "commit", e))?;
        trace!(template = %self.inner.name(), "committed instance template");
        Ok(InstanceTemplate {
            inner: Arc::from(self.inner),
        })
    }
}

impl fmt::Debug for InstanceDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceDraft({})", self.inner.name())
    }
}

/// A committed instance template. Cheap to clone and safe to share; the only
/// operation it supports is instantiation into independent runtime instances.
#[derive(Clone)]
pub struct InstanceTemplate {
    inner: Arc<dyn ClusterInstance>,
}

impl InstanceTemplate {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Clone the committed definition into a new runtime instance owned by
    /// the named participant.
    pub fn instantiate(&self, name: &str) -> Result<RuntimeInstance> {
        let inner = self
            .inner
            .clone_with_name(name)
            .map_err(|e| ProvisionError::cluster(name, "clone instance", e))?;
        trace!(template = %self.inner.name(), instance = %name, "instantiated template");
        Ok(RuntimeInstance { inner })
    }
}

impl fmt::Debug for InstanceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceTemplate({})", self.inner.name())
    }
}

/// A participant's live instance: file injection plus the runtime lifecycle.
pub struct RuntimeInstance {
    inner: Box<dyn ClusterInstance>,
}

impl RuntimeInstance {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub(crate) async fn add_file(
        &mut self,
        artifact: &str,
        local: &Path,
        remote: &Path,
        owner: &str,
    ) -> Result<()> {
        self.inner
            .add_file(local, remote, owner)
            .await
            .map_err(|e| ProvisionError::cluster(self.inner.name(), format!("injecting {artifact}"), e))
    }

    pub(crate) async fn start(&mut self) -> Result<()> {
        self.inner
            .start()
            .await
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "start", e))
    }

    pub(crate) async fn wait_until_running(&mut self) -> Result<()> {
        self.inner
            .wait_until_running()
            .await
            .map_err(|e| ProvisionError::cluster(self.inner.name(), "wait until running", e))
    }

    pub(crate) async fn port_forward_tcp(&mut self, port: u16) -> Result<u16> {
        self.inner
            .port_forward_tcp(port)
            .await
            .map_err(|e| ProvisionError::cluster(self.inner.name(), format!("forward port {port}"), e))
    }

    pub(crate) async fn ip(&self) -> Result<IpAddr> {
        self.inner.ip().await.map_err(|e| ProvisionError::IpUnavailable {
            participant: self.inner.name().to_string(),
            source: e,
        })
    }

    pub(crate) fn clone_with_name(&self, name: &str) -> Result<RuntimeInstance> {
        let inner = self
            .inner
            .clone_with_name(name)
            .map_err(|e| ProvisionError::cluster(name, "clone instance", e))?;
        Ok(RuntimeInstance { inner })
    }
}

impl fmt::Debug for RuntimeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeInstance({})", self.inner.name())
    }
}
