//! Contract required from the external cluster orchestration layer.
//!
//! The crate never builds images, mounts volumes, or starts processes itself;
//! it drives an implementation of these traits. Everything here is modeled as
//! an object-safe seam so test runs can swap the real orchestrator for an
//! in-memory fake.

use std::net::IpAddr;
use std::path::Path;

use async_trait::async_trait;

use crate::error::BackendResult;

/// Entry point to the orchestration layer: creates named, uncommitted
/// instances.
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    async fn create_instance(&self, name: &str) -> BackendResult<Box<dyn ClusterInstance>>;
}

/// One managed container instance.
///
/// Before `commit`, the mutating configuration operations apply; after
/// `commit` the definition is frozen and only cloning, file injection, and
/// the runtime operations are meaningful. That protocol is enforced by the
/// wrapper types in [`crate::instance`], not by implementations of this
/// trait.
#[async_trait]
pub trait ClusterInstance: Send + Sync {
    fn name(&self) -> &str;

    fn set_image(&mut self, image: &str) -> BackendResult<()>;

    fn add_port_tcp(&mut self, port: u16) -> BackendResult<()>;

    fn set_memory(&mut self, request: &str, limit: &str) -> BackendResult<()>;

    fn set_cpu(&mut self, limit: &str) -> BackendResult<()>;

    fn add_volume_with_owner(&mut self, path: &Path, size: &str, owner: u32) -> BackendResult<()>;

    fn set_command(&mut self, command: &str) -> BackendResult<()>;

    fn set_args(&mut self, args: &[String]) -> BackendResult<()>;

    fn set_user(&mut self, user: &str) -> BackendResult<()>;

    /// Run a one-shot command in the instance build context.
    async fn execute_command(&mut self, command: &str) -> BackendResult<String>;

    /// Freeze the instance definition.
    fn commit(&mut self) -> BackendResult<()>;

    /// Clone a committed instance into a new, independent runtime instance
    /// sharing this instance's static definition.
    fn clone_with_name(&self, name: &str) -> BackendResult<Box<dyn ClusterInstance>>;

    /// Copy a local file into the instance's filesystem with the given
    /// `user:group` owner.
    async fn add_file(&mut self, local: &Path, remote: &Path, owner: &str) -> BackendResult<()>;

    async fn start(&mut self) -> BackendResult<()>;

    /// Block until the runtime reports the instance running.
    async fn wait_until_running(&mut self) -> BackendResult<()>;

    /// Establish a local TCP forward to `port`, returning the locally bound
    /// port.
    async fn port_forward_tcp(&mut self, port: u16) -> BackendResult<u16>;

    /// IP address assigned to the instance by the runtime.
    async fn ip(&self) -> BackendResult<IpAddr>;
}
