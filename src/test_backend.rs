//! In-memory fake of the cluster orchestration layer.
//!
//! Records every configuration and lifecycle call made against it so tests
//! can assert on the exact definitions committed, files injected, and
//! processes started. Deterministic on purpose: IPs are handed out as
//! `10.0.0.N` in creation order and local forwards bind `30000 + port`.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backend::{ClusterBackend, ClusterInstance};
use crate::error::{BackendResult, ProvisionError, Result};
use crate::instance::{InstanceDraft, InstanceTemplate};
use crate::keys::ParticipantKey;
use crate::node::NodeIdentity;
use crate::simulator::SimulatorOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InjectedFile {
    pub local: PathBuf,
    pub remote: PathBuf,
    pub owner: String,
    pub contents: Vec<u8>,
}

/// Snapshot of everything an instance was asked to do.
#[derive(Debug, Clone, Default)]
pub(crate) struct InstanceRecord {
    pub name: String,
    pub image: Option<String>,
    pub ports: Vec<u16>,
    pub memory: Option<(String, String)>,
    pub cpu: Option<String>,
    pub volumes: Vec<(PathBuf, String, u32)>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub user: Option<String>,
    pub executed: Vec<String>,
    pub committed: bool,
    pub started: bool,
    pub running: bool,
    pub ip: Option<IpAddr>,
    pub files: Vec<InjectedFile>,
    pub forwarded: Vec<u16>,
}

#[derive(Default)]
struct BackendState {
    creates: usize,
    commits: usize,
    clones: usize,
    fail_commits: usize,
    next_ip: u8,
    records: HashMap<String, Arc<Mutex<InstanceRecord>>>,
}

impl BackendState {
    fn register(&mut self, record: InstanceRecord) -> Arc<Mutex<InstanceRecord>> {
        let name = record.name.clone();
        let record = Arc::new(Mutex::new(record));
        self.records.insert(name, Arc::clone(&record));
        record
    }
}

pub(crate) struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(BackendState::default())),
        })
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn clones(&self) -> usize {
        self.state.lock().unwrap().clones
    }

    /// Make the next `commit` call fail once.
    pub fn fail_next_commit(&self) {
        self.state.lock().unwrap().fail_commits += 1;
    }

    /// Snapshot of the named instance. Panics when no instance by that name
    /// was ever created.
    pub fn record(&self, name: &str) -> InstanceRecord {
        let state = self.state.lock().unwrap();
        let record = state
            .records
            .get(name)
            .unwrap_or_else(|| panic!("no instance named {name:?}"));
        let snapshot = record.lock().unwrap().clone();
        snapshot
    }
}

#[async_trait]
impl ClusterBackend for FakeBackend {
    async fn create_instance(&self, name: &str) -> BackendResult<Box<dyn ClusterInstance>> {
        let mut state = self.state.lock().unwrap();
        state.creates += 1;
        let record = state.register(InstanceRecord {
            name: name.to_string(),
            ..InstanceRecord::default()
        });
        Ok(Box::new(FakeInstance {
            name: name.to_string(),
            state: Arc::clone(&self.state),
            record,
        }))
    }
}

struct FakeInstance {
    name: String,
    state: Arc<Mutex<BackendState>>,
    record: Arc<Mutex<InstanceRecord>>,
}

#[async_trait]
impl ClusterInstance for FakeInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_image(&mut self, image: &str) -> BackendResult<()> {
        self.record.lock().unwrap().image = Some(image.to_string());
        Ok(())
    }

    fn add_port_tcp(&mut self, port: u16) -> BackendResult<()> {
        self.record.lock().unwrap().ports.push(port);
        Ok(())
    }

    fn set_memory(&mut self, request: &str, limit: &str) -> BackendResult<()> {
        self.record.lock().unwrap().memory = Some((request.to_string(), limit.to_string()));
        Ok(())
    }

    fn set_cpu(&mut self, limit: &str) -> BackendResult<()> {
        self.record.lock().unwrap().cpu = Some(limit.to_string());
        Ok(())
    }

    fn add_volume_with_owner(&mut self, path: &Path, size: &str, owner: u32) -> BackendResult<()> {
        self.record
            .lock()
            .unwrap()
            .volumes
            .push((path.to_path_buf(), size.to_string(), owner));
        Ok(())
    }

    fn set_command(&mut self, command: &str) -> BackendResult<()> {
        self.record.lock().unwrap().command = Some(command.to_string());
        Ok(())
    }

    fn set_args(&mut self, args: &[String]) -> BackendResult<()> {
        self.record.lock().unwrap().args = args.to_vec();
        Ok(())
    }

    fn set_user(&mut self, user: &str) -> BackendResult<()> {
        self.record.lock().unwrap().user = Some(user.to_string());
        Ok(())
    }

    async fn execute_command(&mut self, command: &str) -> BackendResult<String> {
        self.record.lock().unwrap().executed.push(command.to_string());
        Ok(String::new())
    }

    fn commit(&mut self) -> BackendResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.fail_commits > 0 {
                state.fail_commits -= 1;
                return Err("commit failed".into());
            }
            state.commits += 1;
        }
        self.record.lock().unwrap().committed = true;
        Ok(())
    }

    fn clone_with_name(&self, name: &str) -> BackendResult<Box<dyn ClusterInstance>> {
        let mut record = self.record.lock().unwrap().clone();
        record.name = name.to_string();
        record.started = false;
        record.running = false;
        record.ip = None;
        record.files.clear();
        record.forwarded.clear();

        let mut state = self.state.lock().unwrap();
        state.clones += 1;
        let record = state.register(record);
        Ok(Box::new(FakeInstance {
            name: name.to_string(),
            state: Arc::clone(&self.state),
            record,
        }))
    }

    async fn add_file(&mut self, local: &Path, remote: &Path, owner: &str) -> BackendResult<()> {
        let contents = std::fs::read(local)?;
        self.record.lock().unwrap().files.push(InjectedFile {
            local: local.to_path_buf(),
            remote: remote.to_path_buf(),
            owner: owner.to_string(),
            contents,
        });
        Ok(())
    }

    async fn start(&mut self) -> BackendResult<()> {
        let ip = {
            let mut state = self.state.lock().unwrap();
            state.next_ip += 1;
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, state.next_ip))
        };
        let mut record = self.record.lock().unwrap();
        record.started = true;
        record.ip = Some(ip);
        Ok(())
    }

    async fn wait_until_running(&mut self) -> BackendResult<()> {
        self.record.lock().unwrap().running = true;
        Ok(())
    }

    async fn port_forward_tcp(&mut self, port: u16) -> BackendResult<u16> {
        self.record.lock().unwrap().forwarded.push(port);
        Ok(30000 + port)
    }

    async fn ip(&self) -> BackendResult<IpAddr> {
        self.record
            .lock()
            .unwrap()
            .ip
            .ok_or_else(|| "instance has not started".into())
    }
}

/// Build and commit a minimal template against the fake backend.
pub(crate) async fn committed_template(
    backend: &FakeBackend,
    name: &str,
) -> Result<InstanceTemplate> {
    let instance = backend
        .create_instance(name)
        .await
        .map_err(|e| ProvisionError::cluster(name, "create instance", e))?;
    let mut draft = InstanceDraft::new(instance);
    draft.set_image("img:v")?;
    draft.commit()
}

pub(crate) fn test_node_identity<R: rand::RngCore + rand::CryptoRng>(
    name: &str,
    rng: &mut R,
) -> NodeIdentity {
    NodeIdentity {
        name: name.to_string(),
        version: "v1.0.0".to_string(),
        start_height: 1,
        self_delegation: 1_000_000,
        peers: Vec::new(),
        signer_key: ParticipantKey::generate_ed25519(rng),
        network_key: ParticipantKey::generate_ed25519(rng),
        account_key: ParticipantKey::generate_secp256k1(rng),
    }
}

pub(crate) fn test_simulator_options<R: rand::RngCore + rand::CryptoRng>(
    name: &str,
    rng: &mut R,
) -> SimulatorOptions {
    SimulatorOptions {
        name: name.to_string(),
        version: "v1.0.0".to_string(),
        signer_key: ParticipantKey::generate_ed25519(rng),
        network_key: ParticipantKey::generate_ed25519(rng),
        account_key: ParticipantKey::generate_secp256k1(rng),
        key_mnemonic: "test test test junk".to_string(),
        rpc_endpoints: vec!["http://10.0.0.1:26657".to_string()],
        grpc_endpoints: vec!["10.0.0.1:9090".to_string()],
        poll_interval: std::time::Duration::from_secs(1),
        blob_size_range: vec![100, 2000],
        blobs: 1,
        blob_amounts: 1,
        seed: 42,
        send: 0,
    }
}
