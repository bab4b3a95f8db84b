//! Provisioning for ephemeral containerized test networks.
//!
//! A [`Testnet`] drives an external cluster orchestration layer (the
//! [`backend`] traits) to stand up consensus nodes and load simulators.
//! Logically identical participants share one committed instance template,
//! memoized by configuration fingerprint, and each participant is cloned
//! from its template before receiving its own configuration set and keys.

pub mod backend;
pub mod cache;
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod instance;
pub mod keys;
pub mod node;
pub mod settings;
pub mod simulator;

#[cfg(test)]
pub(crate) mod test_backend;

pub use backend::{ClusterBackend, ClusterInstance};
pub use client::ConsensusRpcClient;
pub use cluster::{Testnet, TestnetBuilder};
pub use config::genesis::Genesis;
pub use error::{BackendError, BackendResult, ProvisionError, Result};
pub use fingerprint::Fingerprint;
pub use instance::{InstanceDraft, InstanceTemplate, RuntimeInstance};
pub use keys::ParticipantKey;
pub use node::{Node, NodeIdentity};
pub use settings::ClusterSettings;
pub use simulator::{Simulator, SimulatorOptions};
