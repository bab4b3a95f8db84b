use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fastcrypto::encoding::{Base64, Encoding, Hex};
use serde::{Deserialize, Serialize};

use super::{save_json, CONFIG_DIR, DATA_DIR, NODE_KEY_FILE, VALIDATOR_KEY_FILE, VALIDATOR_STATE_FILE};
use crate::keys::ParticipantKey;

/// One serialized key, tagged with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredKey {
    #[serde(rename = "type")]
    pub algorithm: String,
    pub value: String,
}

impl StoredKey {
    fn public(key: &ParticipantKey) -> Self {
        Self {
            algorithm: key.algorithm().to_string(),
            value: Base64::encode(key.public_bytes()),
        }
    }

    fn private(key: &ParticipantKey) -> Self {
        Self {
            algorithm: key.algorithm().to_string(),
            value: Base64::encode(key.private_bytes()),
        }
    }
}

/// Network identity key file (`node_key.json`), used for the P2P handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeKeyFile {
    pub priv_key: StoredKey,
}

impl NodeKeyFile {
    pub fn new(network_key: &ParticipantKey) -> Self {
        Self {
            priv_key: StoredKey::private(network_key),
        }
    }
}

/// Consensus signing key file (`priv_validator_key.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorKeyFile {
    pub address: String,
    pub pub_key: StoredKey,
    pub priv_key: StoredKey,
}

impl ValidatorKeyFile {
    pub fn new(signer_key: &ParticipantKey) -> Self {
        Self {
            address: Hex::encode(signer_key.address()),
            pub_key: StoredKey::public(signer_key),
            priv_key: StoredKey::private(signer_key),
        }
    }
}

/// Initial consensus signing state (`priv_validator_state.json`). A fresh
/// node has signed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorStateFile {
    pub height: String,
    pub round: u32,
    pub step: u8,
}

impl Default for ValidatorStateFile {
    fn default() -> Self {
        Self {
            height: "0".to_string(),
            round: 0,
            step: 0,
        }
    }
}

/// Staged key material paths, ready for injection.
pub(crate) struct StagedKeyMaterial {
    pub node_key: PathBuf,
    pub validator_key: PathBuf,
    pub validator_state: PathBuf,
}

/// Write the network identity key, consensus signing key, and initial
/// signing state into a participant's staging directory. Shared by node and
/// simulator configurators.
pub(crate) fn stage_key_material(
    staging: &Path,
    network_key: &ParticipantKey,
    signer_key: &ParticipantKey,
) -> Result<StagedKeyMaterial> {
    let node_key = staging.join(CONFIG_DIR).join(NODE_KEY_FILE);
    save_json(&NodeKeyFile::new(network_key), &node_key)?;
    // the remote copy step runs under the instance user and must be able to
    // read and replace the key
    relax_permissions(&node_key)?;

    let validator_key = staging.join(CONFIG_DIR).join(VALIDATOR_KEY_FILE);
    save_json(&ValidatorKeyFile::new(signer_key), &validator_key)?;

    let validator_state = staging.join(DATA_DIR).join(VALIDATOR_STATE_FILE);
    save_json(&ValidatorStateFile::default(), &validator_state)?;

    Ok(StagedKeyMaterial {
        node_key,
        validator_key,
        validator_state,
    })
}

#[cfg(unix)]
fn relax_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o777))
        .with_context(|| format!("unable to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn relax_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
