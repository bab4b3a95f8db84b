//! On-disk configuration set rendered for each participant.
//!
//! File names and layouts here are the contract with the consensus protocol:
//! the node process expects them at fixed paths under its home directory.
//! Everything rendered from a fixed identity and peer set is byte-for-byte
//! deterministic; the only entropy in the whole set is the caller-supplied
//! key material.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::trace;

pub mod addrbook;
pub mod app_config;
pub mod genesis;
pub mod key_files;
pub mod node_config;

pub const CONFIG_DIR: &str = "config";
pub const DATA_DIR: &str = "data";

pub const NODE_CONFIG_FILE: &str = "config.toml";
pub const GENESIS_FILE: &str = "genesis.json";
pub const APP_CONFIG_FILE: &str = "app.toml";
pub const NODE_KEY_FILE: &str = "node_key.json";
pub const VALIDATOR_KEY_FILE: &str = "priv_validator_key.json";
pub const VALIDATOR_STATE_FILE: &str = "priv_validator_state.json";
pub const ADDRBOOK_FILE: &str = "addrbook.json";

pub(crate) fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    trace!("writing {}", path.display());
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).with_context(|| format!("unable to write {}", path.display()))?;
    Ok(())
}

pub(crate) fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    trace!("writing {}", path.display());
    let contents = toml::to_string(value)?;
    fs::write(path, contents).with_context(|| format!("unable to write {}", path.display()))?;
    Ok(())
}
