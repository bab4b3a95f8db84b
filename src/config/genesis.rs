use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A genesis document, carried opaquely.
///
/// The document's structure belongs to the consensus protocol; this crate
/// only persists it verbatim into each node's configuration set. JSON keys
/// are stored ordered, so persisting the same document twice yields
/// identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genesis(serde_json::Value);

impl Genesis {
    pub fn new(document: serde_json::Value) -> Self {
        Self(document)
    }

    pub fn load(path: &Path) -> Result<Self> {
        trace!("reading genesis from {}", path.display());
        let reader = fs::File::open(path)
            .with_context(|| format!("unable to load genesis from {}", path.display()))?;
        Ok(Self(serde_json::from_reader(reader)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        super::save_json(&self.0, path)
    }

    pub fn chain_id(&self) -> Option<&str> {
        self.0.get("chain_id").and_then(serde_json::Value::as_str)
    }
}
