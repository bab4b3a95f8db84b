use serde::{Deserialize, Serialize};

use crate::settings::ClusterSettings;

/// Consensus node configuration file (`config.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfigFile {
    pub moniker: String,
    pub rpc: RpcSection,
    pub p2p: P2pSection,
    pub consensus: ConsensusSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcSection {
    pub laddr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct P2pSection {
    pub laddr: String,
    /// Comma-joined `id@host:port` peers the node keeps connections to.
    pub persistent_peers: String,
    pub addr_book_strict: bool,
    pub allow_duplicate_ip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusSection {
    pub timeout_propose: String,
    pub timeout_commit: String,
}

impl NodeConfigFile {
    /// Render the configuration for a named participant. Pure function of
    /// its inputs.
    pub fn render(moniker: &str, peers: &[String], settings: &ClusterSettings) -> Self {
        Self {
            moniker: moniker.to_string(),
            rpc: RpcSection {
                laddr: format!("tcp://0.0.0.0:{}", settings.rpc_port),
            },
            p2p: P2pSection {
                laddr: format!("tcp://0.0.0.0:{}", settings.p2p_port),
                persistent_peers: peers.join(","),
                // the whole network shares a handful of cluster IPs
                addr_book_strict: false,
                allow_duplicate_ip: true,
            },
            consensus: ConsensusSection {
                timeout_propose: "1s".to_string(),
                timeout_commit: "1s".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_deterministic() {
        let settings = ClusterSettings::default();
        let peers = vec!["ab@10.0.0.1:26656".to_string(), "cd@10.0.0.2:26656".to_string()];
        let a = toml::to_string(&NodeConfigFile::render("node-0", &peers, &settings)).unwrap();
        let b = toml::to_string(&NodeConfigFile::render("node-0", &peers, &settings)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn render_wires_ports_and_peers() {
        let settings = ClusterSettings::default();
        let peers = vec!["ab@10.0.0.1:26656".to_string()];
        let config = NodeConfigFile::render("node-0", &peers, &settings);
        assert_eq!(config.rpc.laddr, "tcp://0.0.0.0:26657");
        assert_eq!(config.p2p.laddr, "tcp://0.0.0.0:26656");
        assert_eq!(config.p2p.persistent_peers, "ab@10.0.0.1:26656");

        // round-trips through the wire format
        let parsed: NodeConfigFile = toml::from_str(&toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
