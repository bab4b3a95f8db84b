use fastcrypto::encoding::{Encoding, Hex};
use fastcrypto::hash::{Blake2b256, HashFunction};
use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};

/// Timestamp written for peers that have never been dialed.
const NEVER: &str = "0001-01-01T00:00:00Z";

/// Serialized list of known peer addresses used for P2P bootstrap
/// (`addrbook.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    pub key: String,
    pub addrs: Vec<KnownAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownAddress {
    pub addr: PeerAddress,
    pub src: PeerAddress,
    pub attempts: u32,
    pub last_attempt: String,
    pub last_success: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerAddress {
    pub id: String,
    pub ip: String,
    pub port: u16,
}

impl PeerAddress {
    /// Parse an `id@host:port` peer string.
    pub fn parse(peer: &str) -> Result<Self> {
        let malformed = || ProvisionError::MalformedPeer(peer.to_string());
        let (id, rest) = peer.split_once('@').ok_or_else(malformed)?;
        let (ip, port) = rest.rsplit_once(':').ok_or_else(malformed)?;
        if id.is_empty() || ip.is_empty() {
            return Err(malformed());
        }
        let port = port.parse().map_err(|_| malformed())?;
        Ok(Self {
            id: id.to_string(),
            ip: ip.to_string(),
            port,
        })
    }
}

impl AddressBook {
    /// Build an address book from `id@host:port` peer strings.
    ///
    /// The book key is derived from the peer list itself so that the same
    /// peer set always renders byte-identical output.
    pub fn from_peers(peers: &[String]) -> Result<Self> {
        let addrs = peers
            .iter()
            .map(|peer| {
                let addr = PeerAddress::parse(peer)?;
                Ok(KnownAddress {
                    src: addr.clone(),
                    addr,
                    attempts: 0,
                    last_attempt: NEVER.to_string(),
                    last_success: NEVER.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let digest = Blake2b256::digest(peers.join(",").as_bytes());
        let key = Hex::encode(&digest.to_vec()[..12]);

        Ok(Self { key, addrs })
    }
}
