use std::fmt;

use fastcrypto::encoding::{Encoding, Hex};
use fastcrypto::hash::{Blake2b256, HashFunction};

use crate::settings::ClusterSettings;

const FINGERPRINT_LENGTH: usize = 32;

/// Digest of the settings that determine instance template equivalence.
///
/// Participants with equal fingerprints require byte-identical base
/// templates, so the fingerprint is the template cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LENGTH]);

impl Fingerprint {
    /// Fingerprint of a consensus node template: image source, version, the
    /// three exposed ports, remote root, and volume size, in that order.
    pub fn node(settings: &ClusterSettings, version: &str) -> Self {
        Self::digest(format!(
            "{}:{}:{}:{}:{}:{}:{}",
            settings.node_image,
            version,
            settings.rpc_port,
            settings.p2p_port,
            settings.grpc_port,
            settings.remote_root.display(),
            settings.volume_size,
        ))
    }

    /// Fingerprint of a simulator template. Simulators expose no ports, so
    /// only image source, version, remote root, and volume size participate.
    pub fn simulator(settings: &ClusterSettings, version: &str) -> Self {
        Self::digest(format!(
            "{}:{}:{}:{}",
            settings.simulator_image,
            version,
            settings.remote_root.display(),
            settings.volume_size,
        ))
    }

    fn digest(settings: String) -> Self {
        let digest = Blake2b256::digest(settings.as_bytes());
        let mut bytes = [0u8; FINGERPRINT_LENGTH];
        bytes.copy_from_slice(&digest.to_vec());
        Self(bytes)
    }

    /// Short hex form used when naming cached templates.
    pub fn short(&self) -> String {
        Hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", Hex::encode(self.0))
    }
}
