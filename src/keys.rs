use std::fmt;

use fastcrypto::ed25519::Ed25519KeyPair;
use fastcrypto::hash::{Blake2b256, HashFunction};
use fastcrypto::secp256k1::Secp256k1KeyPair;
use fastcrypto::traits::{KeyPair, ToFromBytes};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Number of bytes in a public-key address.
pub const ADDRESS_LENGTH: usize = 20;

/// A participant's private key under one of the two supported algorithms:
/// Edwards-curve (Ed25519) or the address-recoverable Secp256k1.
///
/// Key material is always caller-supplied; nothing in this crate generates
/// keys implicitly, which keeps configuration rendering deterministic.
pub enum ParticipantKey {
    Ed25519(Ed25519KeyPair),
    Secp256k1(Secp256k1KeyPair),
}

impl ParticipantKey {
    pub fn generate_ed25519<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Self::Ed25519(Ed25519KeyPair::generate(&mut StdRng::from_rng(rng).unwrap()))
    }

    pub fn generate_secp256k1<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        Self::Secp256k1(Secp256k1KeyPair::generate(&mut StdRng::from_rng(rng).unwrap()))
    }

    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Ed25519(_) => "ed25519",
            Self::Secp256k1(_) => "secp256k1",
        }
    }

    pub fn public_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(kp) => kp.public().as_bytes().to_vec(),
            Self::Secp256k1(kp) => kp.public().as_bytes().to_vec(),
        }
    }

    pub fn private_bytes(&self) -> Vec<u8> {
        match self {
            Self::Ed25519(kp) => kp.copy().private().as_bytes().to_vec(),
            Self::Secp256k1(kp) => kp.copy().private().as_bytes().to_vec(),
        }
    }

    /// 20-byte address derived from the public key; its hex form prefixes
    /// P2P endpoint identifiers.
    pub fn address(&self) -> [u8; ADDRESS_LENGTH] {
        let digest = Blake2b256::digest(self.public_bytes());
        let mut address = [0u8; ADDRESS_LENGTH];
        address.copy_from_slice(&digest.to_vec()[..ADDRESS_LENGTH]);
        address
    }

    pub fn copy(&self) -> Self {
        match self {
            Self::Ed25519(kp) => Self::Ed25519(kp.copy()),
            Self::Secp256k1(kp) => Self::Secp256k1(kp.copy()),
        }
    }
}

impl fmt::Debug for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print private material
        write!(f, "ParticipantKey({})", self.algorithm())
    }
}
