//! KEM capability trait and key pair types.

use std::fmt;

use async_trait::async_trait;
use linkseal_crypto::SharedSecret;
use zeroize::Zeroize;

use crate::error::KemError;

/// A node identity private key.
///
/// Held for the process lifetime, never mutated, zeroized on drop, and
/// never rendered through `Debug`.
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Vec<u8>,
}

impl PrivateKey {
    /// Wrap raw private key bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw key bytes, for hand-off to the KEM capability only.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("len", &self.bytes.len()).finish_non_exhaustive()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// A node identity key pair.
///
/// Generated once per node (or loaded from the keystore if already
/// persisted). Only the public half is ever framed onto the wire.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Opaque public key bytes, sent to the peer during the handshake.
    pub public: Vec<u8>,
    /// Opaque private key bytes, local only.
    pub private: PrivateKey,
}

/// The key-encapsulation capability consumed by the handshake.
///
/// Implementations are opaque black boxes: the handshake never inspects
/// key material, it only moves bytes between the wire and these three
/// operations. Tests use a deterministic in-process stub; production uses
/// [`crate::CliKem`].
#[async_trait]
pub trait KemProvider: Send + Sync {
    /// Generate a fresh key pair.
    async fn generate_keypair(&self) -> Result<KeyPair, KemError>;

    /// Encapsulate against a peer public key, producing the ciphertext to
    /// send and the local copy of the shared secret.
    async fn encapsulate(&self, peer_public: &[u8])
    -> Result<(Vec<u8>, SharedSecret), KemError>;

    /// Decapsulate a received ciphertext with the local private key.
    async fn decapsulate(
        &self,
        ciphertext: &[u8],
        private_key: &PrivateKey,
    ) -> Result<SharedSecret, KemError>;
}
