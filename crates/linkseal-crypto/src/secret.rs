//! Shared secret wrapper with zeroize-on-drop semantics.

use std::fmt;

use zeroize::Zeroize;

/// A KEM shared secret.
///
/// Exists transiently between a successful handshake and the key derivation
/// that consumes it. The bytes are wiped when the value is dropped and are
/// never exposed through `Debug`.
#[derive(Clone)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl SharedSecret {
    /// Wrap raw KEM output bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw secret bytes.
    ///
    /// Callers must not copy these out of controlled scopes; the only
    /// intended consumer is the key derivation step.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the secret in bytes, as declared by the KEM capability.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").field("len", &self.bytes.len()).finish_non_exhaustive()
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
