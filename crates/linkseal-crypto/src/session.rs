//! Session key set derived from one KEM shared secret.

use std::fmt;

use zeroize::Zeroize;

use crate::{
    kdf::{KdfError, derive},
    secret::SharedSecret,
};

/// Expansion label for the control-plane key.
pub const CAK_LABEL: &[u8] = b"XWING|MACSEC|CAK";

/// Expansion label for the data-plane key.
pub const SAK_LABEL: &[u8] = b"XWING|MACSEC|SAK";

/// Control-plane key length in bytes.
pub const CAK_LEN: usize = 32;

/// Data-plane key length in bytes (AES-GCM-128).
pub const SAK_LEN: usize = 16;

/// The two purpose-bound keys for one link session.
///
/// Derived deterministically from exactly one [`SharedSecret`]. The CAK is
/// the control-plane key (reserved for key-agreement protocols above this
/// daemon); the SAK is the data-plane key injected into the kernel security
/// association.
///
/// # Invariants
///
/// - The two members are always derived under distinct labels
///   ([`CAK_LABEL`] vs [`SAK_LABEL`])
/// - A key set is never reused across sessions; each handshake produces a
///   fresh one
#[derive(Clone)]
pub struct SessionKeySet {
    cak: [u8; CAK_LEN],
    sak: [u8; SAK_LEN],
}

impl SessionKeySet {
    /// Derive a fresh key set from a shared secret.
    ///
    /// # Errors
    ///
    /// Propagates [`KdfError`] from the underlying derivation. With the
    /// fixed lengths used here this cannot occur in practice, but the
    /// contract is kept explicit rather than panicking.
    pub fn derive_from(secret: &SharedSecret) -> Result<Self, KdfError> {
        let mut cak_bytes = derive(secret.as_bytes(), CAK_LABEL, CAK_LEN)?;
        let mut sak_bytes = derive(secret.as_bytes(), SAK_LABEL, SAK_LEN)?;

        let mut cak = [0u8; CAK_LEN];
        let mut sak = [0u8; SAK_LEN];
        cak.copy_from_slice(&cak_bytes);
        sak.copy_from_slice(&sak_bytes);
        cak_bytes.zeroize();
        sak_bytes.zeroize();

        Ok(Self { cak, sak })
    }

    /// Control-plane key bytes.
    #[must_use]
    pub fn cak(&self) -> &[u8; CAK_LEN] {
        &self.cak
    }

    /// Data-plane key bytes.
    #[must_use]
    pub fn sak(&self) -> &[u8; SAK_LEN] {
        &self.sak
    }

    /// Data-plane key as lowercase hex, the format the network
    /// configuration tool expects.
    #[must_use]
    pub fn sak_hex(&self) -> String {
        hex::encode(self.sak)
    }
}

impl fmt::Debug for SessionKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeySet")
            .field("cak_len", &CAK_LEN)
            .field("sak_len", &SAK_LEN)
            .finish_non_exhaustive()
    }
}

impl Drop for SessionKeySet {
    fn drop(&mut self) {
        self.cak.zeroize();
        self.sak.zeroize();
    }
}
