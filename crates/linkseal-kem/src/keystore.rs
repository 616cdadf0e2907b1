//! Persisted node identity and ciphertext hand-off.
//!
//! One key pair identifies a node across runs. The store treats the
//! presence of BOTH key files as "already generated" and never
//! regenerates over them; delete the files to rotate an identity. The
//! most recently exchanged ciphertext is also persisted, overwritten on
//! every run.

use std::path::{Path, PathBuf};

use crate::{
    error::KemError,
    provider::{KemProvider, KeyPair, PrivateKey},
};

/// Explicit file locations for persisted key material.
#[derive(Debug, Clone)]
pub struct KeyStoreConfig {
    /// Private key file.
    pub private_path: PathBuf,
    /// Public key file.
    pub public_path: PathBuf,
    /// Most-recent exchanged ciphertext file.
    pub ciphertext_path: PathBuf,
}

impl KeyStoreConfig {
    /// Lay the standard file names out under one directory.
    #[must_use]
    pub fn under(dir: &Path) -> Self {
        Self {
            private_path: dir.join("identity.priv"),
            public_path: dir.join("identity.pub"),
            ciphertext_path: dir.join("ciphertext.bin"),
        }
    }
}

/// File-backed store for the node identity key pair.
pub struct KeyStore {
    config: KeyStoreConfig,
}

impl KeyStore {
    /// Create a store over the configured paths.
    #[must_use]
    pub fn new(config: KeyStoreConfig) -> Self {
        Self { config }
    }

    /// Load the persisted key pair, generating and persisting a fresh one
    /// if either file is missing.
    ///
    /// # Errors
    ///
    /// Propagates generation failures from the provider and any file I/O
    /// failure.
    pub async fn ensure_keypair(
        &self,
        provider: &dyn KemProvider,
    ) -> Result<KeyPair, KemError> {
        let have_private = tokio::fs::try_exists(&self.config.private_path).await.unwrap_or(false);
        let have_public = tokio::fs::try_exists(&self.config.public_path).await.unwrap_or(false);

        if have_private && have_public {
            tracing::info!(
                public = %self.config.public_path.display(),
                "reusing persisted node identity"
            );
            let public = read(&self.config.public_path).await?;
            let private = PrivateKey::new(read(&self.config.private_path).await?);
            return Ok(KeyPair { public, private });
        }

        tracing::info!("no persisted identity found; generating a fresh key pair");
        let pair = provider.generate_keypair().await?;
        write_private(&self.config.private_path, pair.private.as_bytes()).await?;
        write(&self.config.public_path, &pair.public).await?;
        Ok(pair)
    }

    /// Persist the exchanged ciphertext, replacing any previous value.
    pub async fn store_ciphertext(&self, ciphertext: &[u8]) -> Result<(), KemError> {
        write(&self.config.ciphertext_path, ciphertext).await
    }
}

async fn read(path: &Path) -> Result<Vec<u8>, KemError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| KemError::Io { path: path.display().to_string(), source })
}

async fn write(path: &Path, bytes: &[u8]) -> Result<(), KemError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| KemError::Io { path: path.display().to_string(), source })
}

async fn write_private(path: &Path, bytes: &[u8]) -> Result<(), KemError> {
    write(path, bytes).await?;

    // Private key files are readable by owner only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|source| KemError::Io { path: path.display().to_string(), source })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use linkseal_crypto::SharedSecret;

    use super::*;

    /// Deterministic in-process KEM counting how often keys are generated.
    struct CountingKem {
        generated: AtomicUsize,
    }

    impl CountingKem {
        fn new() -> Self {
            Self { generated: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl KemProvider for CountingKem {
        async fn generate_keypair(&self) -> Result<KeyPair, KemError> {
            self.generated.fetch_add(1, Ordering::SeqCst);
            Ok(KeyPair {
                public: b"PUB".to_vec(),
                private: PrivateKey::new(b"PRIV".to_vec()),
            })
        }

        async fn encapsulate(
            &self,
            _peer_public: &[u8],
        ) -> Result<(Vec<u8>, SharedSecret), KemError> {
            Ok((b"CT".to_vec(), SharedSecret::new(b"SS".repeat(16))))
        }

        async fn decapsulate(
            &self,
            _ciphertext: &[u8],
            _private_key: &PrivateKey,
        ) -> Result<SharedSecret, KemError> {
            Ok(SharedSecret::new(b"SS".repeat(16)))
        }
    }

    #[tokio::test]
    async fn generates_once_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(KeyStoreConfig::under(dir.path()));
        let kem = CountingKem::new();

        let first = store.ensure_keypair(&kem).await.unwrap();
        let second = store.ensure_keypair(&kem).await.unwrap();

        assert_eq!(kem.generated.load(Ordering::SeqCst), 1, "must not regenerate over files");
        assert_eq!(first.public, second.public);
        assert_eq!(first.private.as_bytes(), second.private.as_bytes());
    }

    #[tokio::test]
    async fn regenerates_when_one_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = KeyStoreConfig::under(dir.path());
        let store = KeyStore::new(config.clone());
        let kem = CountingKem::new();

        store.ensure_keypair(&kem).await.unwrap();
        tokio::fs::remove_file(&config.public_path).await.unwrap();
        store.ensure_keypair(&kem).await.unwrap();

        assert_eq!(kem.generated.load(Ordering::SeqCst), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn private_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let config = KeyStoreConfig::under(dir.path());
        let store = KeyStore::new(config.clone());
        store.ensure_keypair(&CountingKem::new()).await.unwrap();

        let mode = std::fs::metadata(&config.private_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn ciphertext_is_overwritten_each_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = KeyStoreConfig::under(dir.path());
        let store = KeyStore::new(config.clone());

        store.store_ciphertext(b"first").await.unwrap();
        store.store_ciphertext(b"second").await.unwrap();

        let stored = tokio::fs::read(&config.ciphertext_path).await.unwrap();
        assert_eq!(stored, b"second");
    }
}
