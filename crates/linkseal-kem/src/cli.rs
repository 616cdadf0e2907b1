//! KEM provider backed by an external command-line tool.
//!
//! The tool contract mirrors common KEM CLI frontends (e.g. an X-Wing
//! tool): key material moves through files in a configured work directory
//! and the shared secret is printed as lowercase hex on stdout:
//!
//! ```text
//! <tool> genkey --priv <path> --pub <path>
//! <tool> encaps --peer <path> --out <path>     # prints shared secret hex
//! <tool> decaps --cipher <path> --priv <path>  # prints shared secret hex
//! ```
//!
//! All paths are explicit configuration; there are no process-wide default
//! filenames. Concurrent daemon instances must not share one work
//! directory.

use std::{
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};

use async_trait::async_trait;
use linkseal_crypto::SharedSecret;
use tokio::process::Command;

use crate::{
    error::KemError,
    provider::{KemProvider, KeyPair, PrivateKey},
};

/// Configuration for the CLI-backed KEM provider.
#[derive(Debug, Clone)]
pub struct KemCliConfig {
    /// Path to the KEM tool binary.
    pub tool: PathBuf,
    /// Directory for file hand-off with the tool.
    pub work_dir: PathBuf,
    /// Timeout applied to every tool invocation.
    pub timeout: Duration,
}

impl KemCliConfig {
    /// Default per-invocation timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build a config with the default timeout.
    #[must_use]
    pub fn new(tool: PathBuf, work_dir: PathBuf) -> Self {
        Self { tool, work_dir, timeout: Self::DEFAULT_TIMEOUT }
    }
}

/// KEM provider that shells out to an external tool.
#[derive(Debug, Clone)]
pub struct CliKem {
    config: KemCliConfig,
}

impl CliKem {
    /// Create a provider from its configuration.
    #[must_use]
    pub fn new(config: KemCliConfig) -> Self {
        Self { config }
    }

    fn hand_off(&self, name: &str) -> PathBuf {
        self.config.work_dir.join(name)
    }

    async fn run_tool(&self, operation: &'static str, args: &[&str]) -> Result<Output, KemError> {
        let tool = self.config.tool.display().to_string();
        tracing::debug!(%tool, operation, "invoking KEM tool");

        let invocation = Command::new(&self.config.tool).args(args).output();
        let output = tokio::time::timeout(self.config.timeout, invocation)
            .await
            .map_err(|_| KemError::Timeout { operation, elapsed: self.config.timeout })?
            .map_err(|source| KemError::Spawn { tool, source })?;

        if !output.status.success() {
            return Err(KemError::ToolFailed {
                operation,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

/// Decode the shared secret the tool printed on stdout.
///
/// The secret length is whatever the capability declares; only emptiness
/// and hex validity are checked here.
fn parse_secret(stdout: &[u8]) -> Result<SharedSecret, KemError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Err(KemError::BadSecret { detail: "tool printed no shared secret".to_string() });
    }

    let bytes = hex::decode(text)
        .map_err(|e| KemError::BadSecret { detail: format!("invalid hex on stdout: {e}") })?;
    Ok(SharedSecret::new(bytes))
}

async fn write_handoff(path: &Path, bytes: &[u8], private: bool) -> Result<(), KemError> {
    let io_err = |source| KemError::Io { path: path.display().to_string(), source };
    tokio::fs::write(path, bytes).await.map_err(io_err)?;

    // Hand-off files carrying private material are readable by owner only.
    #[cfg(unix)]
    if private {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(io_err)?;
    }
    #[cfg(not(unix))]
    let _ = private;

    Ok(())
}

async fn read_handoff(path: &Path) -> Result<Vec<u8>, KemError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| KemError::Io { path: path.display().to_string(), source })
}

#[async_trait]
impl KemProvider for CliKem {
    async fn generate_keypair(&self) -> Result<KeyPair, KemError> {
        let priv_path = self.hand_off("identity.priv");
        let pub_path = self.hand_off("identity.pub");

        self.run_tool(
            "genkey",
            &[
                "genkey",
                "--priv",
                &priv_path.display().to_string(),
                "--pub",
                &pub_path.display().to_string(),
            ],
        )
        .await?;

        let public = read_handoff(&pub_path).await?;
        let private = PrivateKey::new(read_handoff(&priv_path).await?);
        Ok(KeyPair { public, private })
    }

    async fn encapsulate(
        &self,
        peer_public: &[u8],
    ) -> Result<(Vec<u8>, SharedSecret), KemError> {
        let peer_path = self.hand_off("peer_pub.bin");
        let cipher_path = self.hand_off("ciphertext.bin");
        write_handoff(&peer_path, peer_public, false).await?;

        let output = self
            .run_tool(
                "encaps",
                &[
                    "encaps",
                    "--peer",
                    &peer_path.display().to_string(),
                    "--out",
                    &cipher_path.display().to_string(),
                ],
            )
            .await?;

        let secret = parse_secret(&output.stdout)?;
        let ciphertext = read_handoff(&cipher_path).await?;
        Ok((ciphertext, secret))
    }

    async fn decapsulate(
        &self,
        ciphertext: &[u8],
        private_key: &PrivateKey,
    ) -> Result<SharedSecret, KemError> {
        let cipher_path = self.hand_off("ciphertext.bin");
        let priv_path = self.hand_off("identity.priv");
        write_handoff(&cipher_path, ciphertext, false).await?;
        write_handoff(&priv_path, private_key.as_bytes(), true).await?;

        let output = self
            .run_tool(
                "decaps",
                &[
                    "decaps",
                    "--cipher",
                    &cipher_path.display().to_string(),
                    "--priv",
                    &priv_path.display().to_string(),
                ],
            )
            .await?;

        parse_secret(&output.stdout)
    }
}
