//! The handshake → derive → provision pipeline.

use linkseal_crypto::{KdfError, SessionKeySet};
use linkseal_handshake::{HandshakeError, run_initiator, run_responder};
use linkseal_kem::{CliKem, KemError, KeyStore};
use linkseal_macsec::{CommandRunner, MacsecError, Provisioner, SystemRunner};
use thiserror::Error;
use tokio::{net::TcpListener, sync::watch};

use crate::config::{DaemonConfig, Role};

/// Starting packet number for freshly installed security associations.
///
/// Per-SA packet numbers are strictly increasing from here; reuse with
/// the same key would repeat AES-GCM keystream.
const INITIAL_PACKET_NUMBER: u64 = 1;

/// Security association identifier used on both directions.
const SA_ID: u8 = 0;

/// Top-level daemon errors.
///
/// Each class stays distinguishable so automation can react to a
/// platform gap differently from a failed exchange.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Invalid or unusable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The key exchange failed; see the stage in the inner error.
    #[error("handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// Key material persistence or KEM capability failure.
    #[error("KEM error: {0}")]
    Kem(#[from] KemError),

    /// Session key derivation failure.
    #[error("key derivation error: {0}")]
    Kdf(#[from] KdfError),

    /// Kernel provisioning failure, already classified.
    #[error("MACsec error: {0}")]
    Macsec(#[from] MacsecError),

    /// Socket setup failure before the handshake proper.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Run the full pipeline for one invocation.
///
/// # Errors
///
/// The first failing step aborts the run; there is no retry and no
/// rollback of partially provisioned state beyond the idempotent
/// recreate on the next invocation.
pub async fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    let kem = CliKem::new(config.kem.clone());
    let store = KeyStore::new(config.keystore.clone());
    let local_keys = store.ensure_keypair(&kem).await?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling handshake");
            let _ = cancel_tx.send(true);
        }
    });

    let outcome = match config.role {
        Role::Responder => {
            let listener = TcpListener::bind(config.listen).await?;
            tracing::info!(listen = %listener.local_addr()?, "responder listening");
            run_responder(listener, &local_keys, &kem, &config.handshake, cancel_rx).await?
        }
        Role::Initiator => {
            let peer = config
                .peer
                .ok_or_else(|| DaemonError::Config("initiator requires a peer address".into()))?;
            run_initiator(peer, &local_keys, &kem, &config.handshake, cancel_rx).await?
        }
    };

    if let Some(ciphertext) = &outcome.ciphertext {
        store.store_ciphertext(ciphertext).await?;
    }

    let Some(shared_secret) = outcome.shared_secret else {
        tracing::info!(
            "handshake complete; no shared secret held locally, provisioning is driven by the peer"
        );
        return Ok(());
    };

    // The secret is consumed by exactly this derivation and then dropped
    // (zeroized).
    let session_keys = SessionKeySet::derive_from(&shared_secret)?;
    drop(shared_secret);
    tracing::info!("session keys derived");

    if config.skip_provision {
        tracing::info!("provisioning skipped by configuration");
        return Ok(());
    }

    let provisioner = Provisioner::new(SystemRunner::default(), config.macsec.clone());
    provision(
        &provisioner,
        &session_keys,
        config.peer_mac.as_deref(),
        config.peer_port,
    )
    .await?;

    tracing::info!("MACsec configuration complete");
    Ok(())
}

/// Apply a derived key set to the kernel.
///
/// Interface creation is idempotent (delete-then-create); the transmit SA
/// always goes in, the receive SA only when a peer MAC is known.
pub async fn provision<R: CommandRunner>(
    provisioner: &Provisioner<R>,
    session_keys: &SessionKeySet,
    peer_mac: Option<&str>,
    peer_port: u16,
) -> Result<(), MacsecError> {
    let sak_hex = session_keys.sak_hex();

    provisioner.create_interface().await?;
    provisioner.add_transmit_sa(SA_ID, &sak_hex, INITIAL_PACKET_NUMBER).await?;

    match peer_mac {
        Some(mac) => {
            provisioner
                .add_receive_sa(mac, peer_port, SA_ID, &sak_hex, INITIAL_PACKET_NUMBER)
                .await?;
        }
        None => tracing::info!("no peer MAC configured, skipping receive SA"),
    }

    provisioner.activate().await
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use linkseal_crypto::SharedSecret;
    use linkseal_macsec::{CommandOutput, MacsecConfig};

    use super::*;

    /// Records invocations; clones share the same call log.
    #[derive(Clone)]
    struct RecordingRunner {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingRunner {
        fn new() -> Self {
            Self { calls: Arc::new(Mutex::new(Vec::new())) }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, MacsecError> {
            self.calls.lock().unwrap().push(format!("{program} {}", args.join(" ")));
            Ok(CommandOutput { success: true, stdout: String::new(), stderr: String::new() })
        }
    }

    fn session_keys() -> SessionKeySet {
        SessionKeySet::derive_from(&SharedSecret::new(b"SS".repeat(16))).unwrap()
    }

    #[tokio::test]
    async fn provision_orders_create_tx_rx_activate() {
        let runner = RecordingRunner::new();
        let provisioner = Provisioner::new(runner.clone(), MacsecConfig::new("eth0", "macsec0"));
        let keys = session_keys();

        provision(&provisioner, &keys, Some("aa:bb:cc:dd:ee:ff"), 1).await.unwrap();

        let calls = runner.calls();
        assert!(calls[0].contains("link del"));
        assert!(calls[1].contains("link add"));
        assert!(calls[2].contains("tx sa"));
        assert!(calls[3].contains("rx port 1 address aa:bb:cc:dd:ee:ff"));
        assert!(calls[4].ends_with("eth0 up"));
        assert!(calls[5].ends_with("macsec0 up"));
    }

    #[tokio::test]
    async fn provision_without_peer_mac_skips_receive_sa() {
        let runner = RecordingRunner::new();
        let provisioner = Provisioner::new(runner.clone(), MacsecConfig::new("eth0", "macsec0"));
        let keys = session_keys();

        provision(&provisioner, &keys, None, 1).await.unwrap();

        let calls = runner.calls();
        assert!(!calls.iter().any(|c| c.contains(" rx ")), "no receive SA expected: {calls:?}");
        assert!(calls.iter().any(|c| c.contains("tx sa")));
    }

    #[tokio::test]
    async fn provision_passes_the_data_plane_key() {
        let runner = RecordingRunner::new();
        let provisioner = Provisioner::new(runner.clone(), MacsecConfig::new("eth0", "macsec0"));
        let keys = session_keys();

        provision(&provisioner, &keys, None, 1).await.unwrap();

        let tx = runner.calls().into_iter().find(|c| c.contains("tx sa")).unwrap();
        assert!(tx.ends_with(&keys.sak_hex()), "transmit SA must carry the SAK hex");
    }
}
