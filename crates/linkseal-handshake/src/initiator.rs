//! Initiator side of the handshake.

use std::net::SocketAddr;

use linkseal_kem::{KemProvider, KeyPair};
use linkseal_proto::{read_ack, read_frame, write_frame};
use tokio::{net::TcpStream, sync::watch};

use crate::{
    HandshakeOutcome,
    config::{HandshakeConfig, SecretRetention},
    error::{HandshakeError, Stage},
    guard::guarded,
};

/// Run the initiator state machine to completion.
///
/// Stages: connect → send public key → receive peer public key →
/// encapsulate → send ciphertext → await acknowledgement.
///
/// The acknowledgement is informational by default: a missing, garbled,
/// or timed-out token is logged and the handshake still completes. Set
/// [`HandshakeConfig::require_ack`] for confirmed delivery. Cancellation
/// is always fatal, ack stage included.
///
/// Whether the returned outcome carries the shared secret follows the
/// configured [`SecretRetention`] policy; under
/// [`SecretRetention::ResponderOnly`] the local encapsulation copy is
/// zeroized before returning.
///
/// # Errors
///
/// Any I/O error, framing violation, timeout, cancellation, or
/// encapsulation failure aborts the handshake with the stage it occurred
/// in. There is no retry.
pub async fn run_initiator(
    peer_addr: SocketAddr,
    local_keys: &KeyPair,
    kem: &dyn KemProvider,
    config: &HandshakeConfig,
    mut cancel: watch::Receiver<bool>,
) -> Result<HandshakeOutcome, HandshakeError> {
    let timeout = config.io_timeout;

    tracing::info!(%peer_addr, "initiator: connecting");
    let mut stream = guarded(Stage::Connect, timeout, &mut cancel, async {
        Ok(TcpStream::connect(peer_addr).await?)
    })
    .await?;

    guarded(Stage::SendPublicKey, timeout, &mut cancel, async {
        Ok(write_frame(&mut stream, &local_keys.public).await?)
    })
    .await?;
    tracing::debug!(len = local_keys.public.len(), "initiator: sent local public key");

    let peer_public = guarded(Stage::RecvPublicKey, timeout, &mut cancel, async {
        Ok(read_frame(&mut stream).await?)
    })
    .await?;
    tracing::info!(len = peer_public.len(), "initiator: peer public key received, encapsulating");

    let (ciphertext, shared_secret) =
        guarded(Stage::Encapsulate, timeout, &mut cancel, async {
            Ok(kem.encapsulate(&peer_public).await?)
        })
        .await?;

    guarded(Stage::SendCiphertext, timeout, &mut cancel, async {
        Ok(write_frame(&mut stream, &ciphertext).await?)
    })
    .await?;
    tracing::info!(len = ciphertext.len(), "initiator: ciphertext sent");

    let ack = guarded(Stage::Ack, timeout, &mut cancel, async {
        Ok(read_ack(&mut stream).await?)
    })
    .await;
    match ack {
        Ok(()) => tracing::debug!("initiator: responder acknowledged"),
        Err(err @ HandshakeError::Cancelled { .. }) => return Err(err),
        Err(err) if config.require_ack => return Err(err),
        Err(err) => {
            // The exchange itself already succeeded; a peer that garbles
            // the token or hangs before sending it only loses the
            // delivery confirmation.
            tracing::warn!(%err, "initiator: acknowledgement not received, continuing");
        }
    }

    let shared_secret = match config.retention {
        SecretRetention::Both => Some(shared_secret),
        SecretRetention::ResponderOnly => {
            // Drop zeroizes the local encapsulation copy; only the
            // responder ends up holding the secret.
            drop(shared_secret);
            None
        }
    };

    Ok(HandshakeOutcome {
        shared_secret,
        ciphertext: Some(ciphertext),
        peer_public: Some(peer_public),
    })
}
