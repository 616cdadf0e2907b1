//! Responder side of the handshake.

use linkseal_kem::{KemProvider, KeyPair};
use linkseal_proto::{read_frame, write_ack, write_frame};
use tokio::{net::TcpListener, sync::watch};

use crate::{
    HandshakeOutcome,
    config::HandshakeConfig,
    error::{HandshakeError, Stage},
    guard::guarded,
};

/// Run the responder state machine to completion.
///
/// Accepts exactly one inbound connection on the provided listener; the
/// listener is dropped after the accept, so concurrent connection attempts
/// are refused by design. The responder always ends up holding the shared
/// secret.
///
/// Stages: listen → send public key → receive peer public key → receive
/// ciphertext → decapsulate → acknowledge.
///
/// # Errors
///
/// Any I/O error, framing violation, timeout, cancellation, or
/// decapsulation failure aborts the handshake with the stage it occurred
/// in. There is no retry.
pub async fn run_responder(
    listener: TcpListener,
    local_keys: &KeyPair,
    kem: &dyn KemProvider,
    config: &HandshakeConfig,
    mut cancel: watch::Receiver<bool>,
) -> Result<HandshakeOutcome, HandshakeError> {
    let timeout = config.io_timeout;

    tracing::info!("responder: waiting for a connection");
    let (mut stream, peer_addr) = guarded(Stage::Listen, timeout, &mut cancel, async {
        Ok(listener.accept().await?)
    })
    .await?;
    // Single-session: no further connections are accepted.
    drop(listener);
    tracing::info!(%peer_addr, "responder: peer connected");

    guarded(Stage::SendPublicKey, timeout, &mut cancel, async {
        Ok(write_frame(&mut stream, &local_keys.public).await?)
    })
    .await?;
    tracing::debug!(len = local_keys.public.len(), "responder: sent local public key");

    // The initiator framed its own public key first; consume it so the
    // next frame on the stream really is the ciphertext. It is recorded
    // but not validated against any trust anchor.
    let peer_public = guarded(Stage::RecvPublicKey, timeout, &mut cancel, async {
        Ok(read_frame(&mut stream).await?)
    })
    .await?;
    tracing::debug!(len = peer_public.len(), "responder: received peer public key");

    let ciphertext = guarded(Stage::RecvCiphertext, timeout, &mut cancel, async {
        Ok(read_frame(&mut stream).await?)
    })
    .await?;
    tracing::info!(len = ciphertext.len(), "responder: ciphertext received, decapsulating");

    let shared_secret = guarded(Stage::Decapsulate, timeout, &mut cancel, async {
        Ok(kem.decapsulate(&ciphertext, &local_keys.private).await?)
    })
    .await?;
    tracing::info!("responder: decapsulation complete");

    guarded(Stage::Ack, timeout, &mut cancel, async { Ok(write_ack(&mut stream).await?) })
        .await?;

    Ok(HandshakeOutcome {
        shared_secret: Some(shared_secret),
        ciphertext: Some(ciphertext),
        peer_public: Some(peer_public),
    })
}
