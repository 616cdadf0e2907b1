//! Handshake error types.
//!
//! Every failure names the protocol stage it occurred in so callers (and
//! operators reading logs) can tell a refused connection from a truncated
//! ciphertext from a decapsulation failure.

use std::{fmt, time::Duration};

use linkseal_kem::KemError;
use linkseal_proto::ProtoError;
use thiserror::Error;

/// Protocol stages, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Responder: waiting to accept the single inbound connection.
    Listen,
    /// Initiator: opening the TCP connection.
    Connect,
    /// Sending the local public key.
    SendPublicKey,
    /// Receiving the peer's public key.
    RecvPublicKey,
    /// Responder: receiving the framed ciphertext.
    RecvCiphertext,
    /// Initiator: encapsulating against the peer public key.
    Encapsulate,
    /// Initiator: sending the framed ciphertext.
    SendCiphertext,
    /// Responder: decapsulating the received ciphertext.
    Decapsulate,
    /// Exchanging the acknowledgement token.
    Ack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Listen => "listen",
            Self::Connect => "connect",
            Self::SendPublicKey => "send-public-key",
            Self::RecvPublicKey => "recv-public-key",
            Self::RecvCiphertext => "recv-ciphertext",
            Self::Encapsulate => "encapsulate",
            Self::SendCiphertext => "send-ciphertext",
            Self::Decapsulate => "decapsulate",
            Self::Ack => "ack",
        };
        f.write_str(name)
    }
}

/// The underlying cause of a failed stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// Socket-level failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Framing violation (truncation, oversized length, bad ack).
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// KEM capability failure.
    #[error(transparent)]
    Kem(#[from] KemError),
}

/// Errors that abort a handshake.
///
/// There is no retry and no partial-success path; any of these ends the
/// run.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// A stage failed with an underlying I/O, framing, or KEM error.
    #[error("handshake failed at stage '{stage}': {source}")]
    Failed {
        /// The stage that failed.
        stage: Stage,
        /// What went wrong.
        #[source]
        source: StageError,
    },

    /// A stage did not complete within the configured timeout.
    #[error("handshake timed out at stage '{stage}' after {elapsed:?}")]
    Timeout {
        /// The stage that hung.
        stage: Stage,
        /// The configured limit that was exceeded.
        elapsed: Duration,
    },

    /// The cancellation signal fired mid-handshake.
    #[error("handshake cancelled at stage '{stage}'")]
    Cancelled {
        /// The stage that was in flight.
        stage: Stage,
    },
}

impl HandshakeError {
    /// The stage this error is tagged with.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Failed { stage, .. }
            | Self::Timeout { stage, .. }
            | Self::Cancelled { stage } => *stage,
        }
    }
}
