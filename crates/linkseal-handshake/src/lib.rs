//! Linkseal handshake protocol.
//!
//! Drives the two-role, single-session key exchange over one cleartext TCP
//! connection, consuming the external KEM capability at the appropriate
//! step:
//!
//! ```text
//! Responder                        Initiator
//! ─────────                        ─────────
//! accept ◀──────── connect
//! pubkey ─────────────────────────▶ (peer public key)
//!        ◀───────────────────────── pubkey
//!        ◀───────────────────────── ciphertext (encapsulated)
//! decapsulate
//! "OK"   ─────────────────────────▶
//! ```
//!
//! Exactly one handshake per invocation: the responder accepts a single
//! connection and the listener is dropped afterwards; retries are a
//! caller-level concern.
//!
//! # Security
//!
//! - Which side ends up holding the shared secret is an explicit,
//!   configured choice ([`SecretRetention`]), never an implicit default
//! - Every suspension point runs under a configured timeout and honors a
//!   cancellation signal; a hung peer cannot block the daemon forever
//! - Peer public keys are not validated against any trust anchor; the
//!   channel is cleartext by design

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod guard;
mod initiator;
mod responder;

pub use config::{HandshakeConfig, SecretRetention};
pub use error::{HandshakeError, Stage, StageError};
pub use initiator::run_initiator;
pub use responder::run_responder;

use linkseal_crypto::SharedSecret;

/// Result of a completed handshake.
#[derive(Debug)]
pub struct HandshakeOutcome {
    /// The locally held shared secret.
    ///
    /// Always present for the responder. For the initiator this follows
    /// the configured [`SecretRetention`] policy.
    pub shared_secret: Option<SharedSecret>,

    /// The exchanged ciphertext, for single-value persistence.
    pub ciphertext: Option<Vec<u8>>,

    /// The peer's public key as received on the wire. Recorded but not
    /// validated against any trust anchor.
    pub peer_public: Option<Vec<u8>>,
}
