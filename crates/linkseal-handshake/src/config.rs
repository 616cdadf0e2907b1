//! Handshake configuration.

use std::time::Duration;

/// Who holds the shared secret when the handshake completes.
///
/// Encapsulation hands the initiator its own copy of the secret; whether
/// that copy is kept or destroyed is a deployment decision, not a
/// protocol accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRetention {
    /// Only the responder learns the secret; the initiator zeroizes its
    /// encapsulation copy and completes without one.
    ResponderOnly,
    /// Both sides keep the secret and can derive session keys.
    Both,
}

/// Tunables for one handshake attempt.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// Timeout applied to every individual blocking step (accept,
    /// connect, each read/write, each KEM invocation).
    pub io_timeout: Duration,
    /// Shared-secret retention policy on the initiator side.
    pub retention: SecretRetention,
    /// When set, a missing or garbled acknowledgement fails the
    /// initiator's handshake instead of logging a warning.
    pub require_ack: bool,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            io_timeout: Duration::from_secs(30),
            retention: SecretRetention::ResponderOnly,
            require_ack: false,
        }
    }
}
