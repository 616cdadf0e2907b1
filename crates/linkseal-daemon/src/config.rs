//! Daemon configuration.
//!
//! One explicit structure threaded through the pipeline; no component
//! reads process-wide defaults.

use std::net::SocketAddr;

use linkseal_handshake::HandshakeConfig;
use linkseal_kem::{KemCliConfig, KeyStoreConfig};
use linkseal_macsec::MacsecConfig;

/// Which side of the exchange this invocation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Connect out, encapsulate, send the ciphertext.
    Initiator,
    /// Accept one connection, decapsulate, acknowledge.
    Responder,
}

/// Full configuration for one daemon invocation.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Exchange role.
    pub role: Role,
    /// Responder: address to listen on.
    pub listen: SocketAddr,
    /// Initiator: responder address to connect to.
    pub peer: Option<SocketAddr>,
    /// Peer MAC address; when present a receive SA is installed for it.
    pub peer_mac: Option<String>,
    /// MACsec port of the peer's receive channel.
    pub peer_port: u16,
    /// Handshake tunables (timeouts, retention, ack policy).
    pub handshake: HandshakeConfig,
    /// External KEM tool configuration.
    pub kem: KemCliConfig,
    /// Persisted key material locations.
    pub keystore: KeyStoreConfig,
    /// MACsec interface naming and tooling.
    pub macsec: MacsecConfig,
    /// Skip kernel provisioning after a successful handshake.
    pub skip_provision: bool,
}
