//! Linkseal daemon binary.
//!
//! # Usage
//!
//! ```bash
//! # Responder: wait for one peer, decapsulate, provision macsec0 on eth0
//! linkseal-daemon --role responder --iface eth0 --port 5555 \
//!     --peer-mac aa:bb:cc:dd:ee:ff --kem-cli ./xwing_cli
//!
//! # Initiator: connect to the responder and drive the exchange
//! linkseal-daemon --role initiator --iface eth0 --peer 192.0.2.10 \
//!     --port 5555 --kem-cli ./xwing_cli
//! ```
//!
//! Runs one handshake per invocation and requires elevated rights for
//! the provisioning step.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::{Parser, ValueEnum};
use linkseal_daemon::{DaemonConfig, Role};
use linkseal_handshake::{HandshakeConfig, SecretRetention};
use linkseal_kem::{KemCliConfig, KeyStoreConfig};
use linkseal_macsec::MacsecConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RetentionArg {
    /// Only the responder ends up holding the shared secret.
    ResponderOnly,
    /// Both sides keep the secret and provision independently.
    Both,
}

/// Linkseal key exchange and MACsec provisioning daemon
#[derive(Parser, Debug)]
#[command(name = "linkseal-daemon")]
#[command(about = "Post-quantum KEM handshake with kernel MACsec provisioning")]
#[command(version)]
struct Args {
    /// Exchange role
    #[arg(long, value_enum)]
    role: RoleArg,

    /// Physical interface to protect
    #[arg(long = "iface", default_value = "eth0")]
    iface: String,

    /// MACsec virtual interface name
    #[arg(long, default_value = "macsec0")]
    macsec_if: String,

    /// Peer IP address to connect to (initiator)
    #[arg(long)]
    peer: Option<IpAddr>,

    /// IP address to listen on (responder)
    #[arg(long, default_value = "0.0.0.0")]
    listen: IpAddr,

    /// TCP port for the key exchange
    #[arg(long, default_value = "5555")]
    port: u16,

    /// Peer MAC address; enables the receive security association
    #[arg(long)]
    peer_mac: Option<String>,

    /// MACsec port of the peer's receive channel
    #[arg(long, default_value = "1")]
    peer_port: u16,

    /// Path to the external KEM tool
    #[arg(long = "kem-cli", default_value = "xwing_cli")]
    kem_cli: PathBuf,

    /// Directory for persisted keys and tool hand-off files
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Per-step I/O and tool timeout, in seconds
    #[arg(long, default_value = "30")]
    io_timeout_secs: u64,

    /// Who holds the shared secret after the exchange
    #[arg(long, value_enum, default_value = "responder-only")]
    retention: RetentionArg,

    /// Fail the initiator if the acknowledgement is missing or garbled
    #[arg(long)]
    require_ack: bool,

    /// Run the handshake but skip kernel provisioning
    #[arg(long)]
    skip_provision: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("linkseal daemon starting");

    let timeout = Duration::from_secs(args.io_timeout_secs);
    let role = match args.role {
        RoleArg::Initiator => Role::Initiator,
        RoleArg::Responder => Role::Responder,
    };
    let retention = match args.retention {
        RetentionArg::ResponderOnly => SecretRetention::ResponderOnly,
        RetentionArg::Both => SecretRetention::Both,
    };

    let config = DaemonConfig {
        role,
        listen: SocketAddr::new(args.listen, args.port),
        peer: args.peer.map(|ip| SocketAddr::new(ip, args.port)),
        peer_mac: args.peer_mac,
        peer_port: args.peer_port,
        handshake: HandshakeConfig { io_timeout: timeout, retention, require_ack: args.require_ack },
        kem: KemCliConfig { tool: args.kem_cli, work_dir: args.work_dir.clone(), timeout },
        keystore: KeyStoreConfig::under(&args.work_dir),
        macsec: MacsecConfig::new(args.iface, args.macsec_if),
        skip_provision: args.skip_provision,
    };

    linkseal_daemon::run(config).await?;

    Ok(())
}
